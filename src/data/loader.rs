// ============================================================
// Layer 4 — Skeleton Loader
// ============================================================
// Loads one skeleton sequence per .npy file from a directory.
//
// Each file must hold a 4-D f32 array shaped
//   [bodies, frames, joints, coords]
// and every file in the directory must share that shape so the
// batcher can stack them.
//
// The class label comes from the NTU action tag in the file stem
// (…A013 → class 12). Files without a tag are skipped with a
// warning rather than failing the whole load.
//
// Reference: ndarray-npy crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use ndarray::Array4;
use ndarray_npy::read_npy;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::labels::LabelNames;
use crate::domain::skeleton::{parse_action_label, SkeletonSample, SkeletonSequence};
use crate::domain::traits::SampleSource;

/// Loads all .npy skeleton files from a given directory.
pub struct NpyDirLoader {
    dir: PathBuf,
}

impl NpyDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SampleSource for NpyDirLoader {
    fn load_all(&self) -> Result<Vec<SkeletonSample>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read data directory '{}'", self.dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("npy"))
            .collect();

        // read_dir order is platform dependent
        paths.sort();

        let mut samples: Vec<SkeletonSample> = Vec::with_capacity(paths.len());

        for path in &paths {
            let Some(sample) = load_single_npy(path)? else {
                continue;
            };

            if let Some(first) = samples.first() {
                if first.sequence.shape() != sample.sequence.shape() {
                    bail!(
                        "'{}' has shape {:?} but '{}' has shape {:?}",
                        path.display(),
                        sample.sequence.shape(),
                        first.name,
                        first.sequence.shape(),
                    );
                }
            }

            samples.push(sample);
        }

        tracing::info!(
            "Loaded {} skeleton samples from '{}'",
            samples.len(),
            self.dir.display()
        );
        Ok(samples)
    }
}

/// Read one .npy file. Returns Ok(None) when the file name carries
/// no action tag.
fn load_single_npy(path: &Path) -> Result<Option<SkeletonSample>> {
    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let Some(label) = parse_action_label(&name) else {
        tracing::warn!("Skipping '{}': no action tag in file name", path.display());
        return Ok(None);
    };

    let array: Array4<f32> = read_npy(path)
        .with_context(|| format!("Cannot read skeleton array '{}'", path.display()))?;

    let dims = array.dim();
    let shape = [dims.0, dims.1, dims.2, dims.3];
    // Iteration order is logical (row-major) regardless of memory layout
    let values: Vec<f32> = array.iter().copied().collect();

    let sequence = SkeletonSequence::new(shape, values)?;
    tracing::debug!("Loaded: {} (class {}, shape {:?})", name, label, shape);

    Ok(Some(SkeletonSample::new(name, label, sequence)))
}

/// Read a label name table: one class name per line, in class order.
/// Trailing blank lines are ignored.
pub fn load_label_names(path: &Path) -> Result<LabelNames> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read label names '{}'", path.display()))?;

    let mut names: Vec<String> = text.lines().map(|l| l.trim().to_string()).collect();
    while names.last().is_some_and(|n| n.is_empty()) {
        names.pop();
    }

    Ok(LabelNames::new(names))
}
