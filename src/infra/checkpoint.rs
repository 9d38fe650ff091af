// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model parameters with Burn's named
// MessagePack recorder at full precision, so a reloaded model
// reproduces the saved one's predictions exactly.
//
// File layout inside the checkpoint directory:
//   bestmodel.pth       ← parameters of the best validation epoch,
//                         overwritten on every new best
//   train_config.json   ← run config, used to rebuild the model
//                         before loading parameters for prediction
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    module::{ModuleVisitor, ParamId},
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::error::{TrainError, TrainResult};

/// File name of the best-model snapshot
pub const BEST_MODEL_FILE: &str = "bestmodel.pth";

/// File name of the persisted run config
pub const CONFIG_FILE: &str = "train_config.json";

type ParamRecorder = NamedMpkBytesRecorder<FullPrecisionSettings>;

/// Owns the checkpoint directory layout.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (and parents) if it does not exist.
    pub fn ensure_dir(&self) -> TrainResult<()> {
        fs::create_dir_all(&self.dir).map_err(TrainError::io(&self.dir))
    }

    pub fn best_model_path(&self) -> PathBuf {
        self.dir.join(BEST_MODEL_FILE)
    }

    /// Overwrite the best-model snapshot with the given model.
    pub fn save_best<B: Backend, M: Module<B>>(&self, model: &M) -> TrainResult<PathBuf> {
        let path = self.best_model_path();
        save_parameters::<B, M>(model, &path)?;
        Ok(path)
    }

    /// Save the run config so the predict workflow can rebuild the model.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }
}

/// Serialise the model's parameters to `path`, replacing any existing file.
pub fn save_parameters<B: Backend, M: Module<B>>(model: &M, path: &Path) -> TrainResult<()> {
    let bytes = Recorder::<B>::record(&ParamRecorder::new(), model.clone().into_record(), ())
        .map_err(|e| TrainError::CheckpointEncode(e.to_string()))?;

    fs::write(path, bytes).map_err(TrainError::io(path))?;

    tracing::debug!("Saved parameters to '{}'", path.display());
    Ok(())
}

/// Load parameters from `path` into `model` on `device`.
///
/// Fails if the file is missing, cannot be decoded, or any of its
/// parameter tensors differs in shape from the model it is loaded into.
pub fn load_parameters<B: Backend, M: Module<B>>(
    model:  M,
    path:   &Path,
    device: &B::Device,
) -> TrainResult<M> {
    let bytes = fs::read(path).map_err(TrainError::io(path))?;

    let record: M::Record = Recorder::<B>::load(&ParamRecorder::new(), bytes, device)
        .map_err(|e| TrainError::CheckpointDecode {
            path:    path.to_path_buf(),
            message: e.to_string(),
        })?;

    let expected = param_shapes::<B, M>(&model);
    let loaded   = model.load_record(record);
    let found    = param_shapes::<B, M>(&loaded);

    if let Some(message) = describe_mismatch(&expected, &found) {
        return Err(TrainError::CheckpointMismatch { path: path.to_path_buf(), message });
    }

    tracing::info!("Loaded {} parameters from '{}'", loaded.num_params(), path.display());
    Ok(loaded)
}

/// Dims of every float parameter, in visit order.
#[derive(Default)]
struct ParamShapes(Vec<Vec<usize>>);

impl<B: Backend> ModuleVisitor<B> for ParamShapes {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.0.push(tensor.dims().to_vec());
    }
}

fn param_shapes<B: Backend, M: Module<B>>(model: &M) -> Vec<Vec<usize>> {
    let mut shapes = ParamShapes::default();
    model.visit(&mut shapes);
    shapes.0
}

fn describe_mismatch(expected: &[Vec<usize>], found: &[Vec<usize>]) -> Option<String> {
    if expected.len() != found.len() {
        return Some(format!(
            "{} parameter tensors, model has {}",
            found.len(),
            expected.len()
        ));
    }
    expected
        .iter()
        .zip(found)
        .position(|(e, f)| e != f)
        .map(|i| format!("tensor {i} is {:?}, model expects {:?}", found[i], expected[i]))
}
