// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Reloads a finished training run and classifies a directory
// of skeleton files:
//
//   Step 1: Load train_config.json         (Layer 6 - infra)
//   Step 2: Rebuild model, load bestmodel  (Layer 5 - ml)
//   Step 3: Predict every sample           (Layer 5 - ml)
//   Step 4: Write predictions.csv          (Layer 2)
//   Step 5: Render the first N as videos   (Layer 6 - infra)

use anyhow::{bail, Context, Result};
use burn::{data::dataloader::DataLoaderBuilder, optim::AdamConfig};
use std::{
    borrow::Cow,
    collections::HashMap,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::data::{
    batcher::SkeletonBatcher,
    dataset::SkeletonDataset,
    loader::{load_label_names, NpyDirLoader},
};
use crate::domain::{labels::LabelNames, skeleton::SkeletonSample, traits::SampleSource};
use crate::infra::{checkpoint::CheckpointManager, video::render_prediction_video};
use crate::ml::{
    model::{SkeletonMlp, SkeletonMlpConfig},
    trainer::{Orchestrator, OrchestratorSettings},
    TrainBackend,
};

/// File name of the per-sample prediction table
pub const PREDICTIONS_FILE: &str = "predictions.csv";

/// Batch size used for prediction; independent of the training batch size
const PREDICT_BATCH_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub prediction_dir: String,
    /// Optional text file, one class name per line
    pub label_names:    Option<String>,
    /// How many samples (in file-name order) to render as video
    pub render_limit:   usize,
    /// Directory holding the source clips, recorded in each video's metadata
    pub video_dir:      Option<String>,
}

/// Outcome of a prediction run.
#[derive(Debug, Clone)]
pub struct PredictReport {
    pub accuracy:     f64,
    pub sample_count: usize,
    pub csv_path:     PathBuf,
    pub videos:       Vec<PathBuf>,
}

pub struct PredictUseCase {
    config: PredictConfig,
}

impl PredictUseCase {
    pub fn new(config: PredictConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PredictReport> {
        let cfg  = &self.config;
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);

        // ── Step 1: Run config ────────────────────────────────────────────────
        let train_cfg = ckpt.load_config()?;

        // ── Step 2: Rebuild and restore the model ─────────────────────────────
        let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
        let model  = SkeletonMlpConfig::for_shape(
            train_cfg.input_shape,
            train_cfg.hidden_size,
            train_cfg.num_classes,
        )
        .init::<TrainBackend>(&device);
        let optim = AdamConfig::new().init::<TrainBackend, SkeletonMlp<TrainBackend>>();

        let settings = OrchestratorSettings {
            learning_rate: train_cfg.lr,
            num_classes:   train_cfg.num_classes,
            plot_curves:   false,
        };
        let mut orchestrator = Orchestrator::new(model, optim, device.clone(), settings);
        orchestrator
            .load_checkpoint(&ckpt.best_model_path())
            .context("Cannot restore the best model. Has training produced a checkpoint?")?;

        // ── Step 3: Predict ───────────────────────────────────────────────────
        let samples = NpyDirLoader::new(&cfg.data_dir).load_all()?;
        if samples.is_empty() {
            bail!("No labelled .npy files found in '{}'", cfg.data_dir);
        }
        if let Some(bad) = samples.iter().find(|s| s.sequence.shape() != train_cfg.input_shape) {
            bail!(
                "Sample '{}' is shaped {:?} but the model expects {:?}",
                bad.name,
                bad.sequence.shape(),
                train_cfg.input_shape
            );
        }

        // Only the rendered samples are kept past the prediction pass
        let to_render: HashMap<String, SkeletonSample> = samples
            .iter()
            .take(cfg.render_limit)
            .map(|s| (s.name.clone(), s.clone()))
            .collect();

        let loader = DataLoaderBuilder::new(SkeletonBatcher::<TrainBackend>::new(device))
            .batch_size(PREDICT_BATCH_SIZE)
            .build(SkeletonDataset::new(samples));

        let outcome   = orchestrator.predict(loader.as_ref())?;
        let predicted = outcome.phase.predicted_classes();

        // ── Step 4: Prediction table ──────────────────────────────────────────
        let out_dir = Path::new(&cfg.prediction_dir);
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Cannot create '{}'", out_dir.display()))?;

        let csv_path = out_dir.join(PREDICTIONS_FILE);
        write_predictions(&csv_path, &outcome.identifiers, outcome.phase.labels.as_slice(), &predicted)?;

        // ── Step 5: Videos ────────────────────────────────────────────────────
        let label_names = match &cfg.label_names {
            Some(path) => load_label_names(Path::new(path))?,
            None       => LabelNames::default(),
        };

        let mut videos = Vec::new();
        for (name, &class) in outcome.identifiers.iter().zip(&predicted) {
            let Some(sample) = to_render.get(name) else { continue };

            let source = cfg
                .video_dir
                .as_ref()
                .map(|dir| Path::new(dir).join(format!("{name}.avi")));

            let path = render_prediction_video(
                &sample.sequence,
                class,
                sample.label,
                name,
                &label_names,
                out_dir,
                source.as_deref(),
            )?;
            tracing::info!("Rendered '{}'", path.display());
            videos.push(path);
        }

        Ok(PredictReport {
            accuracy:     outcome.phase.accuracy,
            sample_count: outcome.identifiers.len(),
            csv_path,
            videos,
        })
    }
}

/// `name,label,predicted`, one row per sample.
fn write_predictions(
    path:        &Path,
    identifiers: &[String],
    labels:      Option<&[i64]>,
    predicted:   &[usize],
) -> Result<()> {
    let labels = labels.context("Label array is not contiguous")?;
    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "name,label,predicted")?;
    for ((name, label), class) in identifiers.iter().zip(labels).zip(predicted) {
        writeln!(out, "{},{label},{class}", csv_field(name))?;
    }
    out.flush()?;

    tracing::info!("Wrote {} predictions to '{}'", identifiers.len(), path.display());
    Ok(())
}

/// Quote a field holding a comma, quote or line break; inner quotes are doubled.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
