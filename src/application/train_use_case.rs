// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load .npy skeleton files       (Layer 4 - data)
//   Step 2: Split train/validation         (Layer 4 - data)
//   Step 3: Build datasets + loaders       (Layer 4 - data)
//   Step 4: Save config                    (Layer 6 - infra)
//   Step 5: Build model + Adam             (Layer 5 - ml)
//   Step 6: Run the epoch loop             (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::AdamConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    batcher::SkeletonBatcher,
    dataset::SkeletonDataset,
    loader::NpyDirLoader,
    splitter::split_train_val,
};
use crate::domain::traits::SampleSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    model::{SkeletonMlp, SkeletonMlpConfig},
    phase::NUM_CLASSES,
    trainer::{Orchestrator, OrchestratorSettings, TrainingReport},
    TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoint so `predict` can rebuild the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub hidden_size:    usize,
    pub num_classes:    usize,
    pub val_fraction:   f64,
    pub seed:           u64,

    /// [bodies, frames, joints, coords], taken from the data at train time
    pub input_shape:    [usize; 4],

    #[serde(default = "default_plot")]
    pub plot:           bool,
}

fn default_plot() -> bool {
    true
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/skeletons".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            epochs:         50,
            batch_size:     32,
            lr:             0.005,
            hidden_size:    256,
            num_classes:    NUM_CLASSES,
            val_fraction:   0.2,
            seed:           42,
            input_shape:    [2, 300, 25, 3],
            plot:           true,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingReport> {
        let mut cfg = self.config.clone();

        // ── Step 1: Load skeleton samples ────────────────────────────────────
        tracing::info!("Loading skeleton files from '{}'", cfg.data_dir);
        let samples = NpyDirLoader::new(&cfg.data_dir).load_all()?;
        let Some(first) = samples.first() else {
            bail!("No labelled .npy files found in '{}'", cfg.data_dir);
        };
        cfg.input_shape = first.sequence.shape();
        tracing::info!("Loaded {} samples shaped {:?}", samples.len(), cfg.input_shape);

        // ── Step 2: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) =
            split_train_val(samples, 1.0 - cfg.val_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 3: Datasets and loaders ──────────────────────────────────────
        let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();

        let train_loader = DataLoaderBuilder::new(SkeletonBatcher::<TrainBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .build(SkeletonDataset::new(train_samples));

        let val_loader = DataLoaderBuilder::new(SkeletonBatcher::<TrainBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .build(SkeletonDataset::new(val_samples));

        // ── Step 4: Save config for prediction ────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt.ensure_dir()
            .with_context(|| format!("Cannot create '{}'", cfg.checkpoint_dir))?;
        ckpt.save_config(&cfg)?;

        // ── Step 5: Model and optimiser ───────────────────────────────────────
        let model = SkeletonMlpConfig::for_shape(cfg.input_shape, cfg.hidden_size, cfg.num_classes)
            .init::<TrainBackend>(&device);
        let optim = AdamConfig::new()
            .with_epsilon(1e-8)
            .init::<TrainBackend, SkeletonMlp<TrainBackend>>();

        let settings = OrchestratorSettings {
            learning_rate: cfg.lr,
            num_classes:   cfg.num_classes,
            plot_curves:   cfg.plot,
        };
        let mut orchestrator = Orchestrator::new(model, optim, device, settings);

        // ── Step 6: Epoch loop ────────────────────────────────────────────────
        let report = orchestrator
            .train_for_epochs(
                train_loader.as_ref(),
                val_loader.as_ref(),
                cfg.epochs,
                &PathBuf::from(&cfg.checkpoint_dir),
            )
            .context("Training run failed")?;

        tracing::info!(
            "Best val_acc={:.4}, checkpoint written on epochs {:?}",
            report.best_accuracy,
            report.checkpoint_epochs
        );
        Ok(report)
    }
}
