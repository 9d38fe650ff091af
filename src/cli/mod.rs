// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// `clap` and hands everything else to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — trains a classifier and checkpoints the best epoch
//   2. `predict` — reloads the checkpoint, writes predictions and
//                  renders videos
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "skeleton-trainer",
    version = "0.1.0",
    about = "Train a skeleton action classifier, then render its predictions to video."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routing only.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on skeletons in: {}", args.data_dir);

    let checkpoint_dir = args.checkpoint_dir.clone();
    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. Best val_acc={:.4}; artifacts in '{}'.",
        report.best_accuracy, checkpoint_dir
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let report = PredictUseCase::new(args.into()).execute()?;

    println!(
        "\nPredicted {} samples, accuracy {:.4}. Table: '{}'",
        report.sample_count,
        report.accuracy,
        report.csv_path.display()
    );
    for video in &report.videos {
        println!("  video: {}", video.display());
    }
    Ok(())
}
