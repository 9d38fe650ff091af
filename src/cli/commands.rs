// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their configurable flags.
//
// clap's derive macros generate help text, missing-argument
// errors and string → number conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{predict_use_case::PredictConfig, train_use_case::TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a classifier on a directory of .npy skeleton files
    Train(TrainArgs),

    /// Classify skeleton files with the best checkpoint and render videos
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory of .npy files shaped [bodies, frames, joints, coords]
    #[arg(long, default_value = "data/skeletons")]
    pub data_dir: String,

    /// Where bestmodel.pth, metric arrays and the figure are written
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of train → validate epochs
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.005)]
    pub lr: f64,

    /// Width of the baseline model's hidden layer
    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 60)]
    pub num_classes: usize,

    /// Share of samples held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Seed for the split and the training shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skip fig_train_skeleton.png (headless machines without fonts)
    #[arg(long)]
    pub no_plot: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            hidden_size:    a.hidden_size,
            num_classes:    a.num_classes,
            val_fraction:   a.val_fraction,
            seed:           a.seed,
            plot:           !a.no_plot,
            ..TrainConfig::default()
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, default_value = "data/skeletons")]
    pub data_dir: String,

    /// Directory written by `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Where predictions.csv and the videos go
    #[arg(long, default_value = "predictions")]
    pub prediction_dir: String,

    /// Text file with one class name per line
    #[arg(long)]
    pub label_names: Option<String>,

    /// Render at most this many samples as video
    #[arg(long, default_value_t = 4)]
    pub render_limit: usize,

    /// Directory of the source RGB clips, recorded in video metadata
    #[arg(long)]
    pub video_dir: Option<String>,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            prediction_dir: a.prediction_dir,
            label_names:    a.label_names,
            render_limit:   a.render_limit,
            video_dir:      a.video_dir,
        }
    }
}
