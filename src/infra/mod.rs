// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Artifact persistence and rendering used by the orchestrator and
// the use cases:
//
//   checkpoint.rs — best-model parameter snapshots (bestmodel.pth)
//                   and the run config (train_config.json)
//
//   metrics.rs    — append-only metric history and its four .npy
//                   arrays (train/val accuracy and loss)
//
//   plot.rs       — two-panel accuracy/loss figure
//
//   video.rs      — draws predicted skeletons onto frames
//
//   avi.rs        — Motion-JPEG AVI container writer used by video.rs
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

/// Model parameter snapshots and run config persistence
pub mod checkpoint;

/// Per-epoch metric history and .npy export
pub mod metrics;

/// Accuracy / loss curve figure
pub mod plot;

/// Prediction video rendering
pub mod video;

/// RIFF/AVI container for Motion-JPEG frames
pub mod avi;
