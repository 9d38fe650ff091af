// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All code that drives Burn's autodiff, optimiser and loss APIs
// lives here.
//
//   model.rs   — the SkeletonClassifier trait every model plugs in
//                through, plus a small baseline MLP
//
//   phase.rs   — run modes, per-phase outcomes, one-hot targets
//                and accuracy
//
//   trainer.rs — the training orchestrator: train / validate /
//                predict loops, best-model checkpointing and
//                metric history
//
// Backend selection happens once, here. NdArray (CPU) by default,
// wgpu when the `wgpu` cargo feature is enabled.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Classifier trait and baseline model
pub mod model;

/// Run modes, phase outcomes and metric helpers
pub mod phase;

/// Epoch orchestration and checkpointing
pub mod trainer;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray<f32>;

/// Backend used for training: gradients tracked on top of InnerBackend
pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;
