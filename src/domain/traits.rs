// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks a SampleSource for labelled skeleton
// samples without knowing where they come from.
//
// Implementations:
//   - NpyDirLoader → a directory of .npy keypoint arrays
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::skeleton::SkeletonSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled skeleton samples.
pub trait SampleSource {
    /// Load every available sample, in a stable order.
    fn load_all(&self) -> Result<Vec<SkeletonSample>>;
}
