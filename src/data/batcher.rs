// ============================================================
// Layer 4 — Skeleton Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<SkeletonSample>
// into tensors.
//
//   Input:  N samples, each [M, T, V, C] (bodies, frames, joints, coords)
//   Output: SkeletonBatch with skeletons [N, M, T, V, C],
//           labels [N] and the N sample names
//
// All samples share one shape (the loader enforces it), so the
// flat buffers concatenate directly.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::skeleton::SkeletonSample;

// ─── SkeletonBatch ────────────────────────────────────────────────────────────
/// A batch of skeleton samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SkeletonBatch<B: Backend> {
    /// Keypoints — shape: [batch_size, bodies, frames, joints, coords]
    pub skeletons: Tensor<B, 5>,

    /// Ground truth classes — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,

    /// Sample names, in batch order
    pub identifiers: Vec<String>,
}

// ─── SkeletonBatcher ──────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct SkeletonBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SkeletonBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SkeletonSample, SkeletonBatch<B>> for SkeletonBatcher<B> {
    fn batch(&self, items: Vec<SkeletonSample>) -> SkeletonBatch<B> {
        let batch_size   = items.len();
        let [m, t, v, c] = items[0].sequence.shape();

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.sequence.values().iter().copied())
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let identifiers: Vec<String> = items.iter().map(|s| s.name.clone()).collect();

        let skeletons = Tensor::<B, 5>::from_data(
            TensorData::new(flat, [batch_size, m, t, v, c]),
            &self.device,
        );

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SkeletonBatch { skeletons, labels, identifiers }
    }
}
