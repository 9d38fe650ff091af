use burn::data::dataset::Dataset;

use crate::domain::skeleton::SkeletonSample;

pub struct SkeletonDataset {
    samples: Vec<SkeletonSample>,
}

impl SkeletonDataset {
    pub fn new(samples: Vec<SkeletonSample>) -> Self { Self { samples } }
}

impl Dataset<SkeletonSample> for SkeletonDataset {
    fn get(&self, index: usize) -> Option<SkeletonSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
