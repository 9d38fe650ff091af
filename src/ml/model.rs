use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::relu,
};

/// A model the orchestrator can train: maps a skeleton batch
/// `[batch, bodies, frames, joints, coords]` to class scores `[batch, classes]`.
pub trait SkeletonClassifier<B: Backend>: Module<B> {
    fn forward(&self, skeletons: Tensor<B, 5>) -> Tensor<B, 2>;
}

#[derive(Config, Debug)]
pub struct SkeletonMlpConfig {
    pub input_features: usize,
    pub hidden_size:    usize,
    pub num_classes:    usize,
}

impl SkeletonMlpConfig {
    /// Config for sequences of shape [bodies, frames, joints, coords].
    pub fn for_shape(shape: [usize; 4], hidden_size: usize, num_classes: usize) -> Self {
        Self::new(shape.iter().product(), hidden_size, num_classes)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SkeletonMlp<B> {
        SkeletonMlp {
            hidden: LinearConfig::new(self.input_features, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
        }
    }
}

/// Baseline classifier: flatten → Linear → ReLU → Linear.
#[derive(Module, Debug)]
pub struct SkeletonMlp<B: Backend> {
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> SkeletonClassifier<B> for SkeletonMlp<B> {
    fn forward(&self, skeletons: Tensor<B, 5>) -> Tensor<B, 2> {
        // [batch, M, T, V, C] → [batch, M·T·V·C]
        let x = skeletons.flatten::<2>(1, 4);
        self.output.forward(relu(self.hidden.forward(x)))
    }
}
