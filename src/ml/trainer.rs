// ============================================================
// Layer 5 — Training Orchestrator
// ============================================================
// Owns the model, the optimiser and the loss, and drives three
// loops over Burn data loaders:
//
//   run_phase(Train)     forward → MSE(one-hot) → backward → Adam step
//   run_phase(Evaluate)  forward on model.valid(), no gradients
//   predict              Evaluate + sample identifiers
//
// train_for_epochs repeats Train → Evaluate a fixed number of
// times. After each epoch the metric history grows by one entry
// and, if validation accuracy strictly beats the best so far,
// bestmodel.pth is overwritten. At the end the four metric arrays
// are written and the curves plotted.
//
// Key Burn details:
//   - Burn returns fresh gradients from every backward(), so there
//     is nothing to zero between steps
//   - model.valid() gives a copy on the inner backend; it lives only
//     for the evaluation loop and is dropped on every exit path
//   - argmax / accuracy are computed host-side on the concatenated
//     predictions
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use burn::{
    data::dataloader::DataLoader,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::Path;

use crate::data::batcher::SkeletonBatch;
use crate::domain::error::TrainResult;
use crate::infra::checkpoint::{load_parameters, CheckpointManager};
use crate::infra::metrics::MetricHistory;
use crate::infra::plot::{render_curves, FIGURE_FILE};
use crate::ml::model::SkeletonClassifier;
use crate::ml::phase::{
    check_prediction_shape, floats_to_host, labels_to_host, one_hot, PhaseAccumulator,
    PhaseOutcome, PredictionOutcome, RunMode, NUM_CLASSES,
};

/// Knobs that stay fixed for the lifetime of an orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Adam learning rate
    pub learning_rate: f64,

    /// Width of the one-hot targets; predictions must match it
    pub num_classes: usize,

    /// Render fig_train_skeleton.png at the end of train_for_epochs
    pub plot_curves: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.005,
            num_classes:   NUM_CLASSES,
            plot_curves:   true,
        }
    }
}

/// What a multi-epoch run produced.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub history: MetricHistory,

    /// Best validation accuracy, 0.0 if no epoch beat the initial marker
    pub best_accuracy: f64,

    /// 1-based epochs on which bestmodel.pth was written
    pub checkpoint_epochs: Vec<usize>,
}

pub struct Orchestrator<B: AutodiffBackend, M, O> {
    model:     M,
    optimizer: O,
    device:    B::Device,
    settings:  OrchestratorSettings,
}

impl<B, M, O> Orchestrator<B, M, O>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + SkeletonClassifier<B>,
    M::InnerModule: SkeletonClassifier<B::InnerBackend>,
    O: Optimizer<M, B>,
{
    /// Take ownership of `model`, placed on `device` for the whole run.
    pub fn new(model: M, optimizer: O, device: B::Device, settings: OrchestratorSettings) -> Self {
        let model = model.fork(&device);
        tracing::info!("Orchestrator ready on {:?}: {} parameters", device, model.num_params());
        Self { model, optimizer, device, settings }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// One pass over `loader`.
    pub fn run_phase(
        &mut self,
        loader: &dyn DataLoader<SkeletonBatch<B>>,
        mode:   RunMode,
    ) -> TrainResult<PhaseOutcome> {
        let outcome = match mode {
            RunMode::Train    => self.train_pass(loader)?,
            RunMode::Evaluate => self.evaluate_pass(loader)?,
        };
        Ok(outcome.phase)
    }

    /// Evaluate-mode pass that also returns the sample identifiers.
    pub fn predict(&self, loader: &dyn DataLoader<SkeletonBatch<B>>) -> TrainResult<PredictionOutcome> {
        let outcome = self.evaluate_pass(loader)?;
        tracing::info!(
            "Predicted {} samples: accuracy={:.4} loss={:.6}",
            outcome.identifiers.len(),
            outcome.phase.accuracy,
            outcome.phase.mean_loss,
        );
        Ok(outcome)
    }

    /// Run `epoch_count` train → validate epochs, checkpointing the best
    /// model into `checkpoint_dir` and writing the metric artifacts there.
    pub fn train_for_epochs(
        &mut self,
        train_loader:   &dyn DataLoader<SkeletonBatch<B>>,
        val_loader:     &dyn DataLoader<SkeletonBatch<B>>,
        epoch_count:    usize,
        checkpoint_dir: &Path,
    ) -> TrainResult<TrainingReport> {
        let ckpt = CheckpointManager::new(checkpoint_dir);
        ckpt.ensure_dir()?;

        let mut history           = MetricHistory::new();
        let mut best_accuracy     = 0.0f64;
        let mut checkpoint_epochs = Vec::new();

        for epoch in 1..=epoch_count {
            tracing::info!("Epoch {}/{} started", epoch, epoch_count);

            let train = self.run_phase(train_loader, RunMode::Train)?.metrics();
            let val   = self.run_phase(val_loader, RunMode::Evaluate)?.metrics();

            println!(
                "Epoch {:>3}/{} | train_acc={:.4} train_loss={:.6} | val_acc={:.4} val_loss={:.6}",
                epoch, epoch_count, train.accuracy, train.loss, val.accuracy, val.loss,
            );

            history.record(train, val);

            // Ties keep the earlier snapshot
            if val.accuracy > best_accuracy {
                best_accuracy = val.accuracy;
                let path = ckpt.save_best::<B, M>(&self.model)?;
                checkpoint_epochs.push(epoch);
                tracing::info!(
                    "New best val_acc={:.4} at epoch {}, saved '{}'",
                    best_accuracy,
                    epoch,
                    path.display()
                );
            }
        }

        history.persist(ckpt.dir())?;

        if self.settings.plot_curves {
            render_curves(&history, &ckpt.dir().join(FIGURE_FILE))?;
        }

        tracing::info!("Training complete! best val_acc={:.4}", best_accuracy);
        Ok(TrainingReport { history, best_accuracy, checkpoint_epochs })
    }

    /// Replace the model's parameters with the snapshot at `path`.
    /// On failure the current parameters are left untouched.
    pub fn load_checkpoint(&mut self, path: &Path) -> TrainResult<()> {
        let loaded = load_parameters::<B, M>(self.model.clone(), path, &self.device)?;
        self.model = loaded;
        Ok(())
    }

    fn train_pass(&mut self, loader: &dyn DataLoader<SkeletonBatch<B>>) -> TrainResult<PredictionOutcome> {
        let classes  = self.settings.num_classes;
        let loss_fn  = MseLoss::new();
        let mut acc  = PhaseAccumulator::new(classes);

        for (step, batch) in loader.iter().enumerate() {
            let labels = labels_to_host(batch.labels)?;

            let prediction = self.model.forward(batch.skeletons);
            check_prediction_shape(prediction.dims(), labels.len(), classes)?;
            let target = one_hot::<B>(&labels, classes, &prediction.device())?;

            let loss = loss_fn.forward(prediction.clone(), target, Reduction::Mean);
            let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();

            // Backward pass + Adam update
            let grads = GradientsParams::from_grads(loss.backward(), &self.model);
            self.model = self
                .optimizer
                .step(self.settings.learning_rate, self.model.clone(), grads);

            tracing::trace!(step, loss = loss_value, "train batch");
            acc.push(floats_to_host(prediction)?, labels, loss_value, batch.identifiers);
        }

        acc.finish()
    }

    fn evaluate_pass(&self, loader: &dyn DataLoader<SkeletonBatch<B>>) -> TrainResult<PredictionOutcome> {
        let classes = self.settings.num_classes;
        let loss_fn = MseLoss::new();
        let mut acc = PhaseAccumulator::new(classes);

        // Inner-backend copy: no autodiff graph is built below
        let model = self.model.valid();

        for (step, batch) in loader.iter().enumerate() {
            let labels = labels_to_host(batch.labels)?;

            let prediction = model.forward(batch.skeletons.inner());
            check_prediction_shape(prediction.dims(), labels.len(), classes)?;
            let target = one_hot::<B::InnerBackend>(&labels, classes, &prediction.device())?;

            let loss = loss_fn.forward(prediction.clone(), target, Reduction::Mean);
            let loss_value: f64 = loss.into_scalar().elem::<f64>();

            tracing::trace!(step, loss = loss_value, "eval batch");
            acc.push(floats_to_host(prediction)?, labels, loss_value, batch.identifiers);
        }

        acc.finish()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{batcher::SkeletonBatcher, dataset::SkeletonDataset};
    use crate::domain::error::TrainError;
    use crate::domain::skeleton::{SkeletonSample, SkeletonSequence};
    use crate::infra::checkpoint::{save_parameters, BEST_MODEL_FILE};
    use crate::ml::model::{SkeletonMlp, SkeletonMlpConfig};
    use burn::{
        backend::{Autodiff, NdArray},
        data::dataloader::DataLoaderBuilder,
        module::Ignored,
        nn::{Linear, LinearConfig},
        optim::AdamConfig,
        tensor::TensorData,
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tempfile::tempdir;

    type TestBackend = Autodiff<NdArray<f32>>;

    const SHAPE: [usize; 4] = [1, 2, 3, 2];

    /// Scores class 0 with certainty for every sample.
    #[derive(Module, Debug)]
    struct AlwaysFirstClass<B: Backend> {
        anchor:      Linear<B>,
        num_classes: usize,
    }

    impl<B: Backend> SkeletonClassifier<B> for AlwaysFirstClass<B> {
        fn forward(&self, skeletons: Tensor<B, 5>) -> Tensor<B, 2> {
            let [batch, _, _, _, _] = skeletons.dims();
            let mut data = vec![0.0f32; batch * self.num_classes];
            for row in 0..batch {
                data[row * self.num_classes] = 1.0;
            }
            Tensor::from_data(
                TensorData::new(data, [batch, self.num_classes]),
                &skeletons.device(),
            )
        }
    }

    /// Two-class model whose k-th validation pass gets `script[k]` rows right
    /// (labels all 0, one batch per phase). A uniform weight-dependent shift
    /// keeps the parameters moving without changing any arg-max.
    #[derive(Module, Debug)]
    struct ScriptedAccuracy<B: Backend> {
        anchor: Linear<B>,
        calls:  Ignored<Arc<AtomicUsize>>,
        script: Ignored<Vec<usize>>,
    }

    impl<B: Backend> SkeletonClassifier<B> for ScriptedAccuracy<B> {
        fn forward(&self, skeletons: Tensor<B, 5>) -> Tensor<B, 2> {
            let [batch, ..] = skeletons.dims();
            // Train and validation passes alternate
            let call    = self.calls.0.fetch_add(1, Ordering::SeqCst);
            let correct = self.script.0.get(call / 2).copied().unwrap_or(0);

            let mut data = vec![0.0f32; batch * 2];
            for row in 0..batch {
                let class = if row < correct { 0 } else { 1 };
                data[row * 2 + class] = 1.0;
            }
            let scores = Tensor::<B, 2>::from_data(TensorData::new(data, [batch, 2]), &skeletons.device());
            let shift  = self.anchor.weight.val().sum().mul_scalar(0.1);
            scores + shift.unsqueeze::<2>()
        }
    }

    fn scripted_orchestrator(
        script: &[usize],
    ) -> Orchestrator<TestBackend, ScriptedAccuracy<TestBackend>, impl Optimizer<ScriptedAccuracy<TestBackend>, TestBackend>>
    {
        let device = Default::default();
        let model  = ScriptedAccuracy::<TestBackend> {
            anchor: LinearConfig::new(1, 1).init(&device),
            calls:  Ignored(Arc::new(AtomicUsize::new(0))),
            script: Ignored(script.to_vec()),
        };
        let optim = AdamConfig::new().init::<TestBackend, ScriptedAccuracy<TestBackend>>();
        Orchestrator::new(model, optim, device, settings(2))
    }

    fn anchor_weights<B: Backend>(model: &ScriptedAccuracy<B>) -> Vec<f32> {
        model.anchor.weight.val().into_data().convert::<f32>().to_vec::<f32>().unwrap()
    }

    fn sample(index: usize, label: usize) -> SkeletonSample {
        let len    = SHAPE.iter().product::<usize>();
        let values = (0..len)
            .map(|i| (label as f32 + 1.0) * 0.5 + (i + index) as f32 * 0.01)
            .collect();
        let seq = SkeletonSequence::new(SHAPE, values).unwrap();
        SkeletonSample::new(format!("S001C001P001R001A{:03}_{index}", label + 1), label, seq)
    }

    fn samples(labels: &[usize]) -> Vec<SkeletonSample> {
        labels.iter().enumerate().map(|(i, &l)| sample(i, l)).collect()
    }

    fn loader(
        samples:    Vec<SkeletonSample>,
        batch_size: usize,
    ) -> Arc<dyn DataLoader<SkeletonBatch<TestBackend>>> {
        DataLoaderBuilder::new(SkeletonBatcher::<TestBackend>::new(Default::default()))
            .batch_size(batch_size)
            .build(SkeletonDataset::new(samples))
    }

    fn settings(num_classes: usize) -> OrchestratorSettings {
        OrchestratorSettings { learning_rate: 0.01, num_classes, plot_curves: false }
    }

    fn mlp_orchestrator(
        num_classes: usize,
    ) -> Orchestrator<TestBackend, SkeletonMlp<TestBackend>, impl Optimizer<SkeletonMlp<TestBackend>, TestBackend>>
    {
        let device = Default::default();
        let model  = SkeletonMlpConfig::for_shape(SHAPE, 8, num_classes).init::<TestBackend>(&device);
        let optim  = AdamConfig::new().init::<TestBackend, SkeletonMlp<TestBackend>>();
        Orchestrator::new(model, optim, device, settings(num_classes))
    }

    #[test]
    fn test_constant_model_scores_half() {
        let device = Default::default();
        let model  = AlwaysFirstClass::<TestBackend> {
            anchor:      LinearConfig::new(1, 1).init(&device),
            num_classes: NUM_CLASSES,
        };
        let optim = AdamConfig::new().init::<TestBackend, AlwaysFirstClass<TestBackend>>();
        let mut orchestrator = Orchestrator::new(model, optim, device, settings(NUM_CLASSES));

        let batches = loader(samples(&[0, 1, 0, 1]), 1);
        let outcome = orchestrator
            .run_phase(batches.as_ref(), RunMode::Evaluate)
            .unwrap();

        assert_eq!(outcome.accuracy, 0.5);
        assert_eq!(outcome.labels.to_vec(), vec![0, 1, 0, 1]);
        assert_eq!(outcome.predictions.dim(), (4, NUM_CLASSES));
        // Wrong rows miss two one-hot positions out of 60
        assert!((outcome.mean_loss - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_train_phase_updates_parameters() {
        let mut orchestrator = mlp_orchestrator(2);
        let batches = loader(samples(&[0, 1, 0, 1]), 2);

        let before = orchestrator.run_phase(batches.as_ref(), RunMode::Evaluate).unwrap();
        let trained = orchestrator.run_phase(batches.as_ref(), RunMode::Train).unwrap();
        let after  = orchestrator.run_phase(batches.as_ref(), RunMode::Evaluate).unwrap();

        assert_eq!(trained.predictions.dim(), (4, 2));
        assert!((0.0..=1.0).contains(&trained.accuracy));
        assert!(trained.mean_loss >= 0.0);
        assert_ne!(before.predictions, after.predictions);
    }

    #[test]
    fn test_evaluate_phase_is_repeatable() {
        let mut orchestrator = mlp_orchestrator(2);
        let batches = loader(samples(&[0, 1, 1]), 2);

        let first  = orchestrator.run_phase(batches.as_ref(), RunMode::Evaluate).unwrap();
        let second = orchestrator.run_phase(batches.as_ref(), RunMode::Evaluate).unwrap();

        assert_eq!(first.predictions, second.predictions);
        assert_eq!(first.mean_loss, second.mean_loss);
    }

    #[test]
    fn test_label_outside_class_range_fails() {
        let mut orchestrator = mlp_orchestrator(2);
        let batches = loader(samples(&[0, 2]), 2);

        let err = orchestrator.run_phase(batches.as_ref(), RunMode::Train).unwrap_err();
        assert!(matches!(err, TrainError::LabelOutOfRange { label: 2, num_classes: 2 }));
    }

    #[test]
    fn test_prediction_width_must_match_classes() {
        let device = Default::default();
        let model  = SkeletonMlpConfig::for_shape(SHAPE, 4, 3).init::<TestBackend>(&device);
        let optim  = AdamConfig::new().init::<TestBackend, SkeletonMlp<TestBackend>>();
        let mut orchestrator = Orchestrator::new(model, optim, device, settings(NUM_CLASSES));

        let err = orchestrator
            .run_phase(loader(samples(&[0]), 1).as_ref(), RunMode::Evaluate)
            .unwrap_err();
        assert!(matches!(err, TrainError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_zero_epochs_writes_empty_artifacts() {
        let dir  = tempdir().unwrap();
        let ckpt = dir.path().join("nested").join("run");
        let mut orchestrator = mlp_orchestrator(2);

        let report = orchestrator
            .train_for_epochs(
                loader(samples(&[0, 1]), 1).as_ref(),
                loader(samples(&[0, 1]), 1).as_ref(),
                0,
                &ckpt,
            )
            .unwrap();

        assert!(ckpt.is_dir());
        assert!(report.history.is_empty());
        assert!(report.checkpoint_epochs.is_empty());
        assert!(!ckpt.join(BEST_MODEL_FILE).exists());
        assert!(MetricHistory::load(&ckpt).unwrap().is_empty());
    }

    #[test]
    fn test_training_run_records_every_epoch() {
        let dir = tempdir().unwrap();
        let mut orchestrator = mlp_orchestrator(2);

        let train = loader(samples(&[0, 1, 0, 1, 0, 1, 0, 1]), 2);
        let val   = loader(samples(&[1, 0, 1, 0]), 2);

        let report = orchestrator
            .train_for_epochs(train.as_ref(), val.as_ref(), 4, dir.path())
            .unwrap();

        let persisted = MetricHistory::load(dir.path()).unwrap();
        assert_eq!(persisted, report.history);
        assert_eq!(persisted.epochs(), 4);
        assert_eq!(persisted.val_loss.len(), 4);

        for acc in persisted.train_accuracy.iter().chain(&persisted.val_accuracy) {
            assert!((0.0..=1.0).contains(acc));
        }
        for loss in persisted.train_loss.iter().chain(&persisted.val_loss) {
            assert!(*loss >= 0.0);
        }

        // Checkpoints land exactly on strict improvements over the running best
        let mut best = 0.0;
        let mut expected = Vec::new();
        for (i, &acc) in persisted.val_accuracy.iter().enumerate() {
            if acc > best {
                best = acc;
                expected.push(i + 1);
            }
        }
        assert_eq!(report.checkpoint_epochs, expected);
        assert_eq!(report.best_accuracy, best);
        assert_eq!(dir.path().join(BEST_MODEL_FILE).exists(), !expected.is_empty());
    }

    #[test]
    fn test_each_strict_improvement_overwrites_snapshot() {
        let dir = tempdir().unwrap();
        // val_acc = 0.25, 0.25, 0.75, 0.5, 1.0
        let mut trained = scripted_orchestrator(&[1, 1, 3, 2, 4]);

        let report = trained
            .train_for_epochs(
                loader(samples(&[0, 0, 0, 0]), 4).as_ref(),
                loader(samples(&[0, 0, 0, 0]), 4).as_ref(),
                5,
                dir.path(),
            )
            .unwrap();

        assert_eq!(report.history.val_accuracy, vec![0.25, 0.25, 0.75, 0.5, 1.0]);
        assert_eq!(report.checkpoint_epochs, vec![1, 3, 5]);
        assert_eq!(report.best_accuracy, 1.0);

        // The last write happened after the final training pass
        let mut reloaded = scripted_orchestrator(&[]);
        reloaded.load_checkpoint(&dir.path().join(BEST_MODEL_FILE)).unwrap();
        assert_eq!(anchor_weights(reloaded.model()), anchor_weights(trained.model()));
    }

    #[test]
    fn test_regression_keeps_earlier_snapshot() {
        let dir = tempdir().unwrap();
        // val_acc = 0.5, 1.0, 0.25
        let mut trained = scripted_orchestrator(&[2, 4, 1]);

        let report = trained
            .train_for_epochs(
                loader(samples(&[0, 0, 0, 0]), 4).as_ref(),
                loader(samples(&[0, 0, 0, 0]), 4).as_ref(),
                3,
                dir.path(),
            )
            .unwrap();

        assert_eq!(report.checkpoint_epochs, vec![1, 2]);

        // Epoch 3 trained further but must not have replaced the epoch-2 file
        let mut reloaded = scripted_orchestrator(&[]);
        reloaded.load_checkpoint(&dir.path().join(BEST_MODEL_FILE)).unwrap();
        assert_ne!(anchor_weights(reloaded.model()), anchor_weights(trained.model()));
    }

    #[test]
    fn test_reloaded_checkpoint_reproduces_predictions() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join(BEST_MODEL_FILE);
        let batches = loader(samples(&[0, 1, 1, 0]), 2);

        let mut trained = mlp_orchestrator(2);
        trained.run_phase(batches.as_ref(), RunMode::Train).unwrap();
        save_parameters::<TestBackend, _>(trained.model(), &path).unwrap();

        let mut fresh = mlp_orchestrator(2);
        fresh.load_checkpoint(&path).unwrap();

        let expected = trained.predict(batches.as_ref()).unwrap();
        let actual   = fresh.predict(batches.as_ref()).unwrap();
        assert_eq!(expected.phase.predictions, actual.phase.predictions);
    }

    #[test]
    fn test_load_missing_checkpoint_fails() {
        let dir = tempdir().unwrap();
        let mut orchestrator = mlp_orchestrator(2);

        let err = orchestrator
            .load_checkpoint(&dir.path().join(BEST_MODEL_FILE))
            .unwrap_err();
        assert!(matches!(err, TrainError::Io { .. }));
    }

    #[test]
    fn test_predict_threads_identifiers() {
        let orchestrator = mlp_orchestrator(2);
        let input = samples(&[1, 0, 1]);
        let names: Vec<String> = input.iter().map(|s| s.name.clone()).collect();

        let outcome = orchestrator.predict(loader(input, 2).as_ref()).unwrap();

        assert_eq!(outcome.identifiers, names);
        assert_eq!(outcome.phase.predictions.dim(), (3, 2));
        assert_eq!(outcome.phase.predicted_classes().len(), 3);
    }
}
