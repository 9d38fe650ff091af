//! Run modes, per-phase outcomes and the host-side metric helpers the
//! orchestrator uses after every batch.

use burn::{prelude::*, tensor::TensorData};
use ndarray::{Array1, Array2, ArrayView2};

use crate::domain::error::{TrainError, TrainResult};
use crate::infra::metrics::PhaseMetrics;

/// Number of action classes in NTU RGB+D 60
pub const NUM_CLASSES: usize = 60;

/// How a phase treats the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Gradients tracked, one optimiser step per batch
    Train,
    /// Inner (non-autodiff) model, parameters frozen
    Evaluate,
}

/// Everything a phase produced, concatenated over all batches.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    /// Fraction of samples whose arg-max class equals the label
    pub accuracy:    f64,
    /// Raw model output, [samples, classes]
    pub predictions: Array2<f32>,
    /// Ground truth classes, [samples]
    pub labels:      Array1<i64>,
    /// Mean of the per-batch losses
    pub mean_loss:   f64,
}

impl PhaseOutcome {
    pub fn metrics(&self) -> PhaseMetrics {
        PhaseMetrics::new(self.accuracy, self.mean_loss)
    }

    /// Arg-max class per sample.
    pub fn predicted_classes(&self) -> Vec<usize> {
        argmax_rows(self.predictions.view())
    }
}

/// A prediction run: an evaluation phase plus the sample identifiers,
/// row-aligned with `phase.predictions`.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub phase:       PhaseOutcome,
    pub identifiers: Vec<String>,
}

/// Collects per-batch results until the phase ends.
#[derive(Debug)]
pub(crate) struct PhaseAccumulator {
    num_classes: usize,
    predictions: Vec<f32>,
    labels:      Vec<i64>,
    losses:      Vec<f64>,
    identifiers: Vec<String>,
}

impl PhaseAccumulator {
    pub(crate) fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            predictions: Vec::new(),
            labels:      Vec::new(),
            losses:      Vec::new(),
            identifiers: Vec::new(),
        }
    }

    pub(crate) fn push(
        &mut self,
        predictions: Vec<f32>,
        labels:      Vec<i64>,
        loss:        f64,
        identifiers: Vec<String>,
    ) {
        self.predictions.extend(predictions);
        self.labels.extend(labels);
        self.losses.push(loss);
        self.identifiers.extend(identifiers);
    }

    pub(crate) fn finish(self) -> TrainResult<PredictionOutcome> {
        let rows = self.labels.len();
        let predictions = Array2::from_shape_vec((rows, self.num_classes), self.predictions)
            .map_err(|e| TrainError::TensorData(e.to_string()))?;

        let accuracy  = accuracy(predictions.view(), &self.labels);
        let mean_loss = if self.losses.is_empty() {
            0.0
        } else {
            self.losses.iter().sum::<f64>() / self.losses.len() as f64
        };

        Ok(PredictionOutcome {
            phase: PhaseOutcome {
                accuracy,
                predictions,
                labels: Array1::from_vec(self.labels),
                mean_loss,
            },
            identifiers: self.identifiers,
        })
    }
}

/// Arg-max per row; the first maximum wins on ties.
pub fn argmax_rows(predictions: ArrayView2<'_, f32>) -> Vec<usize> {
    predictions
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |(best, max), (i, &v)| {
                    if v > max { (i, v) } else { (best, max) }
                })
                .0
        })
        .collect()
}

/// Fraction of rows whose arg-max equals the label. 0.0 for no rows.
pub fn accuracy(predictions: ArrayView2<'_, f32>, labels: &[i64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = argmax_rows(predictions)
        .into_iter()
        .zip(labels)
        .filter(|&(pred, &label)| pred as i64 == label)
        .count();
    correct as f64 / labels.len() as f64
}

/// One-hot float targets `[labels.len(), num_classes]`.
pub fn one_hot<B: Backend>(
    labels:      &[i64],
    num_classes: usize,
    device:      &B::Device,
) -> TrainResult<Tensor<B, 2>> {
    let mut data = vec![0.0f32; labels.len() * num_classes];
    for (row, &label) in labels.iter().enumerate() {
        if label < 0 || label as usize >= num_classes {
            return Err(TrainError::LabelOutOfRange { label, num_classes });
        }
        data[row * num_classes + label as usize] = 1.0;
    }
    Ok(Tensor::from_data(TensorData::new(data, [labels.len(), num_classes]), device))
}

pub(crate) fn check_prediction_shape(actual: [usize; 2], rows: usize, num_classes: usize) -> TrainResult<()> {
    let expected = [rows, num_classes];
    if actual != expected {
        return Err(TrainError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn labels_to_host<B: Backend>(labels: Tensor<B, 1, Int>) -> TrainResult<Vec<i64>> {
    labels
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| TrainError::TensorData(format!("{e:?}")))
}

pub(crate) fn floats_to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> TrainResult<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| TrainError::TensorData(format!("{e:?}")))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use ndarray::array;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_accuracy_counts_matching_rows() {
        let preds = array![[0.9, 0.1], [0.2, 0.8], [0.6, 0.4], [0.3, 0.7]];
        assert_eq!(accuracy(preds.view(), &[0, 1, 1, 1]), 0.75);
    }

    #[test]
    fn test_argmax_first_max_wins() {
        let preds = array![[0.5f32, 0.5, 0.1], [0.0, 0.2, 0.2]];
        assert_eq!(argmax_rows(preds.view()), vec![0, 1]);
    }

    #[test]
    fn test_accuracy_of_nothing_is_zero() {
        let preds = Array2::<f32>::zeros((0, 60));
        assert_eq!(accuracy(preds.view(), &[]), 0.0);
    }

    #[test]
    fn test_one_hot_layout() {
        let device = Default::default();
        let target = one_hot::<TestBackend>(&[2, 0], 3, &device).unwrap();

        assert_eq!(target.dims(), [2, 3]);
        let values = target.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_one_hot_rejects_out_of_range() {
        let device = Default::default();
        let err = one_hot::<TestBackend>(&[0, 60], NUM_CLASSES, &device).unwrap_err();
        assert!(matches!(err, TrainError::LabelOutOfRange { label: 60, num_classes: 60 }));

        let err = one_hot::<TestBackend>(&[-1], NUM_CLASSES, &device).unwrap_err();
        assert!(matches!(err, TrainError::LabelOutOfRange { label: -1, .. }));
    }

    #[test]
    fn test_shape_check() {
        assert!(check_prediction_shape([4, 60], 4, 60).is_ok());
        assert!(matches!(
            check_prediction_shape([4, 10], 4, 60),
            Err(TrainError::ShapeMismatch { expected: [4, 60], actual: [4, 10] })
        ));
    }

    #[test]
    fn test_accumulator_concatenates_batches() {
        let mut acc = PhaseAccumulator::new(2);
        acc.push(vec![1.0, 0.0], vec![0], 0.5, vec!["a".into()]);
        acc.push(vec![1.0, 0.0, 0.0, 1.0], vec![1, 1], 1.5, vec!["b".into(), "c".into()]);

        let out = acc.finish().unwrap();
        assert_eq!(out.phase.predictions.dim(), (3, 2));
        assert_eq!(out.phase.labels.to_vec(), vec![0, 1, 1]);
        assert_eq!(out.phase.mean_loss, 1.0);
        assert!((out.phase.accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(out.identifiers, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_accumulator() {
        let out = PhaseAccumulator::new(NUM_CLASSES).finish().unwrap();
        assert_eq!(out.phase.accuracy, 0.0);
        assert_eq!(out.phase.mean_loss, 0.0);
        assert_eq!(out.phase.predictions.dim(), (0, NUM_CLASSES));
    }
}
