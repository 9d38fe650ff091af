// ============================================================
// Layer 6 — Metric History
// ============================================================
// Append-only record of the per-epoch metrics of a training run.
//
// Four parallel sequences, one entry per epoch:
//   train_acc   train_loss   val_acc   val_loss
//
// At the end of a run each sequence is written as a flat f64
// .npy array so it can be loaded with numpy.load():
//
//   checkpoints/
//     train_acc.npy
//     train_loss.npy
//     val_acc.npy
//     val_loss.npy
//
// An epoch is recorded only after both its phases completed, so the
// four arrays always have the same length.
//
// Reference: ndarray-npy crate documentation

use ndarray::Array1;
use ndarray_npy::{read_npy, write_npy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::error::{TrainError, TrainResult};

pub const TRAIN_ACC_FILE:  &str = "train_acc.npy";
pub const TRAIN_LOSS_FILE: &str = "train_loss.npy";
pub const VAL_ACC_FILE:    &str = "val_acc.npy";
pub const VAL_LOSS_FILE:   &str = "val_loss.npy";

/// Accuracy and mean loss of one phase of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    /// Fraction of correctly classified samples, in [0.0, 1.0]
    pub accuracy: f64,

    /// Mean of the per-batch MSE losses, >= 0.0
    pub loss: f64,
}

impl PhaseMetrics {
    pub fn new(accuracy: f64, loss: f64) -> Self {
        Self { accuracy, loss }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricHistory {
    pub train_accuracy: Vec<f64>,
    pub train_loss:     Vec<f64>,
    pub val_accuracy:   Vec<f64>,
    pub val_loss:       Vec<f64>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed epoch.
    pub fn record(&mut self, train: PhaseMetrics, val: PhaseMetrics) {
        self.train_accuracy.push(train.accuracy);
        self.train_loss.push(train.loss);
        self.val_accuracy.push(val.accuracy);
        self.val_loss.push(val.loss);
    }

    /// Number of recorded epochs
    pub fn epochs(&self) -> usize {
        self.train_accuracy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs() == 0
    }

    /// Write the four arrays into `dir`, replacing existing files.
    pub fn persist(&self, dir: &Path) -> TrainResult<()> {
        for (file, values) in self.series() {
            let path  = dir.join(file);
            let array = Array1::from_vec(values.to_vec());
            write_npy(&path, &array).map_err(|e| TrainError::MetricArray {
                path:    path.clone(),
                message: e.to_string(),
            })?;
        }

        tracing::debug!("Wrote {} epochs of metrics to '{}'", self.epochs(), dir.display());
        Ok(())
    }

    /// Read back the arrays written by [`MetricHistory::persist`].
    pub fn load(dir: &Path) -> TrainResult<Self> {
        let read = |file: &str| -> TrainResult<Vec<f64>> {
            let path: PathBuf = dir.join(file);
            let array: Array1<f64> = read_npy(&path).map_err(|e| TrainError::MetricArray {
                path:    path.clone(),
                message: e.to_string(),
            })?;
            Ok(array.to_vec())
        };

        Ok(Self {
            train_accuracy: read(TRAIN_ACC_FILE)?,
            train_loss:     read(TRAIN_LOSS_FILE)?,
            val_accuracy:   read(VAL_ACC_FILE)?,
            val_loss:       read(VAL_LOSS_FILE)?,
        })
    }

    fn series(&self) -> [(&'static str, &[f64]); 4] {
        [
            (TRAIN_ACC_FILE,  self.train_accuracy.as_slice()),
            (TRAIN_LOSS_FILE, self.train_loss.as_slice()),
            (VAL_ACC_FILE,    self.val_accuracy.as_slice()),
            (VAL_LOSS_FILE,   self.val_loss.as_slice()),
        ]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_record_appends_all_series() {
        let mut history = MetricHistory::new();
        history.record(PhaseMetrics::new(0.2, 0.9), PhaseMetrics::new(0.1, 1.0));
        history.record(PhaseMetrics::new(0.4, 0.7), PhaseMetrics::new(0.3, 0.8));

        assert_eq!(history.epochs(), 2);
        assert_eq!(history.val_accuracy, vec![0.1, 0.3]);
        assert_eq!(history.train_loss, vec![0.9, 0.7]);
    }

    #[test]
    fn test_persist_and_load() {
        let dir = tempdir().unwrap();
        let mut history = MetricHistory::new();
        history.record(PhaseMetrics::new(0.5, 0.25), PhaseMetrics::new(0.75, 0.125));

        history.persist(dir.path()).unwrap();
        let loaded = MetricHistory::load(dir.path()).unwrap();

        assert_eq!(loaded, history);
    }

    #[test]
    fn test_empty_history_writes_empty_arrays() {
        let dir = tempdir().unwrap();
        MetricHistory::new().persist(dir.path()).unwrap();

        for file in [TRAIN_ACC_FILE, TRAIN_LOSS_FILE, VAL_ACC_FILE, VAL_LOSS_FILE] {
            assert!(dir.path().join(file).exists());
        }
        assert!(MetricHistory::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_persist_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let err = MetricHistory::new().persist(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, TrainError::MetricArray { .. }));
    }
}
