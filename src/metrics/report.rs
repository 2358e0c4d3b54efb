//! Evaluation report persistence.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use super::{Metric, Mse, RSquared};
use crate::io::write_atomic;

/// Errors raised while writing an evaluation report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error while writing the report file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat key-value record of one evaluation run.
///
/// Overwritten on every run; the keys are part of the pipeline's external
/// interface.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub r2_score: f64,
    pub mean_squared_error: f64,
}

impl EvaluationReport {
    /// Score predictions against held-out labels.
    pub fn from_predictions(predictions: &[f32], labels: &[f32]) -> Self {
        Self {
            r2_score: RSquared.evaluate(predictions, labels),
            mean_squared_error: Mse.evaluate(predictions, labels),
        }
    }

    /// Write the report as pretty-printed JSON, atomically.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        write_atomic(path, &bytes)?;
        log::info!("evaluation metrics saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_both_metrics() {
        let report = EvaluationReport::from_predictions(&[1.0, 2.0], &[1.0, 2.0]);
        assert_eq!(report.r2_score, 1.0);
        assert_eq!(report.mean_squared_error, 0.0);
    }

    #[test]
    fn written_json_has_the_interface_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let report = EvaluationReport::from_predictions(&[1.5, 2.0], &[1.0, 2.0]);
        report.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("r2_score").unwrap().is_f64());
        assert!(value.get("mean_squared_error").unwrap().is_f64());
    }
}
