//! Regression metrics.

use super::Metric;

// =============================================================================
// MSE (Mean Squared Error)
// =============================================================================

/// Mean Squared Error: mean((pred - label)²)
///
/// Lower is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl Metric for Mse {
    fn evaluate(&self, predictions: &[f32], labels: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), labels.len());

        if predictions.is_empty() {
            return 0.0;
        }

        predictions
            .iter()
            .zip(labels.iter())
            .map(|(p, l)| {
                let diff = (*p as f64) - (*l as f64);
                diff * diff
            })
            .sum::<f64>()
            / predictions.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "mean_squared_error"
    }
}

// =============================================================================
// R² (Coefficient of Determination)
// =============================================================================

/// R² score: 1 - SS_res / SS_tot.
///
/// Higher is better; 1.0 is a perfect fit and 0.0 matches a predictor
/// that always answers the label mean. When the labels are constant
/// (SS_tot = 0) the score is 1.0 for exact predictions and 0.0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RSquared;

impl Metric for RSquared {
    fn evaluate(&self, predictions: &[f32], labels: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), labels.len());

        if predictions.is_empty() {
            return 0.0;
        }

        let mean = labels.iter().map(|&l| l as f64).sum::<f64>() / labels.len() as f64;

        let ss_res: f64 = predictions
            .iter()
            .zip(labels.iter())
            .map(|(p, l)| {
                let diff = (*p as f64) - (*l as f64);
                diff * diff
            })
            .sum();

        let ss_tot: f64 = labels
            .iter()
            .map(|&l| {
                let diff = (l as f64) - mean;
                diff * diff
            })
            .sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - ss_res / ss_tot
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "r2_score"
    }
}

// =============================================================================
// Tests
// =============================================================================
