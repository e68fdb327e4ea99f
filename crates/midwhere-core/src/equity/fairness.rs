use serde::{Deserialize, Serialize};

use super::error::EquityError;

/// Jain's fairness index `(Σx)² / (n·Σx²)` over non-negative costs.
///
/// Uniform inputs (including a single value or all zeros) return exactly `1.0`. The result is
/// clamped into `(0, 1]` to absorb floating-point drift.
pub fn jains_index(costs: &[f64]) -> Result<f64, EquityError> {
    if costs.is_empty() {
        return Err(EquityError::invalid("fairness index needs at least one cost"));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &cost in costs {
        if !cost.is_finite() || cost < 0.0 {
            return Err(EquityError::invalid(format!(
                "costs must be finite and non-negative, got {cost}"
            )));
        }
        min = min.min(cost);
        max = max.max(cost);
    }

    // Covers n == 1 and the all-zero 0/0 case.
    if min == max {
        return Ok(1.0);
    }

    // Normalized by the maximum so extreme magnitudes neither overflow nor underflow.
    let (sum, sum_sq) = costs.iter().fold((0.0_f64, 0.0_f64), |(sum, sum_sq), &cost| {
        let scaled = cost / max;
        (sum + scaled, sum_sq + scaled * scaled)
    });

    let n = costs.len() as f64;
    let index = (sum * sum) / (n * sum_sq);
    Ok(index.clamp(f64::MIN_POSITIVE, 1.0))
}

/// Descriptive statistics over a set of travel times in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl TravelStats {
    pub fn from_minutes(minutes: &[f64]) -> Result<Self, EquityError> {
        if minutes.is_empty() {
            return Err(EquityError::invalid("travel statistics need at least one sample"));
        }
        if let Some(bad) = minutes.iter().find(|m| !m.is_finite() || **m < 0.0) {
            return Err(EquityError::invalid(format!(
                "travel times must be finite and non-negative, got {bad}"
            )));
        }

        let count = minutes.len();
        let mean = minutes.iter().sum::<f64>() / count as f64;
        let variance = minutes
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        let min = minutes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = minutes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Coefficient of variation, defined as 0 when the mean is 0.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean > 0.0 {
            self.std_dev / self.mean
        } else {
            0.0
        }
    }
}
