use serde::{Deserialize, Serialize};

use super::super::error::EquityError;

/// Lower bounds (inclusive) of each equity bucket on the fairness index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub excellent: f64,
    pub good: f64,
    pub moderate: f64,
    pub poor: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.9,
            good: 0.8,
            moderate: 0.6,
            poor: 0.4,
        }
    }
}

impl LevelThresholds {
    pub fn validate(&self) -> Result<(), EquityError> {
        let ordered = [1.0, self.excellent, self.good, self.moderate, self.poor, 0.0];
        let descending = ordered.windows(2).all(|pair| pair[0] >= pair[1]);
        let distinct = self.excellent > self.good && self.good > self.moderate && self.moderate > self.poor;
        if !descending || !distinct || ordered.iter().any(|value| !value.is_finite()) {
            return Err(EquityError::invalid(format!(
                "level thresholds must strictly descend within [0, 1], got {self:?}"
            )));
        }
        Ok(())
    }
}

/// Shape of the confidence curve.
///
/// `base(n) = n / (n + half_saturation)`, so a group of `half_saturation` participants sits at
/// 0.5 and larger groups approach 1. A single participant is additionally capped at
/// `single_sample_ceiling`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCurve {
    pub half_saturation: f64,
    pub single_sample_ceiling: f64,
}

impl Default for ConfidenceCurve {
    fn default() -> Self {
        Self {
            half_saturation: 2.0,
            single_sample_ceiling: 0.3,
        }
    }
}

impl ConfidenceCurve {
    pub fn validate(&self) -> Result<(), EquityError> {
        if !self.half_saturation.is_finite() || self.half_saturation <= 0.0 {
            return Err(EquityError::invalid(format!(
                "confidence half saturation must be positive, got {}",
                self.half_saturation
            )));
        }
        if !(0.0..=1.0).contains(&self.single_sample_ceiling) {
            return Err(EquityError::invalid(format!(
                "single sample confidence ceiling must be within [0, 1], got {}",
                self.single_sample_ceiling
            )));
        }
        Ok(())
    }

    pub fn base(&self, sample_size: usize) -> f64 {
        if sample_size == 0 {
            return 0.0;
        }
        let n = sample_size as f64;
        let base = n / (n + self.half_saturation);
        if sample_size == 1 {
            base.min(self.single_sample_ceiling)
        } else {
            base
        }
    }

    /// Non-decreasing in `sample_size`, non-increasing in `std_dev / mean`.
    pub fn confidence(&self, sample_size: usize, std_dev: f64, mean_travel_time: f64) -> f64 {
        let cv = if mean_travel_time > 0.0 && std_dev.is_finite() {
            (std_dev.max(0.0) / mean_travel_time).min(1.0)
        } else {
            0.0
        };
        (self.base(sample_size) * (1.0 - cv)).clamp(0.0, 1.0)
    }
}

/// Full classifier policy: bucket edges, confidence curve, and recommendation triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub thresholds: LevelThresholds,
    pub confidence: ConfidenceCurve,
    /// Travel time spread (minutes) that is called out in mitigation advice.
    pub range_alert_minutes: f64,
    /// Number of distinct modes that is called out in mitigation advice.
    pub mode_diversity_alert: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            thresholds: LevelThresholds::default(),
            confidence: ConfidenceCurve::default(),
            range_alert_minutes: 20.0,
            mode_diversity_alert: 3,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), EquityError> {
        self.thresholds.validate()?;
        self.confidence.validate()?;
        if !self.range_alert_minutes.is_finite() || self.range_alert_minutes < 0.0 {
            return Err(EquityError::invalid(format!(
                "range alert must be non-negative, got {}",
                self.range_alert_minutes
            )));
        }
        Ok(())
    }
}
