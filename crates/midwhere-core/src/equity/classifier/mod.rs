mod config;
mod recommendation;

pub use config::{ClassifierConfig, ConfidenceCurve, LevelThresholds};

use super::context::EquityContext;
use super::error::EquityError;
use recommendation::recommend;
use serde::{Deserialize, Serialize};

/// Discrete equity bucket presented to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquityLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl EquityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            EquityLevel::Excellent => "Excellent",
            EquityLevel::Good => "Good",
            EquityLevel::Moderate => "Moderate",
            EquityLevel::Poor => "Poor",
            EquityLevel::VeryPoor => "Very poor",
        }
    }
}

/// Classifier output for one meeting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityAssessment {
    pub fairness_index: f64,
    pub level: EquityLevel,
    pub confidence: f64,
    pub recommendation: String,
}

impl EquityAssessment {
    pub(crate) fn scale_confidence(&mut self, factor: f64) {
        self.confidence = (self.confidence * factor).clamp(0.0, 1.0);
    }
}

/// Stateless classifier applying a threshold table and confidence curve.
#[derive(Debug, Clone, Default)]
pub struct EquityClassifier {
    config: ClassifierConfig,
}

impl EquityClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, EquityError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, fairness_index: f64) -> EquityLevel {
        let thresholds = &self.config.thresholds;
        if fairness_index >= thresholds.excellent {
            EquityLevel::Excellent
        } else if fairness_index >= thresholds.good {
            EquityLevel::Good
        } else if fairness_index >= thresholds.moderate {
            EquityLevel::Moderate
        } else if fairness_index >= thresholds.poor {
            EquityLevel::Poor
        } else {
            EquityLevel::VeryPoor
        }
    }

    pub fn confidence(&self, sample_size: usize, std_dev: f64, mean_travel_time: f64) -> f64 {
        self.config
            .confidence
            .confidence(sample_size, std_dev, mean_travel_time)
    }

    /// Classifies the index and scores confidence from the context.
    ///
    /// For population statistics Jain's index equals `1 / (1 + cv²)`, so the coefficient of
    /// variation is recovered from the index itself.
    pub fn assess(
        &self,
        fairness_index: f64,
        context: &EquityContext,
    ) -> Result<EquityAssessment, EquityError> {
        if !fairness_index.is_finite() || fairness_index <= 0.0 || fairness_index > 1.0 {
            return Err(EquityError::invalid(format!(
                "fairness index must be within (0, 1], got {fairness_index}"
            )));
        }

        let level = self.classify(fairness_index);
        let cv = (1.0 / fairness_index - 1.0).max(0.0).sqrt();
        let std_dev = cv * context.mean_travel_time;
        let confidence = self.confidence(context.sample_size, std_dev, context.mean_travel_time);

        Ok(EquityAssessment {
            fairness_index,
            level,
            confidence,
            recommendation: recommend(level, context, &self.config),
        })
    }
}
