use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::TransportMode;
use super::super::error::EquityError;

/// Relative pull each transport mode exerts on the weighted center.
///
/// Modes with more friction per kilometre (walking, transit) carry larger factors so the
/// center moves toward those participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeFactorTable {
    factors: BTreeMap<TransportMode, f64>,
}

impl Default for ModeFactorTable {
    fn default() -> Self {
        Self::from_pairs([
            (TransportMode::Walking, 1.6),
            (TransportMode::Transit, 1.4),
            (TransportMode::Cycling, 1.2),
            (TransportMode::Driving, 0.8),
        ])
    }
}

impl ModeFactorTable {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (TransportMode, f64)>,
    {
        Self {
            factors: pairs.into_iter().collect(),
        }
    }

    pub fn factor(&self, mode: TransportMode) -> Result<f64, EquityError> {
        self.factors
            .get(&mode)
            .copied()
            .ok_or_else(|| EquityError::UnknownMode(mode.label().to_string()))
    }

    /// Every supported mode must map to a finite, strictly positive factor.
    pub fn validate(&self) -> Result<(), EquityError> {
        for mode in TransportMode::ALL {
            let factor = self.factor(mode)?;
            if !factor.is_finite() || factor <= 0.0 {
                return Err(EquityError::invalid(format!(
                    "mode factor for {mode} must be positive, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub mode_factors: ModeFactorTable,
    /// Factor applied to participants without a declared mode.
    pub unknown_mode_factor: f64,
    /// Confidence lost when the weighted center diverges by the full input spread.
    pub divergence_penalty: f64,
    /// Confidence retained when no participant declares a mode.
    pub unknown_mode_floor: f64,
    /// Smallest burden (km) used as the improvement denominator.
    pub min_burden_km: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            mode_factors: ModeFactorTable::default(),
            unknown_mode_factor: 1.0,
            divergence_penalty: 0.5,
            unknown_mode_floor: 0.5,
            min_burden_km: 0.01,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), EquityError> {
        self.mode_factors.validate()?;
        if !self.unknown_mode_factor.is_finite() || self.unknown_mode_factor <= 0.0 {
            return Err(EquityError::invalid(format!(
                "unknown mode factor must be positive, got {}",
                self.unknown_mode_factor
            )));
        }
        for (name, value) in [
            ("divergence penalty", self.divergence_penalty),
            ("unknown mode floor", self.unknown_mode_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EquityError::invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if !self.min_burden_km.is_finite() || self.min_burden_km <= 0.0 {
            return Err(EquityError::invalid(format!(
                "minimum burden must be positive, got {}",
                self.min_burden_km
            )));
        }
        Ok(())
    }
}
