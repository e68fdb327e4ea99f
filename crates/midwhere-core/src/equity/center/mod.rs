//! Transport-aware meeting point estimation.
//!
//! Centroids are computed by planar averaging of latitude and longitude. This is accurate for
//! city-scale groups but drifts for groups spanning hundreds of kilometres or the antimeridian.

mod config;

pub use config::{EstimatorConfig, ModeFactorTable};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{validate_participants, Coordinate, Participant};
use super::error::EquityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CenterMethod {
    NaiveCentroid,
    WeightedCentroid,
}

/// Candidate meeting point with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterResult {
    pub center: Coordinate,
    pub naive_center: Coordinate,
    pub method: CenterMethod,
    pub confidence: f64,
    pub equity_improvement_percent: f64,
}

/// Naive and weighted centroids with their mode-weighted travel burden (km).
///
/// Burdens use declared weights relative to the heaviest participant, so a group of
/// default-weight participants reports plain mode-factor kilometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterComparison {
    pub naive: Coordinate,
    pub weighted: Coordinate,
    pub naive_burden_km: f64,
    pub weighted_burden_km: f64,
    pub improvement_percent: f64,
}

struct Weighted<'a> {
    participant: &'a Participant,
    weight: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CenterEstimator {
    config: EstimatorConfig,
}

impl CenterEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self, EquityError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Effective pull of one participant: declared weight times the mode factor.
    pub fn effective_weight(&self, participant: &Participant) -> Result<f64, EquityError> {
        let weight = participant.weight * self.mode_factor(participant)?;
        if !weight.is_finite() {
            return Err(EquityError::invalid(format!(
                "participant {} effective weight overflows",
                participant.id
            )));
        }
        Ok(weight)
    }

    fn mode_factor(&self, participant: &Participant) -> Result<f64, EquityError> {
        match participant.mode {
            Some(mode) => self.config.mode_factors.factor(mode),
            None => Ok(self.config.unknown_mode_factor),
        }
    }

    pub fn estimate(&self, participants: &[Participant]) -> Result<CenterResult, EquityError> {
        validate_participants(participants, 1)?;

        if let [only] = participants {
            return Ok(CenterResult {
                center: only.coordinate,
                naive_center: only.coordinate,
                method: CenterMethod::NaiveCentroid,
                confidence: 1.0,
                equity_improvement_percent: 0.0,
            });
        }

        let weighted = self.weigh(participants)?;
        let comparison = self.compare_weighted(&weighted);
        if !comparison.weighted.is_valid() || !comparison.improvement_percent.is_finite() {
            return Err(EquityError::invalid(format!(
                "weighted center {} is not a valid coordinate",
                comparison.weighted
            )));
        }

        let uniform = weighted
            .windows(2)
            .all(|pair| pair[0].weight == pair[1].weight);
        let any_mode = participants.iter().any(|participant| participant.mode.is_some());
        let method = if uniform || !any_mode {
            CenterMethod::NaiveCentroid
        } else {
            CenterMethod::WeightedCentroid
        };
        let center = match method {
            CenterMethod::NaiveCentroid => comparison.naive,
            CenterMethod::WeightedCentroid => comparison.weighted,
        };

        let confidence = self.confidence(&weighted, &comparison);
        debug!(
            ?method,
            confidence,
            improvement = comparison.improvement_percent,
            "estimated meeting point"
        );

        Ok(CenterResult {
            center,
            naive_center: comparison.naive,
            method,
            confidence,
            equity_improvement_percent: match method {
                CenterMethod::NaiveCentroid => 0.0,
                CenterMethod::WeightedCentroid => comparison.improvement_percent,
            },
        })
    }

    /// Naive-vs-weighted comparison; needs at least two participants.
    pub fn compare(&self, participants: &[Participant]) -> Result<CenterComparison, EquityError> {
        validate_participants(participants, 2)?;
        let weighted = self.weigh(participants)?;
        Ok(self.compare_weighted(&weighted))
    }

    // Sorted by id so the arithmetic does not depend on input order. Declared weights are
    // divided by the largest one before the mode factor applies, so products stay finite.
    fn weigh<'a>(&self, participants: &'a [Participant]) -> Result<Vec<Weighted<'a>>, EquityError> {
        let heaviest = participants
            .iter()
            .map(|participant| participant.weight)
            .fold(f64::MIN_POSITIVE, f64::max);
        let mut weighted = participants
            .iter()
            .map(|participant| {
                Ok(Weighted {
                    participant,
                    weight: participant.weight / heaviest * self.mode_factor(participant)?,
                })
            })
            .collect::<Result<Vec<_>, EquityError>>()?;
        weighted.sort_by(|a, b| a.participant.id.cmp(&b.participant.id));
        Ok(weighted)
    }

    fn compare_weighted(&self, weighted: &[Weighted<'_>]) -> CenterComparison {
        let naive = centroid(weighted.iter().map(|entry| (entry.participant.coordinate, 1.0)));
        let center = centroid(
            weighted
                .iter()
                .map(|entry| (entry.participant.coordinate, entry.weight)),
        );

        let naive_burden_km = burden(weighted, &naive);
        let weighted_burden_km = burden(weighted, &center);
        let denominator = naive_burden_km.max(self.config.min_burden_km);
        let improvement_percent =
            ((naive_burden_km - weighted_burden_km) / denominator * 100.0).clamp(-100.0, 100.0);

        CenterComparison {
            naive,
            weighted: center,
            naive_burden_km,
            weighted_burden_km,
            improvement_percent,
        }
    }

    fn confidence(&self, weighted: &[Weighted<'_>], comparison: &CenterComparison) -> f64 {
        let spread = weighted
            .iter()
            .map(|entry| comparison.naive.haversine_km(&entry.participant.coordinate))
            .fold(0.0_f64, f64::max);
        let divergence = comparison.naive.haversine_km(&comparison.weighted);
        let divergence_ratio = if spread > f64::EPSILON {
            (divergence / spread).min(1.0)
        } else {
            0.0
        };

        let known = weighted
            .iter()
            .filter(|entry| entry.participant.mode.is_some())
            .count() as f64;
        let completeness = known / weighted.len() as f64;
        let floor = self.config.unknown_mode_floor;

        let divergence_term = 1.0 - self.config.divergence_penalty * divergence_ratio;
        let mode_term = floor + (1.0 - floor) * completeness;
        (divergence_term * mode_term).clamp(0.0, 1.0)
    }
}

fn centroid<I>(points: I) -> Coordinate
where
    I: Iterator<Item = (Coordinate, f64)>,
{
    let points: Vec<(Coordinate, f64)> = points.collect();
    let heaviest = points
        .iter()
        .map(|(_, weight)| *weight)
        .fold(f64::MIN_POSITIVE, f64::max);
    let (mut lat, mut lng, mut total) = (0.0, 0.0, 0.0);
    for (coordinate, weight) in points {
        let weight = weight / heaviest;
        lat += coordinate.lat * weight;
        lng += coordinate.lng * weight;
        total += weight;
    }
    Coordinate::new(lat / total, lng / total)
}

fn burden(weighted: &[Weighted<'_>], center: &Coordinate) -> f64 {
    weighted
        .iter()
        .map(|entry| entry.weight * center.haversine_km(&entry.participant.coordinate))
        .sum()
}
