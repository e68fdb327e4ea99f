use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ProviderError, TravelTimeProvider};
use crate::equity::domain::{Coordinate, ParticipantId, TransportMode, TravelTimeSample};

/// Average door-to-door characteristics of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    pub speed_kmh: f64,
    /// Ratio of network distance to great-circle distance.
    pub detour_factor: f64,
    /// Fixed minutes added per trip (parking, waiting, transfers).
    pub overhead_minutes: f64,
}

impl ModeProfile {
    pub const fn new(speed_kmh: f64, detour_factor: f64, overhead_minutes: f64) -> Self {
        Self {
            speed_kmh,
            detour_factor,
            overhead_minutes,
        }
    }

    pub fn minutes_for(&self, straight_line_km: f64) -> f64 {
        if straight_line_km <= 0.0 {
            return 0.0;
        }
        let network_km = straight_line_km * self.detour_factor;
        network_km / self.speed_kmh * 60.0 + self.overhead_minutes
    }
}

/// Travel-time provider based on great-circle distance and per-mode speeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightLineEstimator {
    profiles: BTreeMap<TransportMode, ModeProfile>,
}

impl Default for StraightLineEstimator {
    fn default() -> Self {
        Self::new([
            (TransportMode::Walking, ModeProfile::new(4.8, 1.3, 0.0)),
            (TransportMode::Cycling, ModeProfile::new(15.0, 1.3, 2.0)),
            (TransportMode::Driving, ModeProfile::new(32.0, 1.4, 6.0)),
            (TransportMode::Transit, ModeProfile::new(22.0, 1.5, 10.0)),
        ])
    }
}

impl StraightLineEstimator {
    pub fn new<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = (TransportMode, ModeProfile)>,
    {
        Self {
            profiles: profiles.into_iter().collect(),
        }
    }

    pub fn estimate_minutes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<f64, ProviderError> {
        let profile = self.profiles.get(&mode).ok_or_else(|| {
            ProviderError::Unavailable(format!("no speed profile for {mode}"))
        })?;
        if !profile.speed_kmh.is_finite() || profile.speed_kmh <= 0.0 {
            return Err(ProviderError::Unavailable(format!(
                "invalid speed profile for {mode}"
            )));
        }
        Ok(profile.minutes_for(origin.haversine_km(&destination)))
    }
}

#[async_trait]
impl TravelTimeProvider for StraightLineEstimator {
    async fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<TravelTimeSample, ProviderError> {
        let minutes = self.estimate_minutes(origin, destination, mode)?;
        Ok(TravelTimeSample::estimated(ParticipantId::new(""), minutes))
    }
}
