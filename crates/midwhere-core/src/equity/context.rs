use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{TimeOfDay, TransportMode};
use super::error::EquityError;
use super::fairness::TravelStats;

/// Descriptive signals the classifier reads alongside the fairness index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityContext {
    pub sample_size: usize,
    pub transport_modes: BTreeSet<TransportMode>,
    pub mean_travel_time: f64,
    pub travel_time_range: f64,
    pub time_of_day: TimeOfDay,
}

impl EquityContext {
    /// Validates and assembles a context; duplicate modes collapse and an empty set means unknown.
    pub fn build<I>(
        sample_size: usize,
        modes: I,
        mean_travel_time: f64,
        travel_time_range: f64,
        time_of_day: TimeOfDay,
    ) -> Result<Self, EquityError>
    where
        I: IntoIterator<Item = TransportMode>,
    {
        if sample_size < 1 {
            return Err(EquityError::invalid("context sample size must be at least 1"));
        }
        if !mean_travel_time.is_finite() || mean_travel_time < 0.0 {
            return Err(EquityError::invalid(format!(
                "mean travel time must be non-negative, got {mean_travel_time}"
            )));
        }
        if !travel_time_range.is_finite() || travel_time_range < 0.0 {
            return Err(EquityError::invalid(format!(
                "travel time range must be non-negative, got {travel_time_range}"
            )));
        }

        Ok(Self {
            sample_size,
            transport_modes: modes.into_iter().collect(),
            mean_travel_time,
            travel_time_range,
            time_of_day,
        })
    }

    pub fn from_stats<I>(
        stats: &TravelStats,
        modes: I,
        time_of_day: TimeOfDay,
    ) -> Result<Self, EquityError>
    where
        I: IntoIterator<Item = TransportMode>,
    {
        Self::build(stats.count, modes, stats.mean, stats.range(), time_of_day)
    }

    pub fn mode_diversity(&self) -> usize {
        self.transport_modes.len()
    }

    pub fn modes_label(&self) -> String {
        if self.transport_modes.is_empty() {
            return "unknown modes".to_string();
        }
        self.transport_modes
            .iter()
            .map(TransportMode::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Free-function form of [`EquityContext::build`] with an unknown time of day.
pub fn build_context<I>(
    sample_size: usize,
    modes: I,
    mean_travel_time: f64,
    travel_time_range: f64,
) -> Result<EquityContext, EquityError>
where
    I: IntoIterator<Item = TransportMode>,
{
    EquityContext::build(
        sample_size,
        modes,
        mean_travel_time,
        travel_time_range,
        TimeOfDay::Unknown,
    )
}
