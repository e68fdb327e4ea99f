//! Travel-time capability consumed by the analysis pipeline.
//!
//! The pipeline never routes on its own; it asks a [`TravelTimeProvider`] for the time from the
//! candidate center to each participant. [`StraightLineEstimator`] is a network-free
//! implementation for deployments without a routing service.

mod estimate;

use async_trait::async_trait;

use super::domain::{Coordinate, TransportMode, TravelTimeSample};

pub use estimate::{ModeProfile, StraightLineEstimator};

/// Injected source of per-participant travel times.
#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    /// Travel time from `origin` to `destination` for the given mode.
    ///
    /// The returned sample's `participant_id` is overwritten by the pipeline, so adapters may
    /// leave it empty.
    async fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<TravelTimeSample, ProviderError>;
}

/// Failure reported by a travel-time provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider timed out")]
    Timeout,
}
