//! Transport-equity core: meeting point estimation, Jain's fairness index, and equity
//! classification, orchestrated by [`EquityAnalysisPipeline`].
//!
//! Stages other than the travel-time lookup are synchronous and hold no shared state.

pub mod center;
pub mod classifier;
pub mod context;
pub mod domain;
pub mod error;
pub mod fairness;
pub mod import;
pub mod pipeline;
pub mod provider;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use center::{
    CenterComparison, CenterEstimator, CenterMethod, CenterResult, EstimatorConfig,
    ModeFactorTable,
};
pub use classifier::{
    ClassifierConfig, ConfidenceCurve, EquityAssessment, EquityClassifier, EquityLevel,
    LevelThresholds,
};
pub use context::{build_context, EquityContext};
pub use domain::{
    Coordinate, Participant, ParticipantId, TimeOfDay, TransportMode, TravelTimeSample,
    TravelTimeSource,
};
pub use error::EquityError;
pub use fairness::{jains_index, TravelStats};
pub use import::{ImportError, ParticipantImporter};
pub use pipeline::{
    analyze_equity, EquityAnalysis, EquityAnalysisPipeline, ExcludedParticipant, PipelineConfig,
    ProviderFailurePolicy,
};
pub use provider::{ModeProfile, ProviderError, StraightLineEstimator, TravelTimeProvider};
pub use router::equity_router;
pub use service::{AnalyzeRequest, EquityService, ParticipantInput};
