use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::center::{CenterEstimator, CenterResult, EstimatorConfig};
use super::classifier::{ClassifierConfig, EquityAssessment, EquityClassifier};
use super::context::EquityContext;
use super::domain::{
    Coordinate, Participant, ParticipantId, TimeOfDay, TransportMode, TravelTimeSample,
};
use super::error::EquityError;
use super::fairness::{jains_index, TravelStats};
use super::provider::{ProviderError, TravelTimeProvider};

/// What to do when a travel-time lookup fails for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFailurePolicy {
    /// The first failure (in participant order) fails the whole request.
    Strict,
    /// Failing participants are excluded, with a warning and reduced confidence.
    #[default]
    Degraded,
}

impl FromStr for ProviderFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "degraded" => Ok(Self::Degraded),
            other => Err(format!("unknown provider failure policy '{other}'")),
        }
    }
}

impl fmt::Display for ProviderFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Degraded => f.write_str("degraded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub estimator: EstimatorConfig,
    pub classifier: ClassifierConfig,
    pub provider_timeout_ms: u64,
    pub failure_policy: ProviderFailurePolicy,
    /// Mode used to look up participants that did not declare one.
    pub fallback_mode: TransportMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            classifier: ClassifierConfig::default(),
            provider_timeout_ms: 5_000,
            failure_policy: ProviderFailurePolicy::default(),
            fallback_mode: TransportMode::Transit,
        }
    }
}

/// Participant left out of the fairness computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedParticipant {
    pub participant_id: ParticipantId,
    pub reason: String,
}

/// Meeting point and equity assessment produced together.
///
/// The assessment only describes the center it was computed for, so the two are exposed
/// through one value and cannot be constructed separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityAnalysis {
    center: CenterResult,
    assessment: EquityAssessment,
    context: EquityContext,
    samples: Vec<TravelTimeSample>,
    excluded: Vec<ExcludedParticipant>,
    warnings: Vec<String>,
}

impl EquityAnalysis {
    pub fn center(&self) -> &CenterResult {
        &self.center
    }

    pub fn assessment(&self) -> &EquityAssessment {
        &self.assessment
    }

    pub fn context(&self) -> &EquityContext {
        &self.context
    }

    pub fn samples(&self) -> &[TravelTimeSample] {
        &self.samples
    }

    pub fn excluded(&self) -> &[ExcludedParticipant] {
        &self.excluded
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_degraded(&self) -> bool {
        !self.excluded.is_empty()
    }

    pub fn into_parts(self) -> (CenterResult, EquityAssessment) {
        (self.center, self.assessment)
    }
}

/// Orchestrates center estimation, travel-time collection, fairness and classification.
pub struct EquityAnalysisPipeline {
    estimator: CenterEstimator,
    classifier: EquityClassifier,
    provider_timeout: Duration,
    failure_policy: ProviderFailurePolicy,
    fallback_mode: TransportMode,
}

impl Default for EquityAnalysisPipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            estimator: CenterEstimator::default(),
            classifier: EquityClassifier::default(),
            provider_timeout: Duration::from_millis(config.provider_timeout_ms),
            failure_policy: config.failure_policy,
            fallback_mode: config.fallback_mode,
        }
    }
}

impl EquityAnalysisPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, EquityError> {
        if config.provider_timeout_ms == 0 {
            return Err(EquityError::invalid("provider timeout must be positive"));
        }
        Ok(Self {
            estimator: CenterEstimator::new(config.estimator)?,
            classifier: EquityClassifier::new(config.classifier)?,
            provider_timeout: Duration::from_millis(config.provider_timeout_ms),
            failure_policy: config.failure_policy,
            fallback_mode: config.fallback_mode,
        })
    }

    pub fn failure_policy(&self) -> ProviderFailurePolicy {
        self.failure_policy
    }

    pub async fn run(
        &self,
        participants: &[Participant],
        provider: Option<&dyn TravelTimeProvider>,
    ) -> Result<EquityAnalysis, EquityError> {
        self.run_at(participants, TimeOfDay::Unknown, provider).await
    }

    /// Runs the analysis unless `cancel` resolves first, in which case nothing is returned.
    pub async fn run_cancellable<C>(
        &self,
        participants: &[Participant],
        time_of_day: TimeOfDay,
        provider: Option<&dyn TravelTimeProvider>,
        cancel: C,
    ) -> Result<EquityAnalysis, EquityError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                warn!("equity analysis cancelled before completion");
                Err(EquityError::Cancelled)
            }
            result = self.run_at(participants, time_of_day, provider) => result,
        }
    }

    pub async fn run_at(
        &self,
        participants: &[Participant],
        time_of_day: TimeOfDay,
        provider: Option<&dyn TravelTimeProvider>,
    ) -> Result<EquityAnalysis, EquityError> {
        let center = self.estimator.estimate(participants)?;
        let mut warnings = Vec::new();

        for participant in participants.iter().filter(|p| p.mode.is_none()) {
            warnings.push(format!(
                "participant {} declared no transport mode; neutral weight applied",
                participant.id
            ));
        }

        let missing: Vec<&Participant> = participants
            .iter()
            .filter(|participant| participant.known_travel_time_minutes.is_none())
            .collect();

        let lookups = if missing.is_empty() {
            Vec::new()
        } else {
            let provider = provider.ok_or_else(|| EquityError::MissingTravelData {
                participants: missing.iter().map(|p| p.id.clone()).collect(),
            })?;
            for participant in missing.iter().filter(|p| p.mode.is_none()) {
                warnings.push(format!(
                    "participant {} looked up as {}",
                    participant.id, self.fallback_mode
                ));
            }
            self.lookup(provider, center.center, &missing).await
        };

        let (samples, excluded, first_error) = self.merge(participants, lookups)?;
        for entry in &excluded {
            warnings.push(format!(
                "participant {} excluded: {}",
                entry.participant_id, entry.reason
            ));
        }
        if samples.is_empty() {
            return Err(first_error.unwrap_or_else(|| EquityError::MissingTravelData {
                participants: participants.iter().map(|p| p.id.clone()).collect(),
            }));
        }

        let minutes: Vec<f64> = samples.iter().map(|sample| sample.minutes).collect();
        let fairness_index = jains_index(&minutes)?;
        let stats = TravelStats::from_minutes(&minutes)?;
        let modes = participants
            .iter()
            .filter(|participant| {
                samples
                    .iter()
                    .any(|sample| sample.participant_id == participant.id)
            })
            .filter_map(|participant| participant.mode);
        let context = EquityContext::from_stats(&stats, modes, time_of_day)?;

        let mut assessment = self.classifier.assess(fairness_index, &context)?;
        if !excluded.is_empty() {
            let coverage = samples.len() as f64 / participants.len() as f64;
            assessment.scale_confidence(coverage);
        }

        info!(
            participants = participants.len(),
            fairness_index,
            level = ?assessment.level,
            confidence = assessment.confidence,
            degraded = !excluded.is_empty(),
            "equity analysis complete"
        );

        Ok(EquityAnalysis {
            center,
            assessment,
            context,
            samples,
            excluded,
            warnings,
        })
    }

    async fn lookup(
        &self,
        provider: &dyn TravelTimeProvider,
        origin: Coordinate,
        missing: &[&Participant],
    ) -> Vec<Result<TravelTimeSample, EquityError>> {
        debug!(lookups = missing.len(), "requesting travel times");
        let timeout = self.provider_timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let calls = missing.iter().map(|participant| {
            let mode = participant.mode.unwrap_or(self.fallback_mode);
            async move {
                let id = participant.id.clone();
                let call = provider.travel_time(origin, participant.coordinate, mode);
                match tokio::time::timeout(timeout, call).await {
                    Ok(Ok(sample)) if sample.minutes.is_finite() && sample.minutes >= 0.0 => {
                        Ok(TravelTimeSample {
                            participant_id: id,
                            ..sample
                        })
                    }
                    Ok(Ok(sample)) => Err(EquityError::ProviderUnavailable {
                        participant: id,
                        reason: format!("invalid travel time {}", sample.minutes),
                    }),
                    Ok(Err(ProviderError::Unavailable(reason))) => {
                        Err(EquityError::ProviderUnavailable {
                            participant: id,
                            reason,
                        })
                    }
                    Ok(Err(ProviderError::Timeout)) | Err(_) => Err(EquityError::ProviderTimeout {
                        participant: id,
                        timeout_ms,
                    }),
                }
            }
        });

        join_all(calls).await
    }

    // Lookups arrive in the same order as the participants lacking a known time.
    #[allow(clippy::type_complexity)]
    fn merge(
        &self,
        participants: &[Participant],
        lookups: Vec<Result<TravelTimeSample, EquityError>>,
    ) -> Result<
        (
            Vec<TravelTimeSample>,
            Vec<ExcludedParticipant>,
            Option<EquityError>,
        ),
        EquityError,
    > {
        let mut lookups = lookups.into_iter();
        let mut samples = Vec::with_capacity(participants.len());
        let mut excluded = Vec::new();
        let mut first_error = None;

        for participant in participants {
            let result = match participant.known_travel_time_minutes {
                Some(minutes) => Ok(TravelTimeSample::provided(participant.id.clone(), minutes)),
                None => lookups.next().unwrap_or_else(|| {
                    Err(EquityError::MissingTravelData {
                        participants: vec![participant.id.clone()],
                    })
                }),
            };

            match result {
                Ok(sample) => samples.push(sample),
                Err(err) if self.failure_policy == ProviderFailurePolicy::Strict => {
                    return Err(err)
                }
                Err(err) => {
                    warn!(participant = %participant.id, error = %err, "excluding participant");
                    excluded.push(ExcludedParticipant {
                        participant_id: participant.id.clone(),
                        reason: err.to_string(),
                    });
                    first_error.get_or_insert(err);
                }
            }
        }

        Ok((samples, excluded, first_error))
    }
}

/// Runs the default pipeline: the single public entry point for collaborators.
pub async fn analyze_equity(
    participants: &[Participant],
    provider: Option<&dyn TravelTimeProvider>,
) -> Result<EquityAnalysis, EquityError> {
    EquityAnalysisPipeline::default()
        .run(participants, provider)
        .await
}
