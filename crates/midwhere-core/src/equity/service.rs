use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::domain::{Coordinate, Participant, ParticipantId, TimeOfDay, TransportMode};
use super::error::EquityError;
use super::pipeline::{EquityAnalysis, EquityAnalysisPipeline};
use super::provider::TravelTimeProvider;

/// Participant as submitted over the wire; modes arrive as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub travel_time_minutes: Option<f64>,
}

impl TryFrom<ParticipantInput> for Participant {
    type Error = EquityError;

    fn try_from(input: ParticipantInput) -> Result<Self, Self::Error> {
        let mode = input
            .mode
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse::<TransportMode>)
            .transpose()?;

        Ok(Participant {
            id: ParticipantId(input.id),
            coordinate: Coordinate::new(input.lat, input.lng),
            mode,
            weight: input.weight.unwrap_or(1.0),
            known_travel_time_minutes: input.travel_time_minutes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub participants: Vec<ParticipantInput>,
    /// Departure time as `HH:MM` or `HH:MM:SS`.
    #[serde(default)]
    pub departure_time: Option<String>,
}

impl AnalyzeRequest {
    pub fn time_of_day(&self) -> Result<TimeOfDay, EquityError> {
        match self.departure_time.as_deref().map(str::trim) {
            None | Some("") => Ok(TimeOfDay::Unknown),
            Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
                .map(TimeOfDay::from_time)
                .map_err(|err| {
                    EquityError::invalid(format!("invalid departure time '{raw}': {err}"))
                }),
        }
    }

    pub fn into_participants(self) -> Result<Vec<Participant>, EquityError> {
        self.participants
            .into_iter()
            .map(Participant::try_from)
            .collect()
    }
}

/// Service composing the analysis pipeline with an optional travel-time provider.
pub struct EquityService<P> {
    pipeline: Arc<EquityAnalysisPipeline>,
    provider: Option<Arc<P>>,
}

impl<P> EquityService<P>
where
    P: TravelTimeProvider + 'static,
{
    pub fn new(pipeline: EquityAnalysisPipeline, provider: Option<Arc<P>>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            provider,
        }
    }

    pub fn pipeline(&self) -> &EquityAnalysisPipeline {
        &self.pipeline
    }

    /// Validate the request, then run the pipeline against the configured provider.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<EquityAnalysis, EquityError> {
        let time_of_day = request.time_of_day()?;
        let participants = request.into_participants()?;
        let provider = self
            .provider
            .as_deref()
            .map(|provider| provider as &dyn TravelTimeProvider);

        self.pipeline
            .run_at(&participants, time_of_day, provider)
            .await
    }
}
