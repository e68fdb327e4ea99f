use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::equity::domain::{
    Coordinate, Participant, ParticipantId, TransportMode, TravelTimeSample,
};
use crate::equity::pipeline::{EquityAnalysisPipeline, PipelineConfig, ProviderFailurePolicy};
use crate::equity::provider::{ProviderError, TravelTimeProvider};

pub(super) fn coordinates() -> [Coordinate; 4] {
    [
        Coordinate::new(1.3000, 103.8000),
        Coordinate::new(1.3500, 103.8800),
        Coordinate::new(1.3200, 103.9400),
        Coordinate::new(1.2800, 103.8500),
    ]
}

pub(super) fn participants() -> Vec<Participant> {
    let [a, b, c, d] = coordinates();
    vec![
        Participant::new("ana", a, TransportMode::Walking),
        Participant::new("ben", b, TransportMode::Driving),
        Participant::new("cai", c, TransportMode::Driving),
        Participant::new("dee", d, TransportMode::Transit),
    ]
}

pub(super) fn participants_with_times(minutes: [f64; 4]) -> Vec<Participant> {
    participants()
        .into_iter()
        .zip(minutes)
        .map(|(participant, minutes)| participant.with_known_travel_time(minutes))
        .collect()
}

pub(super) fn pipeline(policy: ProviderFailurePolicy, timeout_ms: u64) -> EquityAnalysisPipeline {
    EquityAnalysisPipeline::new(PipelineConfig {
        provider_timeout_ms: timeout_ms,
        failure_policy: policy,
        ..PipelineConfig::default()
    })
    .expect("valid pipeline config")
}

/// Provider answering from a per-destination script.
pub(super) struct ScriptedProvider {
    script: Vec<(Coordinate, Result<f64, ProviderError>)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    modes: Mutex<Vec<TransportMode>>,
}

impl ScriptedProvider {
    pub(super) fn new(script: Vec<(Coordinate, Result<f64, ProviderError>)>) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            modes: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn uniform(minutes: f64) -> Self {
        Self::new(coordinates().into_iter().map(|c| (c, Ok(minutes))).collect())
    }

    pub(super) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn modes(&self) -> Vec<TransportMode> {
        self.modes.lock().expect("mode log poisoned").clone()
    }
}

#[async_trait]
impl TravelTimeProvider for ScriptedProvider {
    async fn travel_time(
        &self,
        _origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<TravelTimeSample, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().expect("mode log poisoned").push(mode);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let (_, outcome) = self
            .script
            .iter()
            .find(|(coordinate, _)| *coordinate == destination)
            .ok_or_else(|| ProviderError::Unavailable("destination not scripted".to_string()))?;

        outcome
            .clone()
            .map(|minutes| TravelTimeSample::estimated(ParticipantId::new(""), minutes))
    }
}

/// Provider whose lookups never complete.
pub(super) struct PendingProvider;

#[async_trait]
impl TravelTimeProvider for PendingProvider {
    async fn travel_time(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _mode: TransportMode,
    ) -> Result<TravelTimeSample, ProviderError> {
        futures::future::pending().await
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
