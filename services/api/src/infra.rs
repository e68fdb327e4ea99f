use chrono::NaiveTime;
use metrics_exporter_prometheus::PrometheusHandle;
use midwhere_core::config::EquitySettings;
use midwhere_core::equity::{EquityAnalysisPipeline, EquityService, StraightLineEstimator};
use midwhere_core::error::AppError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Analysis service backed by the offline straight-line estimator.
pub(crate) fn equity_service(
    settings: &EquitySettings,
) -> Result<Arc<EquityService<StraightLineEstimator>>, AppError> {
    let pipeline = EquityAnalysisPipeline::new(settings.pipeline_config())?;
    let provider = Arc::new(StraightLineEstimator::default());
    Ok(Arc::new(EquityService::new(pipeline, Some(provider))))
}

pub(crate) fn parse_departure(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use midwhere_core::equity::ProviderFailurePolicy;

    #[test]
    fn parses_short_and_long_departure_times() {
        assert_eq!(
            parse_departure("08:15").expect("short form"),
            NaiveTime::from_hms_opt(8, 15, 0).expect("valid time")
        );
        assert_eq!(
            parse_departure(" 18:30:05 ").expect("long form"),
            NaiveTime::from_hms_opt(18, 30, 5).expect("valid time")
        );
        assert!(parse_departure("half past six").is_err());
    }

    #[test]
    fn service_rejects_zero_timeout() {
        let settings = EquitySettings {
            provider_timeout_ms: 0,
            failure_policy: ProviderFailurePolicy::Strict,
        };
        assert!(equity_service(&settings).is_err());
    }
}
