use crate::infra::parse_departure;
use chrono::NaiveTime;
use clap::Args;
use midwhere_core::config::AppConfig;
use midwhere_core::equity::{
    CenterComparison, CenterEstimator, CenterMethod, Coordinate, EquityAnalysis,
    EquityAnalysisPipeline, Participant, ParticipantImporter, PipelineConfig,
    StraightLineEstimator, TimeOfDay, TransportMode,
};
use midwhere_core::error::AppError;
use midwhere_core::telemetry;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Participant CSV with columns id,lat,lng,mode,weight,travel_time_minutes
    #[arg(long)]
    pub(crate) participants: PathBuf,
    /// Departure time (HH:MM) used to classify peak traffic
    #[arg(long, value_parser = parse_departure)]
    pub(crate) departure: Option<NaiveTime>,
    /// Print the analysis as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Departure time (HH:MM). Defaults to 18:30.
    #[arg(long, value_parser = parse_departure)]
    pub(crate) departure: Option<NaiveTime>,
    /// Skip the estimated travel time portion of the demo.
    #[arg(long)]
    pub(crate) skip_estimates: bool,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let time_of_day = args
        .departure
        .map(TimeOfDay::from_time)
        .unwrap_or_default();
    let (participants, analysis) = analyze_file(
        &args.participants,
        time_of_day,
        config.equity.pipeline_config(),
    )
    .await?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&analysis).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    let comparison = compare_centers(&participants, &config.equity.pipeline_config());
    render_report(&participants, &analysis, comparison.as_ref());
    Ok(())
}

pub(crate) async fn analyze_file(
    path: &Path,
    time_of_day: TimeOfDay,
    config: PipelineConfig,
) -> Result<(Vec<Participant>, EquityAnalysis), AppError> {
    let participants = ParticipantImporter::from_path(path)?;
    let pipeline = EquityAnalysisPipeline::new(config)?;
    let estimator = StraightLineEstimator::default();
    let analysis = pipeline
        .run_at(&participants, time_of_day, Some(&estimator))
        .await?;
    Ok((participants, analysis))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        departure,
        skip_estimates,
    } = args;

    let departure = departure
        .or_else(|| NaiveTime::from_hms_opt(18, 30, 0))
        .unwrap_or_default();
    let time_of_day = TimeOfDay::from_time(departure);
    let config = PipelineConfig::default();
    let pipeline = EquityAnalysisPipeline::new(config.clone())?;

    println!(
        "MidWhere equity demo (departing {})",
        departure.format("%H:%M")
    );
    println!("\nReported travel times");
    let participants: Vec<Participant> = demo_group()
        .into_iter()
        .zip([12.0, 18.0, 15.0, 21.0])
        .map(|(participant, minutes)| participant.with_known_travel_time(minutes))
        .collect();
    let analysis = pipeline.run_at(&participants, time_of_day, None).await?;
    let comparison = compare_centers(&participants, &config);
    render_report(&participants, &analysis, comparison.as_ref());

    if skip_estimates {
        return Ok(());
    }

    println!("\nStraight-line estimates");
    let participants = demo_group();
    let estimator = StraightLineEstimator::default();
    let analysis = pipeline
        .run_at(&participants, time_of_day, Some(&estimator))
        .await?;
    render_report(&participants, &analysis, None);

    Ok(())
}

fn demo_group() -> Vec<Participant> {
    vec![
        Participant::new("ana", Coordinate::new(1.3048, 103.8318), TransportMode::Transit),
        Participant::new("ben", Coordinate::new(1.3521, 103.9448), TransportMode::Driving),
        Participant::new("cai", Coordinate::new(1.2966, 103.7764), TransportMode::Walking),
        Participant::new("dee", Coordinate::new(1.4382, 103.7890), TransportMode::Cycling)
            .with_weight(1.5),
    ]
}

fn compare_centers(
    participants: &[Participant],
    config: &PipelineConfig,
) -> Option<CenterComparison> {
    CenterEstimator::new(config.estimator.clone())
        .and_then(|estimator| estimator.compare(participants))
        .ok()
}

fn method_label(method: CenterMethod) -> &'static str {
    match method {
        CenterMethod::NaiveCentroid => "naive centroid",
        CenterMethod::WeightedCentroid => "transport-weighted centroid",
    }
}

fn render_report(
    participants: &[Participant],
    analysis: &EquityAnalysis,
    comparison: Option<&CenterComparison>,
) {
    let center = analysis.center();
    let assessment = analysis.assessment();
    let context = analysis.context();

    println!(
        "- Meeting point {:.5}, {:.5} via {} ({:.0}% confidence)",
        center.center.lat,
        center.center.lng,
        method_label(center.method),
        center.confidence * 100.0
    );
    println!(
        "  Naive centroid {:.5}, {:.5} | equity improvement {:+.1}%",
        center.naive_center.lat, center.naive_center.lng, center.equity_improvement_percent
    );
    if let Some(comparison) = comparison {
        println!(
            "  Mode-weighted burden {:.2} km -> {:.2} km",
            comparison.naive_burden_km, comparison.weighted_burden_km
        );
    }

    println!(
        "- Fairness index {:.3} -> {} ({:.0}% confidence)",
        assessment.fairness_index,
        assessment.level.label(),
        assessment.confidence * 100.0
    );
    println!(
        "  {} participants | modes: {} | mean {:.1} min | range {:.1} min | {}",
        context.sample_size,
        context.modes_label(),
        context.mean_travel_time,
        context.travel_time_range,
        context.time_of_day.label()
    );
    println!("  Recommendation: {}", assessment.recommendation);

    println!("Travel times:");
    for sample in analysis.samples() {
        let mode = participants
            .iter()
            .find(|participant| participant.id == sample.participant_id)
            .and_then(|participant| participant.mode)
            .map(|mode| mode.label())
            .unwrap_or("unspecified");
        println!(
            "  - {} ({}): {:.1} min [{:?}]",
            sample.participant_id.as_str(),
            mode,
            sample.minutes,
            sample.source
        );
    }

    for excluded in analysis.excluded() {
        println!(
            "  - {} excluded: {}",
            excluded.participant_id.as_str(),
            excluded.reason
        );
    }
    for warning in analysis.warnings() {
        println!("  ! {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midwhere_core::equity::TravelTimeSource;
    use std::fs;

    #[tokio::test]
    async fn demo_runs_both_scenarios() {
        let args = DemoArgs {
            departure: NaiveTime::from_hms_opt(8, 0, 0),
            skip_estimates: false,
        };
        run_demo(args).await.expect("demo completes");
    }

    #[tokio::test]
    async fn analyze_file_reads_csv_and_estimates_gaps() {
        let path = std::env::temp_dir().join(format!(
            "midwhere-analyze-{}.csv",
            std::process::id()
        ));
        fs::write(
            &path,
            "id,lat,lng,mode,weight,travel_time_minutes\n\
             ana,1.3048,103.8318,transit,,14\n\
             ben,1.3521,103.9448,driving,,\n\
             cai,1.2966,103.7764,walk,2,\n",
        )
        .expect("fixture written");

        let outcome = analyze_file(&path, TimeOfDay::Evening, PipelineConfig::default()).await;
        fs::remove_file(&path).ok();

        let (participants, analysis) = outcome.expect("analysis succeeds");
        assert_eq!(participants.len(), 3);
        assert_eq!(analysis.context().time_of_day, TimeOfDay::Evening);
        let sources: Vec<_> = analysis.samples().iter().map(|s| s.source).collect();
        assert_eq!(
            sources,
            vec![
                TravelTimeSource::Provided,
                TravelTimeSource::Estimated,
                TravelTimeSource::Estimated
            ]
        );
        assert!(compare_centers(&participants, &PipelineConfig::default()).is_some());
    }

    #[tokio::test]
    async fn analyze_file_reports_missing_file() {
        let missing = std::env::temp_dir().join("midwhere-does-not-exist.csv");
        let outcome = analyze_file(&missing, TimeOfDay::Unknown, PipelineConfig::default()).await;
        assert!(matches!(outcome, Err(AppError::Import(_))));
    }
}
