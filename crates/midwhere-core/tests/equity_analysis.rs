//! End-to-end scenarios for the equity analysis entry point, exercised only through the public
//! crate surface.

use std::io::Cursor;

use midwhere_core::equity::{
    analyze_equity, build_context, jains_index, CenterEstimator, CenterMethod, Coordinate,
    EquityAnalysisPipeline, EquityClassifier, EquityError, EquityLevel, Participant,
    ParticipantImporter, PipelineConfig, ProviderFailurePolicy, StraightLineEstimator, TimeOfDay,
    TransportMode,
};

fn office_group() -> Vec<Participant> {
    vec![
        Participant::new("ana", Coordinate::new(1.3048, 103.8318), TransportMode::Transit)
            .with_known_travel_time(12.0),
        Participant::new("ben", Coordinate::new(1.3521, 103.9448), TransportMode::Driving)
            .with_known_travel_time(18.0),
        Participant::new("cai", Coordinate::new(1.2966, 103.7764), TransportMode::Walking)
            .with_known_travel_time(15.0),
        Participant::new("dee", Coordinate::new(1.4382, 103.7890), TransportMode::Cycling)
            .with_known_travel_time(21.0),
    ]
}

#[tokio::test]
async fn four_person_scenario_matches_formula() {
    let analysis = analyze_equity(&office_group(), None)
        .await
        .expect("analysis succeeds");

    let minutes = [12.0, 18.0, 15.0, 21.0];
    let sum: f64 = minutes.iter().sum();
    let sum_sq: f64 = minutes.iter().map(|m| m * m).sum();
    let expected = sum * sum / (4.0 * sum_sq);

    let assessment = analysis.assessment();
    assert!((assessment.fairness_index - expected).abs() < 1e-12);
    assert_eq!(
        assessment.level,
        EquityClassifier::default().classify(expected)
    );
    assert_eq!(analysis.context().sample_size, 4);
    assert!((analysis.context().mean_travel_time - 16.5).abs() < 1e-12);
    assert!(!assessment.recommendation.is_empty());
}

#[tokio::test]
async fn never_defaults_missing_times_to_zero() {
    let mut group = office_group();
    group[3].known_travel_time_minutes = None;

    let err = analyze_equity(&group, None)
        .await
        .expect_err("missing data is an error");

    assert!(matches!(err, EquityError::MissingTravelData { .. }));
    assert!(err.is_validation());
}

#[test]
fn fairness_properties_hold() {
    for n in 1..=12 {
        for x in [0.5, 7.0, 45.0] {
            assert_eq!(jains_index(&vec![x; n]).expect("index"), 1.0);
        }
    }

    let samples: [&[f64]; 4] = [
        &[1.0, 2.0, 3.0],
        &[0.0, 0.0, 9.0],
        &[100.0, 0.1],
        &[5.0, 8.0, 6.0, 45.0],
    ];
    for costs in samples {
        let index = jains_index(costs).expect("index");
        assert!(index > 0.0 && index <= 1.0);
    }

    let index = jains_index(&[12.0, 18.0, 15.0, 21.0]).expect("index");
    assert!(index > 0.8 && index < 1.0);
    let index = jains_index(&[5.0, 8.0, 6.0, 45.0]).expect("index");
    assert!(index > 0.0 && index < 0.6);
}

#[test]
fn classifier_buckets_and_context_work_together() {
    let classifier = EquityClassifier::default();
    assert_eq!(classifier.classify(0.9), EquityLevel::Excellent);
    assert_eq!(classifier.classify(0.8999), EquityLevel::Good);

    let context = build_context(
        3,
        [TransportMode::Walking, TransportMode::Walking],
        30.0,
        25.0,
    )
    .expect("context");
    assert_eq!(context.transport_modes.len(), 1);
    assert_eq!(context.time_of_day, TimeOfDay::Unknown);

    let assessment = classifier.assess(0.35, &context).expect("assessment");
    assert_eq!(assessment.level, EquityLevel::VeryPoor);
    assert!(assessment.recommendation.contains("25 minutes"));
}

#[test]
fn center_is_order_independent() {
    let estimator = CenterEstimator::default();
    let group = office_group();
    let mut shuffled = group.clone();
    shuffled.rotate_left(2);

    let a = estimator.estimate(&group).expect("estimate");
    let b = estimator.estimate(&shuffled).expect("estimate");
    assert_eq!(a, b);
    assert_eq!(a.method, CenterMethod::WeightedCentroid);
}

#[tokio::test]
async fn csv_import_feeds_the_pipeline() {
    let csv = "id,lat,lng,mode,weight,travel_time_minutes\n\
               ana,1.3048,103.8318,transit,,\n\
               ben,1.3521,103.9448,driving,1.5,\n\
               cai,1.2966,103.7764,walking,,\n";
    let participants = ParticipantImporter::from_reader(Cursor::new(csv)).expect("import");

    let pipeline = EquityAnalysisPipeline::new(PipelineConfig {
        failure_policy: ProviderFailurePolicy::Strict,
        ..PipelineConfig::default()
    })
    .expect("pipeline");
    let estimator = StraightLineEstimator::default();

    let analysis = pipeline
        .run_at(&participants, TimeOfDay::Afternoon, Some(&estimator))
        .await
        .expect("analysis succeeds");

    assert_eq!(analysis.samples().len(), 3);
    assert_eq!(analysis.context().time_of_day, TimeOfDay::Afternoon);
    assert!(analysis.warnings().is_empty());
}
