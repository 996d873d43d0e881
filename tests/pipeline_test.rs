//! 流水线与批量运行集成测试

mod common;

use std::sync::Arc;

use common::*;
use review_insight::config::Config;
use review_insight::error::PipelineError;
use review_insight::orchestrator::RunStats;
use review_insight::{AcquisitionError, App, PipelineCoordinator, ReviewRecord, Target};

fn pipeline(behavior: PageBehavior, generator: Arc<FakeGenerator>) -> PipelineCoordinator {
    let factory = Arc::new(FakeFactory::new(behavior));
    PipelineCoordinator::new(controller(factory), orchestrator(generator))
}

#[tokio::test]
async fn test_end_to_end_average_and_summary() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let reviews = vec![
        raw_review("Excellent", "5 stars", "today"),
        raw_review("Good", "4 stars", "yesterday"),
        raw_review("Fine", "3 stars", "last week"),
    ];
    let pipeline = pipeline(PageBehavior::with_reviews(reviews), generator.clone());

    let result = pipeline
        .run("https://maps.example/place/e2e", None)
        .await
        .unwrap();

    assert_eq!(result.average_rating, 4.0);
    assert!(!result.summary.is_empty());
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_zero_reviews_never_calls_model() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let pipeline = pipeline(PageBehavior::with_reviews(Vec::new()), generator.clone());

    let err = pipeline
        .run("https://maps.example/place/empty", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Acquisition(AcquisitionError::NoReviewsFound)
    ));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_acquisition_failure_short_circuits() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let mut behavior = PageBehavior::with_reviews(raw_reviews(3, 5));
    behavior.selector_present = false;
    let pipeline = pipeline(behavior, generator.clone());

    let err = pipeline
        .run("https://maps.example/place/changed", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Acquisition(AcquisitionError::SelectorNotFound { .. })
    ));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_acquire_reviews_envelope() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let pipeline = pipeline(PageBehavior::with_reviews(raw_reviews(2, 5)), generator);

    let ok = pipeline.acquire_reviews("https://maps.example/place/7").await;
    assert!(ok.success);
    assert_eq!(ok.data.as_ref().map(Vec::len), Some(2));
    assert!(ok.error.is_none());

    let missing = pipeline.acquire_reviews("   ").await;
    assert!(!missing.success);
    assert!(missing.data.is_none());
    assert!(missing.error.is_some());
}

#[tokio::test]
async fn test_acquire_reviews_failure_envelope() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let mut behavior = PageBehavior::with_reviews(Vec::new());
    behavior.navigation = Navigation::Timeout;
    let pipeline = pipeline(behavior, generator);

    let response = pipeline.acquire_reviews("https://maps.example/slow").await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());
    assert!(json["error"].as_str().unwrap().contains("https://maps.example/slow"));
}

#[tokio::test]
async fn test_analyze_reviews_envelope() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let pipeline = pipeline(PageBehavior::with_reviews(Vec::new()), generator.clone());
    let reviews = vec![ReviewRecord::new("Loved it", 5, "today")];

    let response = pipeline.analyze_reviews(&reviews, None).await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["sentiment"], "positive");
    assert_eq!(json["data"]["average_rating"], 5.0);
    assert_eq!(generator.calls(), 1);
}

#[test]
fn test_analyze_reviews_rejects_empty_input() {
    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let pipeline = pipeline(PageBehavior::with_reviews(Vec::new()), generator.clone());

    let response = tokio_test::block_on(pipeline.analyze_reviews(&[], None));

    assert!(!response.success);
    assert!(response.error.is_some());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_batch_run_writes_one_line_per_target() {
    let output = std::env::temp_dir().join(format!(
        "review_insight_batch_{}.txt",
        std::process::id()
    ));
    let config = Config {
        output_log_file: output.to_string_lossy().into_owned(),
        max_browser_sessions: 2,
        ..Config::default()
    };

    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let app = App::with_pipeline(
        config,
        pipeline(PageBehavior::with_reviews(raw_reviews(4, 5)), generator.clone()),
    )
    .unwrap();

    let targets = vec![
        Target::parse_arg("https://maps.example/place/a#ChIJ-a"),
        Target::parse_arg("https://maps.example/place/b"),
    ];
    let stats = app.run(targets).await.unwrap();

    assert_eq!(
        stats,
        RunStats {
            success: 2,
            failed: 0,
            total: 2,
            failures: Default::default(),
        }
    );
    assert_eq!(generator.calls(), 2);

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    let with_place = lines
        .iter()
        .find(|line| line["url"] == "https://maps.example/place/a")
        .unwrap();
    assert_eq!(with_place["placeId"], "ChIJ-a");
    assert_eq!(with_place["response"]["success"], true);

    let without_place = lines
        .iter()
        .find(|line| line["url"] == "https://maps.example/place/b")
        .unwrap();
    assert!(without_place.get("placeId").is_none());

    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_batch_run_groups_failures_by_kind() {
    let output = std::env::temp_dir().join(format!(
        "review_insight_kinds_{}.txt",
        std::process::id()
    ));
    let config = Config {
        output_log_file: output.to_string_lossy().into_owned(),
        ..Config::default()
    };

    let generator = Arc::new(FakeGenerator::replying(valid_model_reply()));
    let app = App::with_pipeline(
        config,
        pipeline(PageBehavior::with_reviews(Vec::new()), generator.clone()),
    )
    .unwrap();

    let stats = app
        .run(vec![
            Target::parse_arg("https://maps.example/place/d"),
            Target::parse_arg("https://maps.example/place/e"),
        ])
        .await
        .unwrap();

    assert_eq!(stats.failed, 2);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures.get("NoReviewsFound"), Some(&2));
    assert_eq!(generator.calls(), 0);

    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_batch_run_counts_failures() {
    let output = std::env::temp_dir().join(format!(
        "review_insight_failures_{}.txt",
        std::process::id()
    ));
    let config = Config {
        output_log_file: output.to_string_lossy().into_owned(),
        ..Config::default()
    };

    let generator = Arc::new(FakeGenerator::failing("model unavailable"));
    let app = App::with_pipeline(
        config,
        pipeline(PageBehavior::with_reviews(raw_reviews(1, 3)), generator),
    )
    .unwrap();

    let stats = app
        .run(vec![Target::parse_arg("https://maps.example/place/c")])
        .await
        .unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.success, 0);
    assert_eq!(stats.failures.get("ModelCallError"), Some(&1));

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("model unavailable"));

    let _ = std::fs::remove_file(&output);
}
