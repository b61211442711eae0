//! Integration tests for masked evaluation
//!
//! Exercises the public API end to end: selection, aggregation across both
//! axes, warnings, configuration and reports.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use maskeval::{
    CollectingSink, DatasetType, DegenerateSide, EvalConfig, EvalError, EvalReport, Evaluator,
    MetricKey, MetricRegistry, NullSink, Prediction, ReportFormat, Target, evaluate_predictions,
    generate_report,
};

fn preds(rows: &[&[f64]]) -> Vec<Vec<Prediction>> {
    rows.iter()
        .map(|row| row.iter().map(|v| Prediction::Scalar(*v)).collect())
        .collect()
}

fn targets(rows: &[&[Option<f64>]]) -> Vec<Vec<Target>> {
    rows.iter()
        .map(|row| row.iter().map(|v| Target::from(*v)).collect())
        .collect()
}

/// Accuracy with a 0.5 threshold on scalar predictions
fn accuracy(targets: &[f64], preds: &[Prediction], _labels: Option<&[usize]>) -> f64 {
    let correct = targets
        .iter()
        .zip(preds)
        .filter(|(t, p)| {
            let label = if p.as_scalar().unwrap_or(0.0) >= 0.5 { 1.0 } else { 0.0 };
            **t == label
        })
        .count();
    correct as f64 / targets.len() as f64
}

fn rmse(targets: &[f64], preds: &[Prediction], _labels: Option<&[usize]>) -> f64 {
    let mse = targets
        .iter()
        .zip(preds)
        .map(|(t, p)| (t - p.as_scalar().unwrap_or(f64::NAN)).powi(2))
        .sum::<f64>()
        / targets.len() as f64;
    mse.sqrt()
}

fn registry() -> MetricRegistry {
    MetricRegistry::new()
        .with_metric("accuracy", accuracy)
        .with_metric("rmse", rmse)
}

#[test]
fn test_accuracy_drops_absent_target() {
    let preds = preds(&[&[0.9], &[0.2], &[0.8]]);
    let targets = targets(&[&[Some(1.0)], &[Some(0.0)], &[None]]);

    let results = evaluate_predictions(
        &preds,
        &targets,
        1,
        &["accuracy"],
        DatasetType::Classification,
        false,
        &registry(),
        Some(&NullSink),
    )
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.by_task("accuracy").unwrap(), &[1.0]);
}

#[test]
fn test_all_zero_targets_never_invoke_metric() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let registry = MetricRegistry::new().with_metric(
        "auc",
        move |_: &[f64], _: &[Prediction], _: Option<&[usize]>| -> f64 {
            counter.fetch_add(1, Ordering::SeqCst);
            0.5
        },
    );
    let sink = CollectingSink::new();

    let preds = preds(&[&[0.9, 0.1], &[0.4, 0.8], &[0.3, 0.6]]);
    let targets = targets(&[&[Some(0.0), Some(1.0)], &[Some(0.0), Some(0.0)], &[Some(0.0), None]]);

    let results = evaluate_predictions(
        &preds,
        &targets,
        2,
        &["auc"],
        DatasetType::Classification,
        false,
        &registry,
        Some(&sink),
    )
    .unwrap();

    let auc = results.by_task("auc").unwrap();
    assert_eq!(auc.len(), 2);
    assert!(auc[0].is_nan());
    assert_eq!(auc[1], 0.5);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].task, 0);
    assert_eq!(warnings[0].side, DegenerateSide::Targets);
}

#[test]
fn test_keys_cover_requested_metrics_on_both_axes() {
    let preds = preds(&[&[1.0, 2.0], &[2.0, 2.0]]);
    let targets = targets(&[&[Some(1.0), None], &[Some(3.0), Some(2.0)]]);

    let results = evaluate_predictions(
        &preds,
        &targets,
        2,
        &["rmse", "accuracy"],
        DatasetType::Regression,
        true,
        &registry(),
        None,
    )
    .unwrap();

    let keys: Vec<String> = results.keys().map(|k| k.to_string()).collect();
    assert_eq!(
        keys,
        vec!["accuracy", "accuracy-by-row", "rmse", "rmse-by-row"]
    );

    // task 0: errors [0, 1]; task 1: error [0]
    let rmse = results.by_task("rmse").unwrap();
    assert!((rmse[0] - 0.5f64.sqrt()).abs() < 1e-12);
    assert_eq!(rmse[1], 0.0);

    // item 0: error [0]; item 1: errors [1, 0]
    let by_row = results.by_row("rmse").unwrap();
    assert!((by_row - 0.5f64.sqrt() / 2.0).abs() < 1e-12);
    assert_eq!(results.get(&MetricKey::by_row("rmse")).unwrap().len(), 1);
}

#[test]
fn test_empty_grid_returns_nan_per_task() {
    let results = evaluate_predictions(
        &[],
        &[],
        4,
        &["rmse"],
        DatasetType::Regression,
        false,
        &registry(),
        None,
    )
    .unwrap();

    let rmse = results.by_task("rmse").unwrap();
    assert_eq!(rmse.len(), 4);
    assert!(rmse.iter().all(|v| v.is_nan()));
}

#[test]
fn test_shape_mismatch_is_error() {
    let preds = preds(&[&[1.0, 2.0]]);
    let targets = targets(&[&[Some(1.0)]]);

    let err = evaluate_predictions(
        &preds,
        &targets,
        2,
        &["rmse"],
        DatasetType::Regression,
        false,
        &registry(),
        None,
    )
    .unwrap_err();

    assert!(matches!(err, EvalError::Shape { .. }));
}

/// Shared buffer for capturing formatted log output
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_default_sink_logs_through_tracing() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_env_filter("maskeval=debug")
        .finish();

    let preds = preds(&[&[0.7], &[0.6]]);
    let targets = targets(&[&[Some(1.0)], &[Some(1.0)]]);

    let results = tracing::subscriber::with_default(subscriber, || {
        evaluate_predictions(
            &preds,
            &targets,
            1,
            &["accuracy"],
            DatasetType::Classification,
            false,
            &registry(),
            None,
        )
    })
    .unwrap();

    assert!(results.by_task("accuracy").unwrap()[0].is_nan());
    let output = logs.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("targets all 0s or all 1s"));
}

#[test]
fn test_config_driven_evaluation_and_report() {
    let yaml = r#"
metrics: [accuracy]
dataset_type: classification
num_tasks: 2
metric_by_row: true
warnings: silent
"#;
    let config = EvalConfig::from_yaml_str(yaml).unwrap();
    let evaluator = Evaluator::new(registry(), config.clone()).unwrap();

    let preds = preds(&[&[0.9, 0.2], &[0.1, 0.7], &[0.6, 0.4]]);
    let targets = targets(&[&[Some(1.0), Some(0.0)], &[Some(0.0), Some(1.0)], &[Some(0.0), None]]);

    let results = evaluator.evaluate_predictions(&preds, &targets).unwrap();
    let accuracy = results.by_task("accuracy").unwrap();
    assert!((accuracy[0] - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(accuracy[1], 1.0);
    // items 0 and 1 score 1.0; item 2 has a single 0 target and is degenerate
    assert_eq!(results.by_row("accuracy"), Some(1.0));

    let report = EvalReport::new(results, &config);
    let md = generate_report(&report, ReportFormat::Markdown).unwrap();
    assert!(md.contains("accuracy-by-row"));
    let json = generate_report(&report, ReportFormat::Json).unwrap();
    assert!(json.contains("\"num_tasks\": 2"));
}
