//! Masked multi-task metric evaluation
//!
//! This crate evaluates model predictions against ground-truth targets where
//! each item carries several tasks and any target may be missing.
//!
//! # Features
//!
//! - **Validity Selection**: regroups a `(items × tasks)` grid per task or per
//!   item, dropping cells without a target
//! - **Metric Aggregation**: runs caller-supplied metrics per group, with
//!   single-class guards for classification and skip-NaN averaging per item
//! - **Pipeline**: predictor → inverse scaling → evaluation
//! - **Report Generation**: JSON, Markdown and table output
//!
//! # Example
//!
//! ```rust
//! use maskeval::{DatasetType, MetricRegistry, NullSink, Prediction, Target, evaluate_predictions};
//!
//! let registry = MetricRegistry::new().with_metric(
//!     "count",
//!     |targets: &[f64], _: &[Prediction], _: Option<&[usize]>| targets.len() as f64,
//! );
//! let preds = vec![vec![Prediction::Scalar(0.9)], vec![Prediction::Scalar(0.2)]];
//! let targets = vec![vec![Target::Present(1.0)], vec![Target::Absent]];
//!
//! let results = evaluate_predictions(
//!     &preds,
//!     &targets,
//!     1,
//!     &["count"],
//!     DatasetType::Regression,
//!     false,
//!     &registry,
//!     Some(&NullSink),
//! )
//! .unwrap();
//! assert_eq!(results.by_task("count"), Some(&[1.0][..]));
//! ```

pub mod error;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod types;
pub mod warnings;

// Re-exports for convenience
pub use error::{EvalError, EvalResult};
pub use metrics::{
    MetricAggregator, MetricFn, MetricRegistry, MetricResolver, ValidGroups, evaluate_predictions,
    select_valid,
};
pub use report::{EvalReport, ReportFormat, generate_report};
pub use runner::{EvalConfig, Evaluator, Predictor, Scaler, StandardScaler, TargetSource, WarningMode};
pub use types::{
    Axis, DatasetType, MetricKey, Prediction, PredictionGrid, ResultMapping, Target, TargetGrid,
};
pub use warnings::{
    CollectingSink, DegeneracyWarning, DegenerateSide, NullSink, TracingSink, WarningSink,
};
