//! Evaluation runner
//!
//! Configuration and the predictor → scaler → aggregator pipeline.

mod config;
mod pipeline;

pub use config::{EvalConfig, WarningMode};
pub use pipeline::{Evaluator, Predictor, Scaler, StandardScaler, TargetSource};
