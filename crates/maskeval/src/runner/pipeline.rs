//! Prediction-to-metrics pipeline
//!
//! Connects a predictor, a target source and an optional scaler to the
//! metric aggregator.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::config::EvalConfig;
use crate::error::{EvalError, EvalResult};
use crate::metrics::{MetricAggregator, MetricResolver};
use crate::types::{Prediction, PredictionGrid, ResultMapping, Target, TargetGrid};
use crate::warnings::WarningSink;

/// Produces predictions for every item of a dataset
pub trait Predictor {
    fn predict(&self) -> EvalResult<PredictionGrid>;
}

impl<F> Predictor for F
where
    F: Fn() -> EvalResult<PredictionGrid>,
{
    fn predict(&self) -> EvalResult<PredictionGrid> {
        self()
    }
}

/// Supplies targets aligned with the predictor's item order
pub trait TargetSource {
    fn targets(&self) -> EvalResult<TargetGrid>;
}

impl TargetSource for TargetGrid {
    fn targets(&self) -> EvalResult<TargetGrid> {
        Ok(self.clone())
    }
}

/// Maps scaled model outputs back to target units
pub trait Scaler {
    fn inverse_transform(&self, preds: PredictionGrid) -> EvalResult<PredictionGrid>;
}

/// Per-task standardization fitted on training targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl StandardScaler {
    pub fn new(means: Vec<f64>, stds: Vec<f64>) -> EvalResult<Self> {
        if means.len() != stds.len() {
            return Err(EvalError::shape(
                "scaler means and stds differ in length",
                means.len(),
                stds.len(),
            ));
        }
        Ok(Self { means, stds })
    }

    /// Fit per-task mean and standard deviation over present targets
    ///
    /// Tasks without targets get mean 0; a zero or undefined std becomes 1.
    pub fn fit(targets: &[Vec<Target>], num_tasks: usize) -> EvalResult<Self> {
        let mut means = Vec::with_capacity(num_tasks);
        let mut stds = Vec::with_capacity(num_tasks);

        for task in 0..num_tasks {
            let mut values = Vec::with_capacity(targets.len());
            for (item, row) in targets.iter().enumerate() {
                let cell = row.get(task).ok_or_else(|| {
                    EvalError::shape(
                        format!("target row {} has {} tasks", item, row.len()),
                        num_tasks,
                        row.len(),
                    )
                })?;
                if let Some(value) = cell.value() {
                    values.push(value);
                }
            }

            if values.is_empty() {
                means.push(0.0);
                stds.push(1.0);
                continue;
            }

            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            let std = variance.sqrt();
            means.push(mean);
            stds.push(if std.is_finite() && std > 0.0 { std } else { 1.0 });
        }

        Ok(Self { means, stds })
    }

    pub fn num_tasks(&self) -> usize {
        self.means.len()
    }
}

impl Scaler for StandardScaler {
    fn inverse_transform(&self, preds: PredictionGrid) -> EvalResult<PredictionGrid> {
        preds
            .into_iter()
            .enumerate()
            .map(|(item, row)| {
                if row.len() != self.num_tasks() {
                    return Err(EvalError::shape(
                        format!("prediction row {} does not match the scaler", item),
                        self.num_tasks(),
                        row.len(),
                    ));
                }
                Ok(row
                    .into_iter()
                    .enumerate()
                    .map(|(task, pred)| match pred {
                        Prediction::Scalar(value) => {
                            Prediction::Scalar(value * self.stds[task] + self.means[task])
                        }
                        scores @ Prediction::Scores(_) => scores,
                    })
                    .collect())
            })
            .collect()
    }
}

/// Runs evaluations for one configuration
pub struct Evaluator<R> {
    resolver: R,
    config: EvalConfig,
    sink: Arc<dyn WarningSink>,
}

impl<R: MetricResolver> Evaluator<R> {
    /// Create an evaluator; fails if the config is invalid or names an unknown metric
    pub fn new(resolver: R, config: EvalConfig) -> EvalResult<Self> {
        config.validate()?;
        for name in &config.metrics {
            resolver.resolve(name)?;
        }
        let sink = config.warnings.sink();
        Ok(Self {
            resolver,
            config,
            sink,
        })
    }

    /// Route warnings to `sink` instead of the configured default
    pub fn with_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate precomputed predictions against targets
    pub fn evaluate_predictions(
        &self,
        preds: &[Vec<Prediction>],
        targets: &[Vec<Target>],
    ) -> EvalResult<ResultMapping> {
        let aggregator = MetricAggregator::new(
            &self.resolver,
            &self.config.metrics,
            self.config.dataset_type,
            self.sink.as_ref(),
        )?;
        aggregator.evaluate(
            preds,
            targets,
            self.config.num_tasks,
            self.config.metric_by_row,
        )
    }

    /// Predict, undo target scaling if a scaler is given, then evaluate
    pub fn evaluate(
        &self,
        predictor: &dyn Predictor,
        source: &dyn TargetSource,
        scaler: Option<&dyn Scaler>,
    ) -> EvalResult<ResultMapping> {
        let mut preds = predictor.predict()?;
        if let Some(scaler) = scaler {
            preds = scaler.inverse_transform(preds)?;
        }
        let targets = source.targets()?;

        tracing::info!(
            items = preds.len(),
            tasks = self.config.num_tasks,
            dataset_type = %self.config.dataset_type,
            "evaluating predictions"
        );
        self.evaluate_predictions(&preds, &targets)
    }
}
