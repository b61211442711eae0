//! Metric aggregation over valid-only groups
//!
//! Computes every requested metric per task, and optionally per item with the
//! per-item values averaged into one number per metric.

use std::sync::Arc;

use super::registry::{MetricFn, MetricResolver};
use super::selector::{check_shape, select_valid};
use crate::error::EvalResult;
use crate::types::{Axis, DatasetType, MetricKey, Prediction, ResultMapping, Target};
use crate::warnings::{DegeneracyWarning, DegenerateSide, TracingSink, WarningSink};

/// Single-class findings for one classification group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Degeneracy {
    /// Every target is 0, or every target is 1
    pub targets: bool,
    /// Every prediction is 0, or every prediction is 1
    pub predictions: bool,
}

impl Degeneracy {
    /// Inspect a group; an empty group is reported as degenerate on both sides
    pub fn of(preds: &[Prediction], targets: &[f64]) -> Self {
        let scalars: Vec<Option<f64>> = preds.iter().map(Prediction::as_scalar).collect();
        Self {
            targets: single_class(targets.iter().map(|t| Some(*t))),
            predictions: single_class(scalars.into_iter()),
        }
    }

    pub fn any(&self) -> bool {
        self.targets || self.predictions
    }
}

fn single_class(values: impl Iterator<Item = Option<f64>> + Clone) -> bool {
    [0.0, 1.0]
        .iter()
        .any(|label| values.clone().all(|v| v == Some(*label)))
}

/// Outcome of evaluating one group
#[derive(Debug, Clone, PartialEq)]
enum GroupOutcome {
    /// No valid entries; contributes nothing
    Empty,
    /// Single-class classification group; every metric is `NaN`
    Degenerate(Degeneracy),
    /// One value per requested metric, in request order
    Computed(Vec<f64>),
}

/// Evaluates resolved metrics over prediction/target grids
pub struct MetricAggregator<'a> {
    metrics: Vec<(String, Arc<dyn MetricFn>)>,
    dataset_type: DatasetType,
    sink: &'a dyn WarningSink,
}

impl<'a> MetricAggregator<'a> {
    /// Resolve `metric_names` against `resolver`
    ///
    /// Duplicate names are collapsed, keeping the first occurrence. Names
    /// ending in `-by-row` are rejected.
    pub fn new<S: AsRef<str>>(
        resolver: &dyn MetricResolver,
        metric_names: &[S],
        dataset_type: DatasetType,
        sink: &'a dyn WarningSink,
    ) -> EvalResult<Self> {
        let mut metrics: Vec<(String, Arc<dyn MetricFn>)> = Vec::with_capacity(metric_names.len());
        for name in metric_names {
            let name = name.as_ref();
            if metrics.iter().any(|(existing, _)| existing == name) {
                continue;
            }
            MetricKey::validate_name(name)?;
            metrics.push((name.to_string(), resolver.resolve(name)?));
        }

        Ok(Self {
            metrics,
            dataset_type,
            sink,
        })
    }

    /// Names of the metrics this aggregator computes, in request order
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(name, _)| name.as_str())
    }

    pub fn dataset_type(&self) -> DatasetType {
        self.dataset_type
    }

    /// Task-axis results, plus row-axis results under `-by-row` keys if `by_row`
    pub fn evaluate(
        &self,
        preds: &[Vec<Prediction>],
        targets: &[Vec<Target>],
        num_tasks: usize,
        by_row: bool,
    ) -> EvalResult<ResultMapping> {
        let mut results = self.evaluate_by_task(preds, targets, num_tasks)?;
        if by_row {
            results.merge(self.evaluate_by_row(preds, targets, num_tasks)?);
        }
        Ok(results)
    }

    /// One value per task with at least one valid target
    ///
    /// Tasks without any valid target are skipped, so a sequence may be
    /// shorter than `num_tasks`. An empty grid yields `num_tasks` `NaN`s.
    pub fn evaluate_by_task(
        &self,
        preds: &[Vec<Prediction>],
        targets: &[Vec<Target>],
        num_tasks: usize,
    ) -> EvalResult<ResultMapping> {
        if preds.is_empty() {
            check_shape(preds, targets, num_tasks)?;
            return Ok(self.fill_nan(Axis::Task, num_tasks));
        }

        let groups = select_valid(preds, targets, num_tasks, Axis::Task)?;
        let mut results = ResultMapping::new();

        for (task, (group_preds, group_targets)) in groups.iter().enumerate() {
            match self.evaluate_group(group_preds, group_targets) {
                GroupOutcome::Empty => {
                    tracing::debug!(task, "skipping task without valid targets");
                }
                GroupOutcome::Degenerate(degeneracy) => {
                    if degeneracy.targets {
                        self.sink
                            .warn(&DegeneracyWarning::new(task, DegenerateSide::Targets));
                    }
                    if degeneracy.predictions {
                        self.sink
                            .warn(&DegeneracyWarning::new(task, DegenerateSide::Predictions));
                    }
                    self.push_all(&mut results, Axis::Task, f64::NAN);
                }
                GroupOutcome::Computed(values) => {
                    self.push_values(&mut results, Axis::Task, values);
                }
            }
        }

        tracing::debug!(
            tasks = num_tasks,
            items = preds.len(),
            metrics = self.metrics.len(),
            "evaluated predictions by task"
        );

        Ok(results)
    }

    /// One skip-NaN mean per metric over all items
    ///
    /// Degenerate items count as `NaN` and empty items are left out; the mean
    /// is `NaN` when no item produced a finite value.
    pub fn evaluate_by_row(
        &self,
        preds: &[Vec<Prediction>],
        targets: &[Vec<Target>],
        num_tasks: usize,
    ) -> EvalResult<ResultMapping> {
        if preds.is_empty() {
            check_shape(preds, targets, num_tasks)?;
            return Ok(self.fill_nan(Axis::Row, 1));
        }

        let groups = select_valid(preds, targets, num_tasks, Axis::Row)?;
        let mut per_item: Vec<Vec<f64>> = vec![Vec::with_capacity(groups.len()); self.metrics.len()];

        for (group_preds, group_targets) in groups.iter() {
            match self.evaluate_group(group_preds, group_targets) {
                GroupOutcome::Empty => {}
                GroupOutcome::Degenerate(_) => {
                    per_item.iter_mut().for_each(|values| values.push(f64::NAN));
                }
                GroupOutcome::Computed(values) => {
                    for (column, value) in per_item.iter_mut().zip(values) {
                        column.push(value);
                    }
                }
            }
        }

        let mut results = ResultMapping::new();
        for ((name, _), values) in self.metrics.iter().zip(per_item) {
            let mean = nan_mean(&values);
            tracing::debug!(metric = %name, items = values.len(), mean, "averaged metric by row");
            results.insert(MetricKey::by_row(name.clone()), vec![mean]);
        }

        Ok(results)
    }

    fn evaluate_group(&self, preds: &[Prediction], targets: &[f64]) -> GroupOutcome {
        if targets.is_empty() {
            return GroupOutcome::Empty;
        }

        if self.dataset_type == DatasetType::Classification {
            let degeneracy = Degeneracy::of(preds, targets);
            if degeneracy.any() {
                return GroupOutcome::Degenerate(degeneracy);
            }
        }

        let labels: Option<Vec<usize>> = match self.dataset_type {
            DatasetType::Multiclass => Some((0..preds[0].width()).collect()),
            _ => None,
        };

        GroupOutcome::Computed(
            self.metrics
                .iter()
                .map(|(_, metric)| metric.compute(targets, preds, labels.as_deref()))
                .collect(),
        )
    }

    fn fill_nan(&self, axis: Axis, count: usize) -> ResultMapping {
        let mut results = ResultMapping::new();
        for (name, _) in &self.metrics {
            results.insert(MetricKey::new(name.clone(), axis), vec![f64::NAN; count]);
        }
        results
    }

    fn push_all(&self, results: &mut ResultMapping, axis: Axis, value: f64) {
        for (name, _) in &self.metrics {
            results.push(MetricKey::new(name.clone(), axis), value);
        }
    }

    fn push_values(&self, results: &mut ResultMapping, axis: Axis, values: Vec<f64>) {
        for ((name, _), value) in self.metrics.iter().zip(values) {
            results.push(MetricKey::new(name.clone(), axis), value);
        }
    }
}

/// Arithmetic mean ignoring `NaN` entries; `NaN` if nothing remains
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Evaluate predictions against masked targets
///
/// Task-axis results are always returned; with `by_row` the row-axis means
/// are added under `-by-row` keys. When `logger` is `None`, degeneracy
/// warnings go to [`TracingSink`].
#[allow(clippy::too_many_arguments)]
pub fn evaluate_predictions<S: AsRef<str>>(
    preds: &[Vec<Prediction>],
    targets: &[Vec<Target>],
    num_tasks: usize,
    metrics: &[S],
    dataset_type: DatasetType,
    by_row: bool,
    resolver: &dyn MetricResolver,
    logger: Option<&dyn WarningSink>,
) -> EvalResult<ResultMapping> {
    let default_sink = TracingSink;
    let sink = logger.unwrap_or(&default_sink);
    MetricAggregator::new(resolver, metrics, dataset_type, sink)?
        .evaluate(preds, targets, num_tasks, by_row)
}
