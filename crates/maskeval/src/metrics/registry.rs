//! Metric lookup by name
//!
//! Metric functions are supplied by the caller; this module only stores and
//! resolves them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EvalError, EvalResult};
use crate::types::Prediction;

/// A metric computed over one group of valid targets and predictions
///
/// `labels` is set for multiclass datasets and lists every class index, so
/// the metric does not have to infer the label set from a partial sample.
pub trait MetricFn: Send + Sync {
    fn compute(&self, targets: &[f64], preds: &[Prediction], labels: Option<&[usize]>) -> f64;
}

impl<F> MetricFn for F
where
    F: Fn(&[f64], &[Prediction], Option<&[usize]>) -> f64 + Send + Sync,
{
    fn compute(&self, targets: &[f64], preds: &[Prediction], labels: Option<&[usize]>) -> f64 {
        self(targets, preds, labels)
    }
}

/// Resolves metric names to metric functions
pub trait MetricResolver: Send + Sync {
    /// Look up a metric, failing with [`EvalError::UnknownMetric`] if absent
    fn resolve(&self, name: &str) -> EvalResult<Arc<dyn MetricFn>>;
}

/// Name-keyed collection of metric functions
#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, Arc<dyn MetricFn>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, metric: impl MetricFn + 'static) {
        let name = name.into();
        tracing::debug!(metric = %name, "registered metric");
        self.metrics.insert(name, Arc::new(metric));
    }

    /// Builder form of [`MetricRegistry::register`]
    pub fn with_metric(mut self, name: impl Into<String>, metric: impl MetricFn + 'static) -> Self {
        self.register(name, metric);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Registered metric names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.metrics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl MetricResolver for MetricRegistry {
    fn resolve(&self, name: &str) -> EvalResult<Arc<dyn MetricFn>> {
        self.metrics
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::unknown_metric(name))
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(targets: &[f64], _preds: &[Prediction], _labels: Option<&[usize]>) -> f64 {
        targets.len() as f64
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = MetricRegistry::new()
            .with_metric("count", count)
            .with_metric("zero", |_: &[f64], _: &[Prediction], _: Option<&[usize]>| 0.0);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["count", "zero"]);

        let metric = registry.resolve("count").unwrap();
        assert_eq!(metric.compute(&[1.0, 0.0], &[], None), 2.0);
    }

    #[test]
    fn test_unknown_metric() {
        let registry = MetricRegistry::new();
        match registry.resolve("auc") {
            Err(EvalError::UnknownMetric { name }) => assert_eq!(name, "auc"),
            other => panic!("Expected UnknownMetric, got {:?}", other.map(|_| ())),
        }
    }
}
