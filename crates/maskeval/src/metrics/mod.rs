//! Masked metric evaluation
//!
//! This module splits prediction/target grids into valid-only groups and
//! computes named metrics over them, per task or per item.

mod aggregator;
mod registry;
mod selector;

pub use aggregator::{Degeneracy, MetricAggregator, evaluate_predictions, nan_mean};
pub use registry::{MetricFn, MetricRegistry, MetricResolver};
pub use selector::{ValidGroups, check_shape, select_valid};
