//! Warning sinks for degenerate classification groups
//!
//! Warnings never change computed values; the sink only decides whether and
//! where they are observable.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Which side of a group was found to hold a single class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateSide {
    Targets,
    Predictions,
}

/// A degenerate task found during task-axis evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegeneracyWarning {
    /// Index of the task whose group was degenerate
    pub task: usize,
    pub side: DegenerateSide,
}

impl DegeneracyWarning {
    pub fn new(task: usize, side: DegenerateSide) -> Self {
        Self { task, side }
    }
}

impl std::fmt::Display for DegeneracyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = match self.side {
            DegenerateSide::Targets => "targets",
            DegenerateSide::Predictions => "predictions",
        };
        write!(
            f,
            "Warning: Found a task with {} all 0s or all 1s (task {})",
            side, self.task
        )
    }
}

/// Destination for evaluation warnings
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: &DegeneracyWarning);
}

/// Emits warnings through `tracing` (the default sink)
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, warning: &DegeneracyWarning) {
        tracing::warn!(task = warning.task, side = ?warning.side, "{}", warning);
    }
}

/// Drops every warning
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl WarningSink for NullSink {
    fn warn(&self, _warning: &DegeneracyWarning) {}
}

/// Buffers warnings so callers can surface them later
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<DegeneracyWarning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings collected so far
    pub fn warnings(&self) -> Vec<DegeneracyWarning> {
        self.warnings.lock().clone()
    }

    /// Remove and return all collected warnings
    pub fn drain(&self) -> Vec<DegeneracyWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty()
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, warning: &DegeneracyWarning) {
        self.warnings.lock().push(warning.clone());
    }
}

impl<T: WarningSink + ?Sized> WarningSink for std::sync::Arc<T> {
    fn warn(&self, warning: &DegeneracyWarning) {
        (**self).warn(warning)
    }
}
