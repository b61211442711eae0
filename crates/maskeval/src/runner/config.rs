//! Evaluation configuration
//!
//! Configuration options for evaluating prediction grids.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{EvalError, EvalResult};
use crate::types::{DatasetType, MetricKey};
use crate::warnings::{NullSink, TracingSink, WarningSink};

/// Where degeneracy warnings go when no sink is supplied explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningMode {
    /// Emit through `tracing`
    #[default]
    Log,
    /// Drop warnings
    Silent,
}

impl WarningMode {
    /// Build the sink for this mode
    pub fn sink(&self) -> Arc<dyn WarningSink> {
        match self {
            WarningMode::Log => Arc::new(TracingSink),
            WarningMode::Silent => Arc::new(NullSink),
        }
    }
}

/// Configuration for evaluation runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Metric names, resolved against the metric registry
    pub metrics: Vec<String>,

    /// Dataset type
    #[serde(default)]
    pub dataset_type: DatasetType,

    /// Number of tasks per item
    #[serde(default = "default_num_tasks")]
    pub num_tasks: usize,

    /// Whether to also compute per-item metrics averaged over items
    #[serde(default)]
    pub metric_by_row: bool,

    /// Warning routing
    #[serde(default)]
    pub warnings: WarningMode,
}

fn default_num_tasks() -> usize {
    1
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            dataset_type: DatasetType::default(),
            num_tasks: default_num_tasks(),
            metric_by_row: false,
            warnings: WarningMode::default(),
        }
    }
}

impl EvalConfig {
    /// Create a new config with the given metrics
    pub fn new<S: Into<String>>(metrics: impl IntoIterator<Item = S>) -> Self {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set dataset type
    pub fn with_dataset_type(mut self, dataset_type: DatasetType) -> Self {
        self.dataset_type = dataset_type;
        self
    }

    /// Set number of tasks
    pub fn with_num_tasks(mut self, num_tasks: usize) -> Self {
        self.num_tasks = num_tasks;
        self
    }

    /// Also compute row-axis metrics
    pub fn by_row(mut self) -> Self {
        self.metric_by_row = true;
        self
    }

    /// Drop degeneracy warnings
    pub fn silent(mut self) -> Self {
        self.warnings = WarningMode::Silent;
        self
    }

    /// Check the configuration before running an evaluation
    pub fn validate(&self) -> EvalResult<()> {
        if self.metrics.is_empty() {
            return Err(EvalError::config_field(
                "at least one metric is required",
                "metrics",
            ));
        }
        for name in &self.metrics {
            MetricKey::validate_name(name)?;
        }
        if self.num_tasks == 0 {
            return Err(EvalError::config_field(
                "num_tasks must be at least 1",
                "num_tasks",
            ));
        }
        Ok(())
    }

    /// Load a config from a YAML, JSON or TOML file, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read eval config: {:?}", path))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
        .with_context(|| format!("Failed to parse eval config: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid eval config: {:?}", path))?;
        tracing::debug!(path = ?path, metrics = ?config.metrics, "loaded eval config");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> EvalResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> EvalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(toml: &str) -> EvalResult<Self> {
        Ok(toml::from_str(toml)?)
    }
}
