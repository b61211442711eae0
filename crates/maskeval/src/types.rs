//! Core value types for evaluation
//!
//! Defines prediction and target cells, dataset types, aggregation axes and
//! the result mapping returned by the aggregator.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{EvalError, EvalResult};

/// Predictions for a batch: one row per item, one cell per task
pub type PredictionGrid = Vec<Vec<Prediction>>;

/// Targets for a batch, aligned with a [`PredictionGrid`]
pub type TargetGrid = Vec<Vec<Target>>;

/// A single model output for one (item, task) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    /// Regression value or binary class probability
    Scalar(f64),
    /// Per-class scores for a multiclass task
    Scores(Vec<f64>),
}

impl Prediction {
    /// Scalar value, if this is not a class-score vector
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Prediction::Scalar(value) => Some(*value),
            Prediction::Scores(_) => None,
        }
    }

    /// Number of values carried by this prediction
    pub fn width(&self) -> usize {
        match self {
            Prediction::Scalar(_) => 1,
            Prediction::Scores(scores) => scores.len(),
        }
    }
}

impl From<f64> for Prediction {
    fn from(value: f64) -> Self {
        Prediction::Scalar(value)
    }
}

impl From<Vec<f64>> for Prediction {
    fn from(scores: Vec<f64>) -> Self {
        Prediction::Scores(scores)
    }
}

/// A ground-truth cell which may be missing
///
/// Serialized as a nullable number: `null` is [`Target::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Target {
    Present(f64),
    Absent,
}

impl Target {
    /// The target value, if present
    pub fn value(&self) -> Option<f64> {
        match self {
            Target::Present(value) => Some(*value),
            Target::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Target::Present(_))
    }
}

impl From<Option<f64>> for Target {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Target::Present(v),
            None => Target::Absent,
        }
    }
}

impl From<Target> for Option<f64> {
    fn from(target: Target) -> Self {
        target.value()
    }
}

impl From<f64> for Target {
    fn from(value: f64) -> Self {
        Target::Present(value)
    }
}

/// Kind of dataset being evaluated
///
/// Selects the degeneracy checks and the metric call signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    #[default]
    Regression,
    Classification,
    Multiclass,
}

impl DatasetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Regression => "regression",
            DatasetType::Classification => "classification",
            DatasetType::Multiclass => "multiclass",
        }
    }
}

impl FromStr for DatasetType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regression" => Ok(DatasetType::Regression),
            "classification" => Ok(DatasetType::Classification),
            "multiclass" => Ok(DatasetType::Multiclass),
            other => Err(EvalError::config_field(
                format!("unsupported dataset type '{}'", other),
                "dataset_type",
            )),
        }
    }
}

impl std::fmt::Display for DatasetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Axis along which groups are formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// One group per task, across all items
    Task,
    /// One group per item, across all tasks
    Row,
}

impl Axis {
    /// Suffix appended to metric names computed along this axis
    pub fn key_suffix(&self) -> &'static str {
        match self {
            Axis::Task => "",
            Axis::Row => "-by-row",
        }
    }
}

/// Key of a [`ResultMapping`] entry
///
/// Displays as the metric name, with a `-by-row` suffix for row-axis results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub name: String,
    pub axis: Axis,
}

impl MetricKey {
    pub fn new(name: impl Into<String>, axis: Axis) -> Self {
        Self {
            name: name.into(),
            axis,
        }
    }

    pub fn by_task(name: impl Into<String>) -> Self {
        Self::new(name, Axis::Task)
    }

    pub fn by_row(name: impl Into<String>) -> Self {
        Self::new(name, Axis::Row)
    }

    /// Check that a metric name can be keyed on either axis without collisions
    ///
    /// Names must be non-blank and must not end with the row-axis suffix,
    /// otherwise `name-by-row` on the task axis would display the same as
    /// `name` on the row axis.
    pub fn validate_name(name: &str) -> EvalResult<()> {
        if name.trim().is_empty() {
            return Err(EvalError::config_field(
                format!("invalid metric name '{}'", name),
                "metrics",
            ));
        }
        if name.ends_with(Axis::Row.key_suffix()) {
            return Err(EvalError::config_field(
                format!(
                    "metric name '{}' must not end with '{}'",
                    name,
                    Axis::Row.key_suffix()
                ),
                "metrics",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.axis.key_suffix())
    }
}

impl FromStr for MetricKey {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = Axis::Row.key_suffix();
        let key = match s.strip_suffix(suffix) {
            Some(name) => MetricKey::by_row(name),
            None => MetricKey::by_task(s),
        };
        if key.name.is_empty() {
            return Err(EvalError::config_field("empty metric name", "metrics"));
        }
        Ok(key)
    }
}

impl Serialize for MetricKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MetricKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Metric values keyed by metric and axis
///
/// Task-axis entries hold one value per task with labeled data; row-axis
/// entries hold a single averaged value. `NaN` marks a value that could not
/// be computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultMapping(BTreeMap<MetricKey, Vec<f64>>);

// JSON has no NaN; serde_json writes it as `null`, so read `null` back as NaN.
impl<'de> Deserialize<'de> for ResultMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<MetricKey, Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(key, values)| {
                    let values = values
                        .into_iter()
                        .map(|v| v.unwrap_or(f64::NAN))
                        .collect();
                    (key, values)
                })
                .collect(),
        ))
    }
}

impl ResultMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the sequence stored under `key`
    pub fn push(&mut self, key: MetricKey, value: f64) {
        self.0.entry(key).or_default().push(value);
    }

    /// Replace the sequence stored under `key`
    pub fn insert(&mut self, key: MetricKey, values: Vec<f64>) -> Option<Vec<f64>> {
        self.0.insert(key, values)
    }

    pub fn get(&self, key: &MetricKey) -> Option<&[f64]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Task-axis values for a metric name
    pub fn by_task(&self, name: &str) -> Option<&[f64]> {
        self.get(&MetricKey::by_task(name))
    }

    /// Row-axis value for a metric name
    pub fn by_row(&self, name: &str) -> Option<f64> {
        self.get(&MetricKey::by_row(name))
            .and_then(|values| values.first().copied())
    }

    pub fn contains_key(&self, key: &MetricKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MetricKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &Vec<f64>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another mapping into this one, overwriting colliding keys
    pub fn merge(&mut self, other: ResultMapping) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for ResultMapping {
    type Item = (MetricKey, Vec<f64>);
    type IntoIter = std::collections::btree_map::IntoIter<MetricKey, Vec<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
