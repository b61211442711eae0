//! Error types for maskeval
//!
//! Only malformed input is an error. Degenerate or empty groups are reported
//! as `NaN` entries inside an otherwise successful result.

use thiserror::Error;

/// Result type alias for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Main error type for evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Prediction and target grids disagree with each other or with the task count
    #[error("Shape error: {message}")]
    Shape {
        message: String,
        expected: usize,
        actual: usize,
    },

    /// A metric name could not be resolved by the registry
    #[error("Unknown metric: {name}")]
    UnknownMetric { name: String },

    /// Invalid evaluation configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        field: Option<String>,
    },

    /// IO errors while loading inputs
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// Malformed JSON, YAML or TOML input
    #[error("Parse error ({format}): {message}")]
    Parse { format: String, message: String },
}

impl EvalError {
    /// Create a shape error
    pub fn shape(message: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::Shape {
            message: message.into(),
            expected,
            actual,
        }
    }

    /// Create an unknown metric error
    pub fn unknown_metric(name: impl Into<String>) -> Self {
        Self::UnknownMetric { name: name.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error tied to a specific field
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an IO error with the offending path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a parse error
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EvalError::Shape { .. } => "EVAL_SHAPE",
            EvalError::UnknownMetric { .. } => "EVAL_UNKNOWN_METRIC",
            EvalError::Config { .. } => "EVAL_CONFIG",
            EvalError::Io { .. } => "EVAL_IO",
            EvalError::Parse { .. } => "EVAL_PARSE",
        }
    }

    /// Whether the error was caused by the shape of the input grids
    pub fn is_shape_error(&self) -> bool {
        matches!(self, EvalError::Shape { .. })
    }
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse("json", err.to_string())
    }
}

impl From<serde_yaml::Error> for EvalError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse("yaml", err.to_string())
    }
}

impl From<toml::de::Error> for EvalError {
    fn from(err: toml::de::Error) -> Self {
        Self::parse("toml", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EvalError::shape("bad", 2, 3).error_code(), "EVAL_SHAPE");
        assert_eq!(
            EvalError::unknown_metric("auc").error_code(),
            "EVAL_UNKNOWN_METRIC"
        );
        assert_eq!(EvalError::config("empty").error_code(), "EVAL_CONFIG");
    }

    #[test]
    fn test_display() {
        let err = EvalError::unknown_metric("pr-auc");
        assert_eq!(err.to_string(), "Unknown metric: pr-auc");

        let err = EvalError::shape("row 2 has 3 tasks", 2, 3);
        assert!(err.is_shape_error());
        assert!(err.to_string().contains("row 2 has 3 tasks"));
    }

    #[test]
    fn test_from_json_error() {
        let err: EvalError = serde_json::from_str::<Vec<f64>>("[1,").unwrap_err().into();
        assert_eq!(err.error_code(), "EVAL_PARSE");
    }
}
