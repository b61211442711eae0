//! Report generation for evaluation results
//!
//! Generates reports in various formats (JSON, Markdown, terminal table).
//! Reports are returned as strings; writing them anywhere is up to the caller.

mod json;
mod markdown;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::nan_mean;
use crate::runner::EvalConfig;
use crate::types::{DatasetType, MetricKey, ResultMapping};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Table,
}

impl ReportFormat {
    /// Parse from a format name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "table" => Some(ReportFormat::Table),
            _ => None,
        }
    }
}

/// Summary of one result sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub key: MetricKey,
    /// Number of values in the sequence
    pub count: usize,
    /// Number of `NaN` values
    pub nan_count: usize,
    /// Mean over non-`NaN` values
    pub mean: f64,
}

impl MetricSummary {
    pub fn new(key: MetricKey, values: &[f64]) -> Self {
        Self {
            key,
            count: values.len(),
            nan_count: values.iter().filter(|v| v.is_nan()).count(),
            mean: nan_mean(values),
        }
    }
}

/// Evaluation results with the settings that produced them
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub dataset_type: DatasetType,
    pub num_tasks: usize,
    pub metric_by_row: bool,
    pub summaries: Vec<MetricSummary>,
    pub results: ResultMapping,
    pub timestamp: DateTime<Utc>,
    pub maskeval_version: String,
}

impl EvalReport {
    pub fn new(results: ResultMapping, config: &EvalConfig) -> Self {
        let summaries = results
            .iter()
            .map(|(key, values)| MetricSummary::new(key.clone(), values))
            .collect();

        Self {
            dataset_type: config.dataset_type,
            num_tasks: config.num_tasks,
            metric_by_row: config.metric_by_row,
            summaries,
            results,
            timestamp: Utc::now(),
            maskeval_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Summary for a given key
    pub fn summary(&self, key: &MetricKey) -> Option<&MetricSummary> {
        self.summaries.iter().find(|s| &s.key == key)
    }
}

/// Generate a report in the specified format
pub fn generate_report(report: &EvalReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(report),
        ReportFormat::Markdown => MarkdownReporter::generate(report),
        ReportFormat::Table => generate_table(report),
    }
}

/// Generate a simple table report for terminal output
fn generate_table(report: &EvalReport) -> Result<String> {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= Evaluation Results "));
    output.push_str(&format!(
        "Dataset: {} | Tasks: {} | By row: {}\n",
        report.dataset_type, report.num_tasks, report.metric_by_row
    ));
    output.push_str(&format!(
        "Timestamp: {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>12} {:>10} {:>10}\n",
        "Metric", "Mean", "Values", "NaN"
    ));
    output.push_str(&format!("{:-<70}\n", ""));

    for summary in &report.summaries {
        output.push_str(&format!(
            "{:<30} {:>12.4} {:>10} {:>10}\n",
            summary.key.to_string(),
            summary.mean,
            summary.count,
            summary.nan_count
        ));
    }

    output.push_str(&format!("{:-<70}\n\n", ""));

    output.push_str("PER TASK\n");
    output.push_str(&format!("{:-<70}\n", ""));
    for (key, values) in report.results.iter() {
        let formatted: Vec<String> = values.iter().map(|v| format!("{:.4}", v)).collect();
        output.push_str(&format!("{:<30} {}\n", key.to_string(), formatted.join(" ")));
    }

    output.push_str(&format!("{:=<70}\n", ""));

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn create_test_report() -> EvalReport {
        let mut results = ResultMapping::new();
        results.insert(MetricKey::by_task("auc"), vec![0.75, f64::NAN, 0.25]);
        results.insert(MetricKey::by_row("auc"), vec![0.6]);

        let config = EvalConfig::new(["auc"])
            .with_dataset_type(DatasetType::Classification)
            .with_num_tasks(3)
            .by_row();
        EvalReport::new(results, &config)
    }

    #[test]
    fn test_summaries() {
        let report = create_test_report();
        let summary = report.summary(&MetricKey::by_task("auc")).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.nan_count, 1);
        assert_eq!(summary.mean, 0.5);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ReportFormat::from_name("MD"), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::from_name("html"), None);
    }

    #[test]
    fn test_table_report() {
        let report = create_test_report();
        let table = generate_report(&report, ReportFormat::Table).unwrap();
        assert!(table.contains("auc-by-row"));
        assert!(table.contains("0.5000"));
        assert!(table.contains("Dataset: classification"));
    }
}
