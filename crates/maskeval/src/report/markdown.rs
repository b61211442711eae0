//! Markdown report generation

use anyhow::Result;

use super::EvalReport;

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(report: &EvalReport) -> Result<String> {
        let mut md = String::new();

        md.push_str("# Evaluation Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Dataset Type**: {}\n", report.dataset_type));
        md.push_str(&format!("- **Tasks**: {}\n", report.num_tasks));
        md.push_str(&format!("- **Metric By Row**: {}\n", report.metric_by_row));
        md.push_str(&format!("- **Version**: {}\n", report.maskeval_version));
        md.push_str(&format!(
            "- **Timestamp**: {}\n\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Mean | Values | NaN |\n");
        md.push_str("|--------|------|--------|-----|\n");
        for summary in &report.summaries {
            md.push_str(&format!(
                "| {} | {:.4} | {} | {} |\n",
                summary.key, summary.mean, summary.count, summary.nan_count
            ));
        }
        md.push('\n');

        md.push_str("## Values\n\n");
        md.push_str("| Metric | Index | Value |\n");
        md.push_str("|--------|-------|-------|\n");
        for (key, values) in report.results.iter() {
            for (index, value) in values.iter().enumerate() {
                md.push_str(&format!("| {} | {} | {:.4} |\n", key, index, value));
            }
        }

        Ok(md)
    }
}
