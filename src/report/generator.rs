//! Markdown and JSON statistics reports.

use super::charts::format_tick;
use crate::analysis::{CohortStatistics, ExerciseStatistics};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(stats: &CohortStatistics) -> String {
    let mut output = String::new();

    output.push_str("# Point Statistics\n\n");
    output.push_str(&generate_metadata_section(stats, Utc::now()));
    output.push_str(&generate_summary_section(stats));
    output.push_str(&generate_histogram_section(stats));
    output.push_str("---\n\n*Report generated by korrektor*\n");

    output
}

fn generate_metadata_section(stats: &CohortStatistics, generated: DateTime<Utc>) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        generated.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Students:** {}\n", stats.students));
    section.push_str(&format!("- **Exercises:** {}\n\n", stats.exercises.len()));

    section
}

fn generate_summary_section(stats: &CohortStatistics) -> String {
    let mut section = String::new();

    section.push_str("## Point Distribution\n\n");
    if stats.exercises.is_empty() {
        section.push_str("No graded exercises.\n\n");
        return section;
    }

    section.push_str("| Exercise | Min | Q1 | Median | Q3 | Max | Mean | Mean Deviation |\n");
    section.push_str("|:---:|---:|---:|---:|---:|---:|---:|---:|\n");
    for e in &stats.exercises {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.2} | {:.2} |\n",
            e.exercise,
            format_tick(e.min),
            format_tick(e.summary.q1),
            format_tick(e.summary.median),
            format_tick(e.summary.q3),
            format_tick(e.max),
            e.mean,
            e.mean_deviation
        ));
    }
    section.push('\n');

    section
}

fn generate_histogram_section(stats: &CohortStatistics) -> String {
    let mut section = String::new();

    for e in &stats.exercises {
        section.push_str(&generate_exercise_histogram(e));
    }

    section
}

/// Histogram table of a single exercise.
fn generate_exercise_histogram(stats: &ExerciseStatistics) -> String {
    let mut block = String::new();
    let histogram = &stats.histogram;

    block.push_str(&format!(
        "### Point distribution of exercise no: {}\n\n",
        stats.exercise
    ));
    block.push_str("| #Points | #Students | |\n");
    block.push_str("|:---|:---:|:---|\n");

    let last = histogram.counts.len().saturating_sub(1);
    for (bin, count) in histogram.counts.iter().enumerate() {
        let close = if bin == last { "]" } else { ")" };
        block.push_str(&format!(
            "| [{:.2}, {:.2}{} | {} | {} |\n",
            histogram.edges[bin],
            histogram.edges[bin + 1],
            close,
            count,
            "#".repeat(*count)
        ));
    }
    block.push('\n');

    block
}

#[derive(Serialize)]
struct JsonStatistics<'a> {
    generated: DateTime<Utc>,
    #[serde(flatten)]
    statistics: &'a CohortStatistics,
}

/// Generate a JSON report.
pub fn generate_json_report(stats: &CohortStatistics) -> Result<String> {
    let report = JsonStatistics {
        generated: Utc::now(),
        statistics: stats,
    };
    serde_json::to_string_pretty(&report).map_err(Into::into)
}
