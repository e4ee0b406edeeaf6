//! Statistics report rendering.
//!
//! Renderers only see the per-exercise score columns; everything they
//! draw is derived from those.

pub mod charts;
pub mod generator;
pub mod pdf;

pub use generator::*;

use crate::analysis::{CohortStatistics, ExerciseScores};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;

/// Sink for the cohort statistics.
pub trait StatisticsRenderer {
    /// Render a report for `scores` into `destination`.
    fn render(&self, scores: &ExerciseScores, destination: &Path) -> Result<()>;
}

/// Box plot overview plus one histogram page per exercise.
#[derive(Debug, Clone)]
pub struct PdfReport {
    pub bins: usize,
}

impl StatisticsRenderer for PdfReport {
    fn render(&self, scores: &ExerciseScores, destination: &Path) -> Result<()> {
        let stats = CohortStatistics::compute(scores, self.bins);
        statistics_document(&stats).save(destination)
    }
}

/// Overview page followed by one histogram page per exercise.
fn statistics_document(stats: &CohortStatistics) -> pdf::PdfDocument {
    let mut document = pdf::PdfDocument::new("Point distribution");
    document.add_page(charts::overview_page(stats));
    for exercise in &stats.exercises {
        document.add_page(charts::histogram_page(exercise));
    }
    document
}

/// Markdown tables.
#[derive(Debug, Clone)]
pub struct MarkdownReport {
    pub bins: usize,
}

impl StatisticsRenderer for MarkdownReport {
    fn render(&self, scores: &ExerciseScores, destination: &Path) -> Result<()> {
        let stats = CohortStatistics::compute(scores, self.bins);
        write_text(destination, &generate_markdown_report(&stats))
    }
}

/// Statistics as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonReport {
    pub bins: usize,
}

impl StatisticsRenderer for JsonReport {
    fn render(&self, scores: &ExerciseScores, destination: &Path) -> Result<()> {
        let stats = CohortStatistics::compute(scores, self.bins);
        write_text(destination, &generate_json_report(&stats)?)
    }
}

/// Renderer for the requested output format.
pub fn renderer_for(format: OutputFormat, bins: usize) -> Box<dyn StatisticsRenderer> {
    match format {
        OutputFormat::Pdf => Box::new(PdfReport { bins }),
        OutputFormat::Markdown => Box::new(MarkdownReport { bins }),
        OutputFormat::Json => Box::new(JsonReport { bins }),
    }
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
