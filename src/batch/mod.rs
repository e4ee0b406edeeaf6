//! Batch grading of all eligible students of one assignment.
//!
//! Each student is read, parsed, scored and written back on its own.
//! Failures are recorded in the student's outcome and never stop the
//! batch.

use crate::grading::{parse_student, score_student};
use crate::models::{format_points, BatchReport, SkipReason, StudentOutcome, StudentResult};
use crate::review::{with_total, ReviewStore};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

/// Options threaded through a batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Compute totals without rewriting review files.
    pub dry_run: bool,
    /// Show a progress bar over the students.
    pub show_progress: bool,
}

/// Grades every student in `students` using `store` for file access.
pub fn grade_students(
    store: &dyn ReviewStore,
    students: &[String],
    options: BatchOptions,
) -> BatchReport {
    let progress = if options.show_progress {
        let pb = ProgressBar::new(students.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let mut report = BatchReport::default();

    for student in students {
        if let Some(ref pb) = progress {
            pb.set_message(student.clone());
        }

        let outcome = grade_student(store, student, options);
        log_outcome(student, &outcome);

        report.results.push(StudentResult {
            student: student.clone(),
            outcome,
        });

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    report
}

/// Read, parse, score and write back a single student.
pub fn grade_student(
    store: &dyn ReviewStore,
    student: &str,
    options: BatchOptions,
) -> StudentOutcome {
    debug!("Parsing {}...", student);

    let review = match store.read_review(student) {
        Ok(review) => review,
        Err(e) => {
            return StudentOutcome::Skipped {
                reason: SkipReason::Unreadable(format!("{:#}", e)),
            }
        }
    };

    // Markers are ASCII, so undecodable bytes elsewhere don't matter
    let text = String::from_utf8_lossy(&review);
    let record = match parse_student(student, &text) {
        Ok(record) => record,
        Err(e) => {
            return StudentOutcome::Skipped {
                reason: SkipReason::InvalidAnnotations(e.to_string()),
            }
        }
    };

    if record.has_no_assignments() {
        return StudentOutcome::Skipped {
            reason: SkipReason::NoAnnotations,
        };
    }

    let (scores, total) = score_student(&record);
    debug!("{} has reached {} points.", student, format_points(total));

    if options.dry_run {
        return StudentOutcome::Graded { scores, total };
    }

    match store.write_review(student, &with_total(&review, total)) {
        Ok(()) => StudentOutcome::Graded { scores, total },
        Err(e) => StudentOutcome::WriteFailed {
            scores,
            total,
            error: format!("{:#}", e),
        },
    }
}

fn log_outcome(student: &str, outcome: &StudentOutcome) {
    match outcome {
        StudentOutcome::Graded { .. } => {}
        StudentOutcome::WriteFailed { error, .. } => {
            warn!("{}: couldn't write review file: {}", student, error);
        }
        StudentOutcome::Skipped {
            reason: SkipReason::NoAnnotations,
        } => {
            debug!("{}: no matches found", student);
        }
        StudentOutcome::Skipped { reason } => {
            warn!("{}: skipped, {}", student, reason);
        }
    }
}
