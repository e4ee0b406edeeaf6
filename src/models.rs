//! Data models for the grading run.
//!
//! This module contains the structures shared by the parser, the
//! calculator, the batch orchestrator and the statistics reporter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator of a grading action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `++`: points are added to the subtotal
    Add,
    /// `-`: points are taken off the subtotal
    Subtract,
    /// `*`: the subtotal is scaled by a factor
    Multiply,
}

impl Operation {
    /// Returns the marker prefix for this operation.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "++",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single point adjustment inside an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingAction {
    pub operation: Operation,
    pub operand: f64,
}

impl GradingAction {
    pub fn new(operation: Operation, operand: f64) -> Self {
        Self { operation, operand }
    }

    /// Signed contribution to the additive sum, if this is an additive term.
    pub fn additive_term(&self) -> Option<f64> {
        match self.operation {
            Operation::Add => Some(self.operand),
            Operation::Subtract => Some(-self.operand),
            Operation::Multiply => None,
        }
    }

    /// Factor applied to the subtotal, if this is a multiplicative term.
    pub fn factor(&self) -> Option<f64> {
        match self.operation {
            Operation::Multiply => Some(self.operand),
            _ => None,
        }
    }
}

impl fmt::Display for GradingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~({}{})", self.operation, self.operand)
    }
}

/// One marker found in review text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Annotation {
    /// `~(+<base>)` opens a new exercise.
    ExerciseStart(f64),
    /// `~(++<n>)`, `~(-<n>)` or `~(*<n>)`.
    Action(GradingAction),
}

/// A graded sub-problem: base score plus its adjustments in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub base: f64,
    pub actions: Vec<GradingAction>,
}

impl Exercise {
    /// Creates an exercise with no adjustments.
    pub fn new(base: f64) -> Self {
        Self {
            base,
            actions: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_actions(base: f64, actions: Vec<GradingAction>) -> Self {
        Self { base, actions }
    }
}

/// A student's parsed review.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    /// Directory name of the submission.
    pub student: String,
    /// Exercises in document order; empty if the review had no markers.
    pub exercises: Vec<Exercise>,
}

impl StudentRecord {
    pub fn new(student: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            student: student.into(),
            exercises,
        }
    }

    /// True if no annotations were found in the review.
    pub fn has_no_assignments(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// Why a student was left out of the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The review file is missing or could not be read.
    Unreadable(String),
    /// The review file contains no annotation markers.
    NoAnnotations,
    /// The annotations could not be turned into exercises.
    InvalidAnnotations(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(e) => write!(f, "review file unreadable: {}", e),
            SkipReason::NoAnnotations => write!(f, "no annotations found"),
            SkipReason::InvalidAnnotations(e) => write!(f, "invalid annotations: {}", e),
        }
    }
}

/// Result of processing one student directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudentOutcome {
    /// Score computed and written back (or computed in a dry run).
    Graded { scores: Vec<f64>, total: f64 },
    /// Score computed but the review file could not be rewritten.
    WriteFailed {
        scores: Vec<f64>,
        total: f64,
        error: String,
    },
    /// Nothing was computed for this student.
    Skipped { reason: SkipReason },
}

/// Outcome for a named student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResult {
    pub student: String,
    pub outcome: StudentOutcome,
}

impl StudentResult {
    /// Per-exercise scores, if the student was scored.
    pub fn scores(&self) -> Option<&[f64]> {
        match &self.outcome {
            StudentOutcome::Graded { scores, .. } | StudentOutcome::WriteFailed { scores, .. } => {
                Some(scores)
            }
            StudentOutcome::Skipped { .. } => None,
        }
    }

    /// Total points, if the student was scored.
    pub fn total(&self) -> Option<f64> {
        match &self.outcome {
            StudentOutcome::Graded { total, .. } | StudentOutcome::WriteFailed { total, .. } => {
                Some(*total)
            }
            StudentOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.outcome, StudentOutcome::Graded { .. })
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per eligible directory, in directory order.
    pub results: Vec<StudentResult>,
}

impl BatchReport {
    /// Number of eligible directories that were visited.
    pub fn eligible(&self) -> usize {
        self.results.len()
    }

    /// Number of students whose total was computed and persisted.
    pub fn parsed(&self) -> usize {
        self.results.iter().filter(|r| r.is_parsed()).count()
    }

    /// Score vectors of every scored student, in directory order.
    pub fn score_vectors(&self) -> Vec<&[f64]> {
        self.results.iter().filter_map(|r| r.scores()).collect()
    }

    /// Students that were skipped, with the reason.
    pub fn skipped(&self) -> Vec<(&str, &SkipReason)> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                StudentOutcome::Skipped { reason } => Some((r.student.as_str(), reason)),
                _ => None,
            })
            .collect()
    }
}

/// Formats a point total the way it is written into review files.
///
/// Whole numbers keep a trailing `.0` (`22.0`), fractions print in full.
pub fn format_points(points: f64) -> String {
    format!("{:?}", points)
}
