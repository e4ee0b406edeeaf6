//! Extraction of grading annotations from review text.
//!
//! Markers look like `~(<content>)`. The content's leading characters
//! select the annotation kind:
//!
//! | Content   | Meaning                         |
//! |-----------|---------------------------------|
//! | `++<n>`   | add `n` points                  |
//! | `+<n>`    | start a new exercise worth `n`  |
//! | `-<n>`    | subtract `n` points             |
//! | `*<n>`    | multiply the subtotal by `n`    |
//!
//! `++` has to be checked before `+`, otherwise every addition would
//! open a new exercise.

use super::error::AnnotationError;
use crate::models::{Annotation, Exercise, GradingAction, Operation, StudentRecord};
use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~\((.*?)\)").expect("marker pattern is valid"));

/// Returns the content of every marker in document order.
pub fn find_markers(text: &str) -> impl Iterator<Item = &str> {
    MARKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses the content of a single marker (without `~(` and `)`).
pub fn parse_annotation(marker: &str) -> Result<Annotation, AnnotationError> {
    if let Some(operand) = marker.strip_prefix("++") {
        let value = parse_number(marker, operand)?;
        return Ok(Annotation::Action(GradingAction::new(Operation::Add, value)));
    }

    if let Some(base) = marker.strip_prefix('+') {
        return Ok(Annotation::ExerciseStart(parse_number(marker, base)?));
    }

    let (operation, operand) = if let Some(rest) = marker.strip_prefix('-') {
        (Operation::Subtract, rest)
    } else if let Some(rest) = marker.strip_prefix('*') {
        (Operation::Multiply, rest)
    } else {
        return Err(AnnotationError::UnknownOperator {
            marker: marker.to_string(),
        });
    };

    let value = parse_number(marker, operand)?;
    Ok(Annotation::Action(GradingAction::new(operation, value)))
}

/// Parses review text into exercises.
///
/// An empty result means the text contains no markers at all.
pub fn parse_review(text: &str) -> Result<Vec<Exercise>, AnnotationError> {
    let mut exercises: Vec<Exercise> = Vec::new();

    for marker in find_markers(text) {
        match parse_annotation(marker)? {
            Annotation::ExerciseStart(base) => exercises.push(Exercise::new(base)),
            Annotation::Action(action) => match exercises.last_mut() {
                Some(current) => current.actions.push(action),
                None => {
                    return Err(AnnotationError::ActionBeforeExercise {
                        marker: marker.to_string(),
                    })
                }
            },
        }
    }

    Ok(exercises)
}

/// Parses the review of one student.
pub fn parse_student(student: &str, text: &str) -> Result<StudentRecord, AnnotationError> {
    Ok(StudentRecord::new(student, parse_review(text)?))
}

fn parse_number(marker: &str, raw: &str) -> Result<f64, AnnotationError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|source| AnnotationError::InvalidNumber {
            marker: marker.to_string(),
            value: trimmed.to_string(),
            source,
        })?;

    if !value.is_finite() {
        return Err(AnnotationError::NonFiniteNumber {
            marker: marker.to_string(),
            value: trimmed.to_string(),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_markers_on_one_line() {
        let markers: Vec<_> = find_markers("Aufgabe 1 ~(+10) gut ~(++2) aber ~(-1)").collect();
        assert_eq!(markers, vec!["+10", "++2", "-1"]);
    }

    #[test]
    fn test_find_markers_ignores_plain_text() {
        assert_eq!(find_markers("no markers (here) ~ at all").count(), 0);
        assert_eq!(find_markers("~(\n+3)").count(), 0);
    }

    #[test]
    fn test_parse_annotation_kinds() {
        assert_eq!(parse_annotation("+10").unwrap(), Annotation::ExerciseStart(10.0));
        assert_eq!(
            parse_annotation("++2").unwrap(),
            Annotation::Action(GradingAction::new(Operation::Add, 2.0))
        );
        assert_eq!(
            parse_annotation("-1.5").unwrap(),
            Annotation::Action(GradingAction::new(Operation::Subtract, 1.5))
        );
        assert_eq!(
            parse_annotation("*0.5").unwrap(),
            Annotation::Action(GradingAction::new(Operation::Multiply, 0.5))
        );
    }

    #[test]
    fn test_double_plus_is_not_an_exercise_start() {
        // `++2` must never be read as an exercise worth `+2`
        assert!(matches!(
            parse_annotation("++2").unwrap(),
            Annotation::Action(_)
        ));
        assert_eq!(parse_annotation("+ 2").unwrap(), Annotation::ExerciseStart(2.0));
    }

    #[test]
    fn test_parse_annotation_trims_operand() {
        assert_eq!(parse_annotation("+ 4 ").unwrap(), Annotation::ExerciseStart(4.0));
    }

    #[test]
    fn test_parse_annotation_errors() {
        assert!(matches!(
            parse_annotation("/2"),
            Err(AnnotationError::UnknownOperator { .. })
        ));
        assert!(matches!(
            parse_annotation(""),
            Err(AnnotationError::UnknownOperator { .. })
        ));
        assert!(matches!(
            parse_annotation("++zwei"),
            Err(AnnotationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_annotation("*inf"),
            Err(AnnotationError::NonFiniteNumber { .. })
        ));
    }

    #[test]
    fn test_parse_review_groups_actions() {
        let text = "\
Aufgabe 1 ~(+4)
  schoen ~(++1)
Aufgabe 2 ~(+6)
  zu spaet ~(*0.5)
";
        let exercises = parse_review(text).unwrap();
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].base, 4.0);
        assert_eq!(
            exercises[0].actions,
            vec![GradingAction::new(Operation::Add, 1.0)]
        );
        assert_eq!(exercises[1].base, 6.0);
        assert_eq!(
            exercises[1].actions,
            vec![GradingAction::new(Operation::Multiply, 0.5)]
        );
    }

    #[test]
    fn test_parse_review_without_markers() {
        assert!(parse_review("Alles gut.\n").unwrap().is_empty());
        assert!(parse_student("alice", "").unwrap().has_no_assignments());
    }

    #[test]
    fn test_action_before_exercise_is_an_error() {
        let err = parse_review("~(++2) ~(+10)").unwrap_err();
        assert!(matches!(err, AnnotationError::ActionBeforeExercise { ref marker } if marker == "++2"));
    }

    #[test]
    fn test_error_message_names_marker() {
        let err = parse_review("~(+10) ~(-x)").unwrap_err();
        assert_eq!(err.to_string(), "`x` in `~(-x)` is not a number");
    }
}
