//! Point calculation.
//!
//! Additive terms (`++`, `-`) are applied to the base first, in the order
//! they were written. Factors (`*`) are applied afterwards to the adjusted
//! subtotal, again in written order. The result is rounded up.

use crate::models::{Exercise, StudentRecord};

/// Final score of one exercise.
pub fn exercise_score(exercise: &Exercise) -> f64 {
    let adjusted = exercise
        .actions
        .iter()
        .filter_map(|a| a.additive_term())
        .fold(exercise.base, |subtotal, term| subtotal + term);

    let scaled = exercise
        .actions
        .iter()
        .filter_map(|a| a.factor())
        .fold(adjusted, |subtotal, factor| subtotal * factor);

    scaled.ceil()
}

/// Per-exercise scores in document order.
pub fn score_vector(exercises: &[Exercise]) -> Vec<f64> {
    exercises.iter().map(exercise_score).collect()
}

/// Sum of per-exercise scores. The sum itself is not rounded again.
pub fn total_points(scores: &[f64]) -> f64 {
    scores.iter().fold(0.0, |total, score| total + score)
}

/// Scores and total for a parsed student.
pub fn score_student(record: &StudentRecord) -> (Vec<f64>, f64) {
    let scores = score_vector(&record.exercises);
    let total = total_points(&scores);
    (scores, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::parser::parse_review;
    use crate::models::{GradingAction, Operation};

    fn score_of(text: &str) -> Vec<f64> {
        score_vector(&parse_review(text).unwrap())
    }

    #[test]
    fn test_base_only() {
        assert_eq!(score_of("~(+5)"), vec![5.0]);
    }

    #[test]
    fn test_additions_then_multiplication() {
        assert_eq!(score_of("~(+10) ~(++2) ~(-1) ~(*2)"), vec![22.0]);
    }

    #[test]
    fn test_multiplication_waits_for_all_additions() {
        // Written order puts the factor first; it still applies to 10 + 2 - 1.
        assert_eq!(score_of("~(+10) ~(*2) ~(++2) ~(-1)"), vec![22.0]);
        assert_eq!(score_of("~(+10) ~(++2) ~(*2) ~(-1)"), vec![22.0]);
    }

    #[test]
    fn test_factors_apply_in_sequence() {
        assert_eq!(score_of("~(+10) ~(*0.5) ~(*0.5)"), vec![3.0]);
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(score_of("~(+6) ~(*0.5)"), vec![3.0]);
        assert_eq!(score_of("~(+7) ~(*0.5)"), vec![4.0]);
        assert_eq!(score_of("~(+4) ~(-0.25)"), vec![4.0]);
    }

    #[test]
    fn test_two_exercises_total() {
        let exercises = parse_review("~(+4) ~(++1)\n~(+6) ~(*0.5)").unwrap();
        let record = StudentRecord::new("alice", exercises);
        let (scores, total) = score_student(&record);

        assert_eq!(scores, vec![5.0, 3.0]);
        assert_eq!(total, 8.0);
    }

    #[test]
    fn test_total_is_not_rounded() {
        assert_eq!(total_points(&[1.5, 2.0]), 3.5);
        assert_eq!(total_points(&[]), 0.0);
    }

    #[test]
    fn test_closed_form_matches_for_any_interleaving() {
        let base = 7.5;
        let adds = [
            GradingAction::new(Operation::Add, 1.25),
            GradingAction::new(Operation::Subtract, 3.0),
            GradingAction::new(Operation::Add, 0.5),
        ];
        let muls = [
            GradingAction::new(Operation::Multiply, 0.9),
            GradingAction::new(Operation::Multiply, 1.1),
        ];
        let expected = ((base + 1.25 - 3.0 + 0.5) * 0.9 * 1.1_f64).ceil();

        // Every position for the two factors among the three additive terms.
        for i in 0..=adds.len() {
            for j in i..=adds.len() {
                let mut actions = adds.to_vec();
                actions.insert(j, muls[1]);
                actions.insert(i, muls[0]);
                let exercise = Exercise::with_actions(base, actions);
                assert_eq!(exercise_score(&exercise), expected, "factors at {i}, {j}");
            }
        }
    }

    #[test]
    fn test_no_factor_leaves_subtotal() {
        let exercise = Exercise::with_actions(
            3.0,
            vec![GradingAction::new(Operation::Subtract, 5.0)],
        );
        assert_eq!(exercise_score(&exercise), -2.0);
    }
}
