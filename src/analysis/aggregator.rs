//! Score aggregation and descriptive statistics.
//!
//! This module turns student score vectors into per-exercise columns and
//! computes summary statistics for each column.

use serde::{Deserialize, Serialize};

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 10;

/// Scores of all students, one column per exercise.
///
/// Column `i` holds every student's score for exercise `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseScores {
    columns: Vec<Vec<f64>>,
}

impl ExerciseScores {
    /// Transpose student score vectors into exercise columns.
    ///
    /// Students with more exercises than the shortest record are truncated
    /// to that length, so every column has one entry per student.
    pub fn from_students<'a, I>(students: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let rows: Vec<&[f64]> = students.into_iter().collect();
        let width = rows.iter().map(|r| r.len()).min().unwrap_or(0);

        let columns = (0..width)
            .map(|i| rows.iter().map(|r| r[i]).collect())
            .collect();

        Self { columns }
    }

    #[cfg(test)]
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Number of exercises.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of students contributing to each column.
    pub fn students(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }
}

/// Five-number summary used for box plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest value within `q1 - 1.5 * IQR`.
    pub whisker_low: f64,
    /// Highest value within `q3 + 1.5 * IQR`.
    pub whisker_high: f64,
    /// Values beyond the whiskers.
    pub outliers: Vec<f64>,
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins over their range.
    ///
    /// A degenerate range `[v, v]` is widened to `[v - 0.5, v + 0.5]`.
    /// The last bin includes its right edge.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut lo, mut hi) = min_max(values).unwrap_or((0.0, 1.0));
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0; bins];
        for &value in values {
            let index = ((value - lo) / width).floor() as usize;
            counts[index.min(bins - 1)] += 1;
        }

        Self { edges, counts }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Statistics of one exercise across the cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStatistics {
    /// 1-based exercise number.
    pub exercise: usize,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Mean absolute deviation from the mean.
    pub mean_deviation: f64,
    pub summary: BoxSummary,
    pub histogram: Histogram,
}

impl ExerciseStatistics {
    /// Returns `None` for an empty column.
    pub fn compute(exercise: usize, values: &[f64], bins: usize) -> Option<Self> {
        let (min, max) = min_max(values)?;
        let mean = mean(values);
        let mean_deviation = values.iter().map(|v| (v - mean).abs()).sum::<f64>() / values.len() as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            exercise,
            count: values.len(),
            min,
            max,
            mean,
            mean_deviation,
            summary: box_summary(&sorted),
            histogram: Histogram::new(values, bins),
        })
    }
}

/// Statistics of the whole cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortStatistics {
    pub students: usize,
    pub exercises: Vec<ExerciseStatistics>,
}

impl CohortStatistics {
    pub fn compute(scores: &ExerciseScores, bins: usize) -> Self {
        let exercises = scores
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(i, column)| ExerciseStatistics::compute(i + 1, column, bins))
            .collect();

        Self {
            students: scores.students(),
            exercises,
        }
    }

    /// Overall value range across all exercises.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.exercises.iter().fold(None, |acc, e| match acc {
            None => Some((e.min, e.max)),
            Some((lo, hi)) => Some((lo.min(e.min), hi.max(e.max))),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * p;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn box_summary(sorted: &[f64]) -> BoxSummary {
    let q1 = percentile(sorted, 0.25);
    let median = percentile(sorted, 0.5);
    let q3 = percentile(sorted, 0.75);
    let reach = 1.5 * (q3 - q1);

    let whisker_low = sorted
        .iter()
        .copied()
        .find(|&v| v >= q1 - reach)
        .unwrap_or(q1);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= q3 + reach)
        .unwrap_or(q3);

    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < whisker_low || v > whisker_high)
        .collect();

    BoxSummary {
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        outliers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_students_transposes() {
        let alice = [5.0, 3.0];
        let bob = [4.0, 6.0];
        let scores = ExerciseScores::from_students([&alice[..], &bob[..]]);

        assert_eq!(scores.columns(), &[vec![5.0, 4.0], vec![3.0, 6.0]]);
        assert_eq!(scores.students(), 2);
    }

    #[test]
    fn test_from_students_truncates_to_shortest() {
        let alice = [5.0, 3.0, 1.0];
        let bob = [4.0];
        let scores = ExerciseScores::from_students([&alice[..], &bob[..]]);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores.columns()[0], vec![5.0, 4.0]);
    }

    #[test]
    fn test_from_no_students() {
        let scores = ExerciseScores::from_students(Vec::<&[f64]>::new());
        assert!(scores.is_empty());
        assert_eq!(scores.students(), 0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.5), 2.5);
        assert_eq!(percentile(&sorted, 0.25), 1.75);
        assert_eq!(percentile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_box_summary_outliers() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 100.0];
        let summary = box_summary(&sorted);

        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.whisker_low, 1.0);
        assert_eq!(summary.whisker_high, 4.0);
        assert_eq!(summary.outliers, vec![100.0]);
    }

    #[test]
    fn test_histogram_bins() {
        let histogram = Histogram::new(&[0.0, 1.0, 2.0, 10.0], 10);

        assert_eq!(histogram.edges.len(), 11);
        assert_eq!(histogram.counts.iter().sum::<usize>(), 4);
        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.counts[9], 1);
        assert_eq!(histogram.max_count(), 1);
    }

    #[test]
    fn test_histogram_single_value() {
        let histogram = Histogram::new(&[5.0, 5.0], 2);
        assert_eq!(histogram.edges, vec![4.5, 5.0, 5.5]);
        assert_eq!(histogram.counts, vec![0, 2]);
    }

    #[test]
    fn test_cohort_statistics() {
        let scores = ExerciseScores::from_columns(vec![vec![4.0, 6.0], vec![3.0, 3.0]]);
        let stats = CohortStatistics::compute(&scores, DEFAULT_BINS);

        assert_eq!(stats.students, 2);
        assert_eq!(stats.exercises.len(), 2);
        assert_eq!(stats.exercises[0].exercise, 1);
        assert_eq!(stats.exercises[0].mean, 5.0);
        assert_eq!(stats.exercises[0].mean_deviation, 1.0);
        assert_eq!(stats.exercises[1].mean_deviation, 0.0);
        assert_eq!(stats.value_range(), Some((3.0, 6.0)));
    }
}
