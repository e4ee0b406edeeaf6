//! Cohort statistics.
//!
//! Collects the per-exercise score columns of all graded students and
//! computes the descriptive statistics the reports are drawn from.

pub mod aggregator;

pub use aggregator::*;
