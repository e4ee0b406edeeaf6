//! Errors raised while reading grading annotations.

use std::num::ParseFloatError;
use thiserror::Error;

/// Problems with the annotations of a single review file.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("grading action `~({marker})` appears before any exercise start")]
    ActionBeforeExercise { marker: String },

    #[error("unknown grading operator in `~({marker})`")]
    UnknownOperator { marker: String },

    #[error("`{value}` in `~({marker})` is not a number")]
    InvalidNumber {
        marker: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("`{value}` in `~({marker})` is not a finite number")]
    NonFiniteNumber { marker: String, value: String },
}
