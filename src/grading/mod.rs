//! Annotation parsing and point calculation.
//!
//! Review files carry `~(...)` markers. The parser turns them into
//! exercises and the calculator reduces those to points.

pub mod calculator;
pub mod error;
pub mod parser;

pub use calculator::*;
pub use parser::parse_student;
