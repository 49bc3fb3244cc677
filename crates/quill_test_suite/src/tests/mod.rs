//! Regression test cases organized by category

pub mod curves;
pub mod fills;

use crate::runner::TestSuite;

/// Create all test suites
pub fn all_suites() -> Vec<TestSuite> {
    vec![
        fills::suite(),
        strokes::suite(),
        curves::suite(),
        stream::suite(),
    ]
}
