//! Shared test utilities for rapport.
//!
//! Fixture builders used by unit, integration and property tests.

pub mod fixtures;

/// Table-driven test case structure.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

/// Run table-driven tests, naming the failing case.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, test_fn: F)
where
    I: std::fmt::Debug,
    E: std::fmt::Debug + PartialEq,
    F: Fn(I) -> E,
{
    for case in cases {
        println!("[TEST] Running: {} ({:?})", case.name, case.input);
        let actual = test_fn(case.input);
        assert_eq!(actual, case.expected, "Test '{}' failed", case.name);
    }
}
