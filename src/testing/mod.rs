//! Golden-file regression engine
//!
//! Resolves fixtures, runs the interpreter on them and compares its stdout
//! with the expected file. Suites are plain data driven through
//! [`run_suite`] or, one case at a time, [`run_test_case`].

pub mod compare;
pub mod locator;
pub mod manifest;
pub mod process;
pub mod runner;
pub mod strategy;
pub mod suite;

pub use compare::{
    check_stderr, compare, split_lines, ComparisonOutcome, FailureReason, Verdict, PRESS_ANY_KEY,
};
pub use locator::{discover, resolve, Layout, TestSpec};
pub use manifest::{load_suite, SuiteManifest};
pub use process::{run, RunResult};
pub use runner::{run_case, run_suite, run_test_case, RunContext, SuiteReport, TestResult};
pub use strategy::{ArgumentStrategy, Expectation, TestCase, NATIVE_FLAG, SILENT_FLAG};
pub use suite::Suite;
