//! MathVM regression runner
//!
//! Runs an interpreter executable over a directory of `.mvm` scripts and
//! compares what it prints with golden `.expect` files.

pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{ArgumentStrategy, ComparisonOutcome, RunContext, Suite, TestCase};
