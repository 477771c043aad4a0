//! CLI command definitions
//!
//! Defines the clap commands for the regression runner.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Interpreter executable, overriding the configuration
    #[arg(long, short = 'e', global = true)]
    pub executable: Option<PathBuf>,

    /// Per-test timeout in seconds (0 disables)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Fail tests whose interpreter exits with a nonzero status
    #[arg(long, global = true)]
    pub enforce_exit_code: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one or more suites (YAML manifests or fixture directories)
    Run {
        /// Suite manifests or directories of fixtures
        #[arg(required = true)]
        suites: Vec<PathBuf>,

        /// Run every suite in native mode
        #[arg(long)]
        native: bool,

        /// Only run cases whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Run a single test case
    Case {
        /// Test name, e.g. `add` for add.mvm / add.expect
        name: String,

        /// Directory holding the fixtures (default: configured tests root)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Run in native mode
        #[arg(long)]
        native: bool,

        /// The case is expected to fail
        #[arg(long)]
        expect_fail: bool,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the cases of one or more suites without running them
    List {
        /// Suite manifests or directories of fixtures
        #[arg(required = true)]
        suites: Vec<PathBuf>,

        /// Show argument vectors for native mode
        #[arg(long)]
        native: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable, colored
    #[default]
    Text,
    /// One JSON document with every suite report
    Json,
}
