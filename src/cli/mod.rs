//! CLI command handling
//!
//! Loads configuration and suites, runs them and prints reports.

mod report;

use std::path::{Path, PathBuf};

use crate::commands::{Commands, GlobalArgs, OutputFormat};
use crate::common::config::Config;
use crate::common::Result;
use crate::testing::{
    load_suite, run_suite, ArgumentStrategy, Layout, RunContext, Suite, SuiteReport, TestCase,
};

/// Dispatch a CLI command
///
/// Returns whether every case met its expectation.
pub async fn dispatch(global: &GlobalArgs, command: Commands) -> Result<bool> {
    let config = load_config(global)?;
    let layout = Layout::from(&config.layout);

    match command {
        Commands::Run {
            suites,
            native,
            filter,
            format,
        } => {
            let suites = load_suites(&suites, &layout, native, filter.as_deref())?;
            let ctx = RunContext::from_config(&config)?;
            run_suites(&ctx, &suites, format, global.verbose).await
        }

        Commands::Case {
            name,
            root,
            native,
            expect_fail,
            format,
        } => {
            let root = root.unwrap_or_else(|| config.layout.tests_root.clone());
            let case = if expect_fail {
                TestCase::expect_fail(name)
            } else {
                TestCase::new(name)
            };
            let suite = Suite::new(root.display().to_string(), root, strategy(native), vec![case]);
            let ctx = RunContext::from_config(&config)?;
            run_suites(&ctx, &[suite], format, global.verbose).await
        }

        Commands::List { suites, native } => {
            for suite in load_suites(&suites, &layout, native, None)? {
                report::print_listing(&suite, &layout);
            }
            Ok(true)
        }
    }
}

/// Load the config file and apply command-line overrides
fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = Config::load(global.config.as_deref())?;
    if let Some(executable) = &global.executable {
        config.vm.executable = executable.clone();
    }
    if let Some(timeout) = global.timeout {
        config.vm.timeout_secs = timeout;
    }
    if global.enforce_exit_code {
        config.vm.enforce_exit_code = true;
    }
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

fn strategy(native: bool) -> ArgumentStrategy {
    if native {
        ArgumentStrategy::Native
    } else {
        ArgumentStrategy::Plain
    }
}

fn load_suites(
    paths: &[PathBuf],
    layout: &Layout,
    native: bool,
    filter: Option<&str>,
) -> Result<Vec<Suite>> {
    paths
        .iter()
        .map(|path| load_one(path, layout, native, filter))
        .collect()
}

fn load_one(path: &Path, layout: &Layout, native: bool, filter: Option<&str>) -> Result<Suite> {
    let mut suite = load_suite(path, layout)?;
    if native {
        suite = suite.with_strategy(ArgumentStrategy::Native);
    }
    if let Some(pattern) = filter {
        suite = suite.filtered(pattern);
    }
    Ok(suite)
}

async fn run_suites(
    ctx: &RunContext,
    suites: &[Suite],
    format: OutputFormat,
    verbose: bool,
) -> Result<bool> {
    let text = format == OutputFormat::Text;
    let mut reports: Vec<SuiteReport> = Vec::with_capacity(suites.len());

    for suite in suites {
        if text {
            report::print_suite_header(suite);
        }
        let suite_report = run_suite(ctx, suite, |result| {
            if text {
                report::print_result(result, verbose);
            }
        })
        .await;
        if text {
            report::print_suite_footer(&suite_report);
        }
        reports.push(suite_report);
    }

    match format {
        OutputFormat::Text => report::print_totals(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    Ok(reports.iter().all(SuiteReport::all_succeeded))
}
