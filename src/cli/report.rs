//! Human-readable report output

use colored::Colorize;

use crate::testing::{Expectation, FailureReason, Layout, Suite, SuiteReport, TestResult, Verdict};

pub fn print_suite_header(suite: &Suite) {
    println!(
        "\n{} {} {}",
        "Running Suite:".blue().bold(),
        suite.name().white().bold(),
        format!("({}, {} cases)", suite.strategy(), suite.cases().len()).dimmed()
    );
    if let Some(desc) = suite.description() {
        println!("  {}", desc.dimmed());
    }
}

pub fn print_result(result: &TestResult, verbose: bool) {
    let timing = format!("{}ms", result.duration_ms);

    if result.succeeded() {
        let note = match result.expect {
            Expectation::Fail => " (expected failure)",
            Expectation::Pass => "",
        };
        println!(
            "  {} {}{} {}",
            "✓".green(),
            result.name,
            note.dimmed(),
            timing.dimmed()
        );
        if verbose {
            if let Some(summary) = result.failure_summary() {
                println!("      {}", summary.dimmed());
            }
        }
        return;
    }

    let reason = match (result.expect, result.verdict) {
        (Expectation::Fail, Verdict::Pass) => "passed but was expected to fail".to_string(),
        _ => result
            .failure_summary()
            .unwrap_or_else(|| "failed".to_string()),
    };
    println!("  {} {}: {}", "✗".red(), result.name.bold(), reason);

    let Some(outcome) = &result.outcome else {
        return;
    };
    match outcome.reason {
        Some(FailureReason::LineMismatch | FailureReason::LengthMismatch) => {
            for line in &outcome.context {
                println!("      {}", line.dimmed());
            }
            if let Some(expected) = &outcome.expected_line {
                println!("    {} {}", "-".green(), expected.green());
            }
            if let Some(actual) = &outcome.actual_line {
                println!("    {} {}", "+".red(), actual.red());
            }
        }
        Some(FailureReason::StderrNonEmpty) if verbose => {
            for line in outcome.stderr.as_deref().unwrap_or("").lines() {
                println!("    {} {}", "!".yellow(), line);
            }
        }
        _ => {}
    }
}

pub fn print_suite_footer(report: &SuiteReport) {
    let line = format!("Passed: {}, Failed: {}", report.passed(), report.failed());
    if report.all_succeeded() {
        println!("  {}", line.green());
    } else {
        println!("  {}", line.red());
    }
}

pub fn print_totals(reports: &[SuiteReport]) {
    let passed: usize = reports.iter().map(SuiteReport::passed).sum();
    let failed: usize = reports.iter().map(SuiteReport::failed).sum();

    if failed == 0 {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            format!("All {passed} tests passed").green().bold()
        );
    } else {
        println!(
            "\n{} {}\n",
            "✗".red().bold(),
            format!("{failed} failed, {passed} passed").red().bold()
        );
    }
}

pub fn print_listing(suite: &Suite, layout: &Layout) {
    println!(
        "{} {}",
        suite.name().white().bold(),
        format!("({}, {})", suite.strategy(), suite.root().display()).dimmed()
    );
    for case in suite.cases() {
        let marker = match case.expect {
            Expectation::Pass => "",
            Expectation::Fail => " [expect fail]",
        };
        match suite.spec_for(case, layout) {
            Ok(spec) => println!(
                "  {}{}  {}",
                case.name,
                marker.yellow(),
                spec.arguments().join(" ").dimmed()
            ),
            Err(e) => println!("  {}{}  {}", case.name, marker.yellow(), e.to_string().red()),
        }
    }
}
