//! Test runner implementation
//!
//! Runs the interpreter for each case and checks its output against the
//! golden file. A case that cannot be run at all (missing fixture, launch
//! failure, timeout) is recorded as a failed result; the suite carries on.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::compare::{self, ComparisonOutcome, Verdict};
use super::locator::{Layout, TestSpec};
use super::process;
use super::strategy::{ArgumentStrategy, Expectation, TestCase};
use super::suite::Suite;

/// Everything a run needs besides the test itself
#[derive(Debug, Clone)]
pub struct RunContext {
    pub executable: PathBuf,
    pub timeout: Option<Duration>,
    pub enforce_exit_code: bool,
    pub layout: Layout,
}

impl RunContext {
    /// Context with the default layout, no timeout, exit codes ignored
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            enforce_exit_code: false,
            layout: Layout::default(),
        }
    }

    /// Build a context from configuration, resolving the interpreter path
    pub fn from_config(config: &Config) -> Result<Self> {
        let executable = process::resolve_executable(&config.vm.executable)?;
        let timeout = match config.vm.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self {
            executable,
            timeout,
            enforce_exit_code: config.vm.enforce_exit_code,
            layout: Layout::from(&config.layout),
        })
    }
}

/// Run one resolved test and compare its output
///
/// stderr is checked first: any stderr output fails the test regardless of
/// stdout. Exit status only matters when `enforce_exit_code` is set, and
/// only once stdout has matched.
pub async fn run_test_case(ctx: &RunContext, spec: &TestSpec) -> Result<ComparisonOutcome> {
    for path in [&spec.input_path, &spec.expected_path] {
        if !path.is_file() {
            return Err(Error::not_found(path));
        }
    }

    let args = spec.arguments();
    let result = process::run(&ctx.executable, &args, ctx.timeout).await?;

    if let Some(outcome) = compare::check_stderr(&result.stderr_text()) {
        return Ok(outcome);
    }

    let file = File::open(&spec.expected_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::not_found(&spec.expected_path),
        _ => Error::file_read(&spec.expected_path, &e),
    })?;
    let mut expected = ExpectedLines::new(BufReader::new(file));

    let outcome = compare::compare(result.stdout_lines(), &mut expected);

    if let Some(e) = expected.error.take() {
        return Err(Error::file_read(&spec.expected_path, &e));
    }

    if ctx.enforce_exit_code && outcome.passed() && !result.success() {
        return Ok(ComparisonOutcome::non_zero_exit(result.exit_code));
    }

    Ok(outcome)
}

/// Lines of the golden file, read lazily as raw bytes
///
/// Lines are split the same way as captured stdout. A read error ends the
/// iteration and is kept so that the caller can tell it apart from a
/// genuinely short file.
struct ExpectedLines<R> {
    lines: io::Split<R>,
    error: Option<io::Error>,
}

impl<R: BufRead> ExpectedLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            error: None,
        }
    }
}

impl<R: BufRead> Iterator for ExpectedLines<R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        match self.lines.next()? {
            Ok(mut line) => {
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Some(line)
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }
}

/// Error recorded for a case that could not be run
#[derive(Debug, Clone, Serialize)]
pub struct CaseError {
    pub code: &'static str,
    pub message: String,
}

impl From<&Error> for CaseError {
    fn from(e: &Error) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Result of one case within a suite
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub expect: Expectation,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ComparisonOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CaseError>,
    pub duration_ms: u64,
}

impl TestResult {
    fn from_outcome(case: &TestCase, outcome: Result<ComparisonOutcome>, elapsed: Duration) -> Self {
        let (verdict, outcome, error) = match outcome {
            Ok(outcome) => (outcome.verdict, Some(outcome), None),
            Err(e) => (Verdict::Fail, None, Some(CaseError::from(&e))),
        };
        Self {
            name: case.name.clone(),
            expect: case.expect,
            verdict,
            outcome,
            error,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    /// Whether the verdict is the one the case expected
    ///
    /// A case that could not be run never succeeds, even if it expected to
    /// fail.
    pub fn succeeded(&self) -> bool {
        if self.error.is_some() {
            return false;
        }
        matches!(
            (self.expect, self.verdict),
            (Expectation::Pass, Verdict::Pass) | (Expectation::Fail, Verdict::Fail)
        )
    }

    /// One-line description of why the case failed, if it did
    pub fn failure_summary(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.message.clone());
        }
        self.outcome
            .as_ref()
            .filter(|o| !o.passed())
            .map(ComparisonOutcome::summary)
    }
}

/// Aggregated results of one suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub strategy: ArgumentStrategy,
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    /// Cases whose verdict matched their expectation
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Resolve and run a single case of `suite`
pub async fn run_case(ctx: &RunContext, suite: &Suite, case: &TestCase) -> TestResult {
    let started = Instant::now();
    let outcome = match suite.spec_for(case, &ctx.layout) {
        Ok(spec) => run_test_case(ctx, &spec).await,
        Err(e) => Err(e),
    };
    let result = TestResult::from_outcome(case, outcome, started.elapsed());

    match result.failure_summary() {
        Some(summary) if !result.succeeded() => {
            tracing::info!(suite = suite.name(), case = %case.name, %summary, "Test failed")
        }
        _ => tracing::info!(
            suite = suite.name(),
            case = %case.name,
            verdict = ?result.verdict,
            "Test finished"
        ),
    }
    result
}

/// Run every case of `suite` in order
///
/// `on_result` sees each result as soon as its case finishes.
pub async fn run_suite(
    ctx: &RunContext,
    suite: &Suite,
    mut on_result: impl FnMut(&TestResult),
) -> SuiteReport {
    tracing::debug!(
        suite = suite.name(),
        root = %suite.root().display(),
        strategy = %suite.strategy(),
        cases = suite.cases().len(),
        "Running suite"
    );

    let mut results = Vec::with_capacity(suite.cases().len());
    for case in suite.cases() {
        let result = run_case(ctx, suite, case).await;
        on_result(&result);
        results.push(result);
    }

    SuiteReport {
        suite: suite.name().to_string(),
        strategy: suite.strategy(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::compare::FailureReason;

    #[test]
    fn test_expected_lines_strip_terminators() {
        let lines: Vec<Vec<u8>> = ExpectedLines::new(io::Cursor::new("1\r\n2\n3\n")).collect();
        assert_eq!(lines, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    }

    #[test]
    fn test_expected_lines_keep_invalid_utf8() {
        let mut lines = ExpectedLines::new(io::Cursor::new(vec![b'o', b'k', b'\n', 0xff, b'\n']));
        assert_eq!(lines.next(), Some(b"ok".to_vec()));
        assert_eq!(lines.next(), Some(vec![0xff]));
        assert_eq!(lines.next(), None);
        assert!(lines.error.is_none());
    }

    struct BrokenReader;

    impl io::Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn test_expected_lines_keep_read_error() {
        use std::io::Read;

        let reader = BufReader::new(io::Cursor::new(b"ok\n".to_vec()).chain(BrokenReader));
        let mut lines = ExpectedLines::new(reader);
        assert_eq!(lines.next(), Some(b"ok".to_vec()));
        assert_eq!(lines.next(), None);
        assert!(lines.error.is_some());
    }

    fn result(expect: Expectation, verdict: Verdict) -> TestResult {
        TestResult {
            name: "t".to_string(),
            expect,
            verdict,
            outcome: None,
            error: None,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_expected_failure_counts_as_success() {
        assert!(result(Expectation::Pass, Verdict::Pass).succeeded());
        assert!(result(Expectation::Fail, Verdict::Fail).succeeded());
        assert!(!result(Expectation::Fail, Verdict::Pass).succeeded());
        assert!(!result(Expectation::Pass, Verdict::Fail).succeeded());
    }

    #[test]
    fn test_error_never_satisfies_expected_failure() {
        let case = TestCase::expect_fail("missing");
        let err = Error::not_found(std::path::Path::new("t/missing.mvm"));
        let result = TestResult::from_outcome(&case, Err(err), Duration::ZERO);
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(!result.succeeded());
    }

    #[test]
    fn test_report_counts() {
        let report = SuiteReport {
            suite: "s".to_string(),
            strategy: ArgumentStrategy::Plain,
            results: vec![
                result(Expectation::Pass, Verdict::Pass),
                result(Expectation::Pass, Verdict::Fail),
                result(Expectation::Fail, Verdict::Fail),
            ],
        };
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_error_becomes_failed_result() {
        let case = TestCase::new("add");
        let err = Error::not_found(std::path::Path::new("t/add.expect"));
        let result = TestResult::from_outcome(&case, Err(err), Duration::ZERO);
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.error.as_ref().map(|e| e.code), Some("NOT_FOUND"));
        assert_eq!(
            result.failure_summary().as_deref(),
            Some("Fixture file not found: t/add.expect")
        );
    }

    #[test]
    fn test_outcome_summary_used_for_failures() {
        let case = TestCase::new("add");
        let outcome = compare::compare(["4"], ["3"]);
        let result = TestResult::from_outcome(&case, Ok(outcome), Duration::ZERO);
        assert_eq!(
            result.outcome.as_ref().and_then(|o| o.reason),
            Some(FailureReason::LineMismatch)
        );
        assert!(result.failure_summary().unwrap().starts_with("line mismatch"));
    }

    #[tokio::test]
    async fn test_missing_input_detected_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("add.expect"), "3\n").unwrap();
        let spec = TestSpec {
            name: "add".to_string(),
            input_path: dir.path().join("add.mvm"),
            expected_path: dir.path().join("add.expect"),
            argument_mode: ArgumentStrategy::Plain,
        };
        // The executable is never reached
        let ctx = RunContext::new("/nonexistent/mvm");
        let err = run_test_case(&ctx, &spec).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
