//! Golden output comparison
//!
//! Actual and expected output are walked line by line in lockstep and the
//! walk stops at the first divergence. Lines are compared as raw bytes, with
//! no trimming and no UTF-8 decoding; text only appears in diagnostics.
//! The console prompt that some platforms print when a process pauses for a
//! keypress is not program output and is dropped from the actual side
//! wherever it appears.

use std::collections::VecDeque;

use serde::Serialize;

/// Console text printed by a paused process waiting for a keypress
pub const PRESS_ANY_KEY: &str = "Press any key to continue . . . ";

/// Matched lines kept for failure messages
const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Both sides have a line at this index and they differ
    LineMismatch,
    /// One side ran out of lines before the other
    LengthMismatch,
    /// The interpreter wrote to stderr
    StderrNonEmpty,
    /// The interpreter exited with a nonzero status (only when enforced)
    NonZeroExit,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FailureReason::LineMismatch => "line mismatch",
            FailureReason::LengthMismatch => "length mismatch",
            FailureReason::StderrNonEmpty => "stderr not empty",
            FailureReason::NonZeroExit => "nonzero exit status",
        };
        f.write_str(text)
    }
}

/// Result of checking one interpreter run against its golden file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    pub verdict: Verdict,
    /// 0-based index of the first unmatched line
    pub failing_line_index: Option<usize>,
    pub actual_line: Option<String>,
    pub expected_line: Option<String>,
    pub reason: Option<FailureReason>,
    /// Last matched lines before the divergence, oldest first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// Full stderr text for `StderrNonEmpty`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    /// Exit status for `NonZeroExit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ComparisonOutcome {
    pub fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            failing_line_index: None,
            actual_line: None,
            expected_line: None,
            reason: None,
            context: Vec::new(),
            stderr: None,
            exit_code: None,
        }
    }

    fn fail(reason: FailureReason) -> Self {
        Self {
            verdict: Verdict::Fail,
            reason: Some(reason),
            ..Self::pass()
        }
    }

    pub fn stderr_non_empty(stderr: impl Into<String>) -> Self {
        Self {
            stderr: Some(stderr.into()),
            ..Self::fail(FailureReason::StderrNonEmpty)
        }
    }

    /// `exit_code` is `None` when the interpreter was killed by a signal
    pub fn non_zero_exit(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            ..Self::fail(FailureReason::NonZeroExit)
        }
    }

    fn divergence(
        reason: FailureReason,
        index: usize,
        actual: Option<&[u8]>,
        expected: Option<&[u8]>,
        context: VecDeque<String>,
    ) -> Self {
        Self {
            failing_line_index: Some(index),
            actual_line: actual.map(lossy),
            expected_line: expected.map(lossy),
            context: context.into(),
            ..Self::fail(reason)
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// One-line human description of the failure
    pub fn summary(&self) -> String {
        let Some(reason) = self.reason else {
            return "passed".to_string();
        };
        match reason {
            FailureReason::StderrNonEmpty => {
                let stderr = self.stderr.as_deref().unwrap_or("").trim_end();
                format!("{reason}: {stderr}")
            }
            FailureReason::NonZeroExit => match self.exit_code {
                Some(code) => format!("{reason}: exited with {code}"),
                None => format!("{reason}: terminated by signal"),
            },
            FailureReason::LineMismatch | FailureReason::LengthMismatch => {
                let line = self.failing_line_index.map_or(0, |i| i + 1);
                format!(
                    "{reason} at line {line}: expected {}, got {}",
                    describe(self.expected_line.as_deref()),
                    describe(self.actual_line.as_deref()),
                )
            }
        }
    }
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

fn describe(line: Option<&str>) -> String {
    match line {
        Some(line) => format!("{line:?}"),
        None => "end of output".to_string(),
    }
}

/// Fail if the interpreter wrote anything at all to stderr
///
/// Checked before stdout is compared. The full stderr text is kept.
pub fn check_stderr(stderr: &str) -> Option<ComparisonOutcome> {
    if stderr.is_empty() {
        None
    } else {
        Some(ComparisonOutcome::stderr_non_empty(stderr))
    }
}

/// Split captured output into lines
///
/// `\n` ends a line and a `\r` before it is dropped. A final terminator does
/// not start another line, so `b"1\n2\n"` and `b"1\r\n2"` both give two
/// lines and empty output gives none.
pub fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let lines = (!bytes.is_empty()).then(|| body.split(|b| *b == b'\n'));
    lines
        .into_iter()
        .flatten()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Compare actual output lines against expected lines
///
/// Both sides are consumed lazily and consumption stops at the first
/// divergence, so neither needs to be buffered. Lines may be text or raw
/// bytes; equality is byte equality either way.
pub fn compare<A, E>(actual: A, expected: E) -> ComparisonOutcome
where
    A: IntoIterator,
    A::Item: AsRef<[u8]>,
    E: IntoIterator,
    E::Item: AsRef<[u8]>,
{
    let mut actual = actual
        .into_iter()
        .filter(|line| line.as_ref() != PRESS_ANY_KEY.as_bytes());
    let mut expected = expected.into_iter();
    let mut context = VecDeque::with_capacity(CONTEXT_LINES);
    let mut index = 0;

    loop {
        let (a, e) = match (actual.next(), expected.next()) {
            (None, None) => return ComparisonOutcome::pass(),
            (Some(a), None) => {
                return ComparisonOutcome::divergence(
                    FailureReason::LengthMismatch,
                    index,
                    Some(a.as_ref()),
                    None,
                    context,
                )
            }
            (None, Some(e)) => {
                return ComparisonOutcome::divergence(
                    FailureReason::LengthMismatch,
                    index,
                    None,
                    Some(e.as_ref()),
                    context,
                )
            }
            (Some(a), Some(e)) => (a, e),
        };

        if a.as_ref() != e.as_ref() {
            return ComparisonOutcome::divergence(
                FailureReason::LineMismatch,
                index,
                Some(a.as_ref()),
                Some(e.as_ref()),
                context,
            );
        }

        if context.len() == CONTEXT_LINES {
            context.pop_front();
        }
        context.push_back(lossy(e.as_ref()));
        index += 1;
    }
}
