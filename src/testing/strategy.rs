//! Argument strategies and test case parameters

use serde::{Deserialize, Serialize};

use super::locator::TestSpec;

/// Flag asking the interpreter for native (non-interpreted) execution
pub const NATIVE_FLAG: &str = "-native";

/// Flag suppressing interactive prompts in the interpreter
pub const SILENT_FLAG: &str = "-silent";

/// How the argument vector for a test is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentStrategy {
    /// `<input>`
    #[default]
    Plain,
    /// `<input> -native -silent`
    Native,
}

impl ArgumentStrategy {
    /// Build the arguments passed to the interpreter for `spec`
    ///
    /// The input path is always the single positional argument.
    pub fn arguments(self, spec: &TestSpec) -> Vec<String> {
        let mut args = vec![spec.input_path.to_string_lossy().into_owned()];
        if self == ArgumentStrategy::Native {
            args.push(NATIVE_FLAG.to_string());
            args.push(SILENT_FLAG.to_string());
        }
        args
    }
}

impl std::fmt::Display for ArgumentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentStrategy::Plain => write!(f, "plain"),
            ArgumentStrategy::Native => write!(f, "native"),
        }
    }
}

/// Verdict a test case is expected to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    #[default]
    Pass,
    Fail,
}

/// One named test in a suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub expect: Expectation,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expect: Expectation::Pass,
        }
    }

    /// A case that is known to fail (e.g. a regression not fixed yet)
    pub fn expect_fail(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expect: Expectation::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(mode: ArgumentStrategy) -> TestSpec {
        TestSpec {
            name: "add".to_string(),
            input_path: PathBuf::from("tests/add.mvm"),
            expected_path: PathBuf::from("tests/add.expect"),
            argument_mode: mode,
        }
    }

    #[test]
    fn test_plain_passes_only_input() {
        assert_eq!(spec(ArgumentStrategy::Plain).arguments(), vec!["tests/add.mvm"]);
    }

    #[test]
    fn test_native_appends_mode_and_silent_flags() {
        assert_eq!(
            spec(ArgumentStrategy::Native).arguments(),
            vec!["tests/add.mvm", "-native", "-silent"]
        );
    }

    #[test]
    fn test_strategy_does_not_touch_paths() {
        let plain = spec(ArgumentStrategy::Plain);
        let native = plain.clone().with_mode(ArgumentStrategy::Native);
        assert_eq!(plain.input_path, native.input_path);
        assert_eq!(plain.expected_path, native.expected_path);
    }

    #[test]
    fn test_strategy_names() {
        let native: ArgumentStrategy = serde_yaml::from_str("native").unwrap();
        assert_eq!(native, ArgumentStrategy::Native);
        assert_eq!(ArgumentStrategy::Plain.to_string(), "plain");
    }
}
