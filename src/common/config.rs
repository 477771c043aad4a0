//! Configuration file handling
//!
//! Replaces hardcoded default directories with an explicit structure that is
//! passed down to suites. Command-line flags override file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Interpreter settings
    #[serde(default)]
    pub vm: VmConfig,

    /// Fixture layout settings
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Settings for the interpreter under test
#[derive(Debug, Deserialize, Clone)]
pub struct VmConfig {
    /// Path to the interpreter, or a bare name looked up on PATH
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Per-test timeout; 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Fail tests whose interpreter exits with a nonzero status
    #[serde(default)]
    pub enforce_exit_code: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            timeout_secs: default_timeout(),
            enforce_exit_code: false,
        }
    }
}

fn default_executable() -> PathBuf {
    PathBuf::from("mvm")
}

fn default_timeout() -> u64 {
    10
}

/// Where fixtures live and how their files are named
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    /// Extension of interpreter input scripts
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Extension of golden output files
    #[serde(default = "default_expected_extension")]
    pub expected_extension: String,

    /// Default test root for `case` when `--root` is not given
    #[serde(default = "default_tests_root")]
    pub tests_root: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            input_extension: default_input_extension(),
            expected_extension: default_expected_extension(),
            tests_root: default_tests_root(),
        }
    }
}

fn default_input_extension() -> String {
    "mvm".to_string()
}

fn default_expected_extension() -> String {
    "expect".to_string()
}

fn default_tests_root() -> PathBuf {
    PathBuf::from("tests")
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// used if present, and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file '{}' does not exist",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        if let Some(path) = config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        if layout.input_extension.is_empty() || layout.expected_extension.is_empty() {
            return Err(Error::Config("File extensions must not be empty".to_string()));
        }
        if layout.input_extension == layout.expected_extension {
            return Err(Error::Config(format!(
                "Input and expected extensions are both '{}'",
                layout.input_extension
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.vm.executable, PathBuf::from("mvm"));
        assert_eq!(config.vm.timeout_secs, 10);
        assert!(!config.vm.enforce_exit_code);
        assert_eq!(config.layout.input_extension, "mvm");
        assert_eq!(config.layout.expected_extension, "expect");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
[vm]
executable = "build/mvm"
enforce_exit_code = true

[layout]
expected_extension = "out"
"#,
        )
        .unwrap();
        assert_eq!(config.vm.executable, PathBuf::from("build/mvm"));
        assert_eq!(config.vm.timeout_secs, 10);
        assert!(config.vm.enforce_exit_code);
        assert_eq!(config.layout.input_extension, "mvm");
        assert_eq!(config.layout.expected_extension, "out");
    }

    #[test]
    fn test_same_extensions_rejected() {
        let err = Config::parse("[layout]\ninput_extension = \"txt\"\nexpected_extension = \"txt\"\n")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Config::parse("[vm\nexecutable = 1"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mvm-regress.toml"))).unwrap_err();
        assert!(err.is_usage());
    }
}
