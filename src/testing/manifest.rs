//! Suite manifest types
//!
//! Defines the data structures for deserializing YAML suite manifests.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::paths::resolve_relative;
use crate::common::{Error, Result};

use super::locator::Layout;
use super::strategy::{ArgumentStrategy, Expectation, TestCase};
use super::suite::Suite;

/// A suite loaded from a YAML file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SuiteManifest {
    /// Suite name (defaults to the manifest file stem)
    pub name: Option<String>,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// Directory holding the fixtures, relative to the manifest file
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Argument strategy shared by every case
    #[serde(default)]
    pub strategy: ArgumentStrategy,
    /// Cases in run order; every fixture in `root` when omitted
    pub tests: Option<Vec<CaseEntry>>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// A case is either a bare name or a name with an expectation
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum CaseEntry {
    Name(String),
    Detailed(CaseDetail),
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct CaseDetail {
    pub name: String,
    #[serde(default)]
    pub expect: Expectation,
}

impl From<CaseEntry> for TestCase {
    fn from(entry: CaseEntry) -> Self {
        match entry {
            CaseEntry::Name(name) => TestCase::new(name),
            CaseEntry::Detailed(detail) => TestCase {
                name: detail.name,
                expect: detail.expect,
            },
        }
    }
}

impl SuiteManifest {
    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Manifest {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Turn the manifest into a suite, resolving `root` against `base_dir`
    pub fn into_suite(self, fallback_name: &str, base_dir: &Path, layout: &Layout) -> Result<Suite> {
        let root = resolve_relative(base_dir, &self.root);
        let name = self.name.unwrap_or_else(|| fallback_name.to_string());

        let suite = match self.tests {
            Some(entries) => {
                let cases = entries.into_iter().map(TestCase::from).collect();
                Suite::new(name, root, self.strategy, cases)
            }
            None => {
                let discovered = Suite::from_dir(&root, self.strategy, layout)?;
                Suite::new(name, root, self.strategy, discovered.cases().to_vec())
            }
        };
        Ok(suite.with_description(self.description))
    }
}

/// Load a suite from a manifest file or, for a directory, from its fixtures
pub fn load_suite(path: &Path, layout: &Layout) -> Result<Suite> {
    if path.is_dir() {
        return Suite::from_dir(path, ArgumentStrategy::Plain, layout);
    }

    let manifest = SuiteManifest::load(path)?;
    let fallback_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "suite".to_string());
    let base_dir = path.parent().unwrap_or(Path::new("."));
    manifest.into_suite(&fallback_name, base_dir, layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_entries() {
        let manifest = SuiteManifest::parse(
            r#"
name: interpreter-native
description: Native execution mode
root: native
strategy: native
tests:
  - add
  - name: div_by_zero
    expect: fail
"#,
            Path::new("native.yaml"),
        )
        .unwrap();

        let suite = manifest
            .into_suite("native", Path::new("/suites"), &Layout::default())
            .unwrap();
        assert_eq!(suite.name(), "interpreter-native");
        assert_eq!(suite.description(), Some("Native execution mode"));
        assert_eq!(suite.root(), Path::new("/suites/native"));
        assert_eq!(suite.strategy(), ArgumentStrategy::Native);
        assert_eq!(
            suite.cases(),
            &[TestCase::new("add"), TestCase::expect_fail("div_by_zero")]
        );
    }

    #[test]
    fn test_defaults() {
        let manifest = SuiteManifest::parse("tests: [loop]\n", Path::new("core.yaml")).unwrap();
        let suite = manifest
            .into_suite("core", Path::new("/suites"), &Layout::default())
            .unwrap();
        assert_eq!(suite.name(), "core");
        assert_eq!(suite.root(), Path::new("/suites/."));
        assert_eq!(suite.strategy(), ArgumentStrategy::Plain);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SuiteManifest::parse("strategy: plain\nargs: [-x]\n", Path::new("bad.yaml"))
            .unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(SuiteManifest::parse("strategy: jit\n", Path::new("bad.yaml")).is_err());
    }

    #[test]
    fn test_missing_tests_discovers_root() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = dir.path().join("cases");
        std::fs::create_dir(&fixtures).unwrap();
        for file in ["b.mvm", "b.expect", "a.mvm", "a.expect"] {
            std::fs::write(fixtures.join(file), "").unwrap();
        }
        let manifest_path = dir.path().join("all.yaml");
        std::fs::write(&manifest_path, "root: cases\n").unwrap();

        let suite = load_suite(&manifest_path, &Layout::default()).unwrap();
        assert_eq!(suite.name(), "all");
        let names: Vec<&str> = suite.cases().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
