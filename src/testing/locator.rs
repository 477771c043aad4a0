//! Fixture resolution
//!
//! A test named `add` under root `tests/` is the pair `tests/add.mvm`
//! (interpreter input) and `tests/add.expect` (golden stdout).

use std::path::{Path, PathBuf};

use crate::common::config::LayoutConfig;
use crate::common::{Error, Result};

use super::strategy::ArgumentStrategy;

/// File-naming convention for a fixture pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub input_extension: String,
    pub expected_extension: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            input_extension: "mvm".to_string(),
            expected_extension: "expect".to_string(),
        }
    }
}

impl From<&LayoutConfig> for Layout {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            input_extension: config.input_extension.clone(),
            expected_extension: config.expected_extension.clone(),
        }
    }
}

impl Layout {
    /// Drop a trailing input or expected extension from a test name
    fn stem<'a>(&self, name: &'a str) -> &'a str {
        [&self.input_extension, &self.expected_extension]
            .iter()
            .find_map(|ext| {
                name.strip_suffix(ext.as_str())
                    .and_then(|rest| rest.strip_suffix('.'))
            })
            .unwrap_or(name)
    }
}

/// A fully resolved test: where its files are and how to invoke it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSpec {
    pub name: String,
    pub input_path: PathBuf,
    pub expected_path: PathBuf,
    pub argument_mode: ArgumentStrategy,
}

impl TestSpec {
    /// Same fixture, different argument strategy
    pub fn with_mode(self, argument_mode: ArgumentStrategy) -> Self {
        Self {
            argument_mode,
            ..self
        }
    }

    /// Argument vector for this test
    pub fn arguments(&self) -> Vec<String> {
        self.argument_mode.arguments(self)
    }
}

/// Derive the fixture paths for `name` without touching the filesystem
pub fn fixture_paths(root: &Path, name: &str, layout: &Layout) -> (String, PathBuf, PathBuf) {
    let stem = layout.stem(name);
    let input = root.join(format!("{stem}.{}", layout.input_extension));
    let expected = root.join(format!("{stem}.{}", layout.expected_extension));
    (stem.to_string(), input, expected)
}

/// Resolve a test name to its fixture pair
///
/// Fails with `NotFound` if either file is missing. The returned spec uses
/// the plain argument strategy.
pub fn resolve(root: &Path, name: &str, layout: &Layout) -> Result<TestSpec> {
    let (stem, input_path, expected_path) = fixture_paths(root, name, layout);

    for path in [&input_path, &expected_path] {
        if !path.is_file() {
            return Err(Error::not_found(path));
        }
    }

    Ok(TestSpec {
        name: stem,
        input_path,
        expected_path,
        argument_mode: ArgumentStrategy::Plain,
    })
}

/// List the names of all tests under `root` that have an input script
///
/// Names are sorted. Only the top level of `root` is searched. A test whose
/// expected file is missing is still listed and fails when resolved.
pub fn discover(root: &Path, layout: &Layout) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(Error::RootNotDirectory(root.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(layout.input_extension.as_str()) {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => names.push(stem.to_string()),
            None => tracing::warn!(path = %path.display(), "Skipping test with a non-UTF-8 name"),
        }
    }
    names.sort();

    tracing::debug!(root = %root.display(), count = names.len(), "Discovered tests");
    Ok(names)
}
