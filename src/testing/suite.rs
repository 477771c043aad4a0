//! Ordered collections of test cases
//!
//! A suite is data, not behavior: a root directory, an argument strategy and
//! a list of cases. Specializing a suite means changing one of the first two.

use std::path::{Path, PathBuf};

use crate::common::Result;

use super::locator::{self, Layout, TestSpec};
use super::strategy::{ArgumentStrategy, TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    name: String,
    description: Option<String>,
    root: PathBuf,
    strategy: ArgumentStrategy,
    cases: Vec<TestCase>,
}

impl Suite {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        strategy: ArgumentStrategy,
        cases: Vec<TestCase>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            root: root.into(),
            strategy,
            cases,
        }
    }

    /// Build a suite from every test found in `root`
    pub fn from_dir(root: &Path, strategy: ArgumentStrategy, layout: &Layout) -> Result<Self> {
        let cases = locator::discover(root, layout)?
            .into_iter()
            .map(TestCase::new)
            .collect();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Ok(Self::new(name, root, strategy, cases))
    }

    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Same cases and strategy under another directory
    pub fn with_root(self, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..self
        }
    }

    /// Same cases and directory with another argument strategy
    pub fn with_strategy(self, strategy: ArgumentStrategy) -> Self {
        Self { strategy, ..self }
    }

    /// Keep only the cases whose name contains `pattern`
    pub fn filtered(self, pattern: &str) -> Self {
        let cases = self
            .cases
            .into_iter()
            .filter(|case| case.name.contains(pattern))
            .collect();
        Self { cases, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn strategy(&self) -> ArgumentStrategy {
        self.strategy
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Resolve one case against this suite's root and strategy
    pub fn spec_for(&self, case: &TestCase, layout: &Layout) -> Result<TestSpec> {
        Ok(locator::resolve(&self.root, &case.name, layout)?.with_mode(self.strategy))
    }
}
