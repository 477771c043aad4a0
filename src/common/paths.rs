//! Platform configuration paths
//!
//! - Linux: `~/.config/mvm-regress/`
//! - macOS: `~/Library/Application Support/mvm-regress/`
//! - Windows: `%APPDATA%\mvm-regress\`

use std::path::{Path, PathBuf};

/// Name used for the per-user configuration directory
const APP_NAME: &str = "mvm-regress";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.toml"));
        }
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/suites");
        assert_eq!(
            resolve_relative(base, Path::new("native")),
            PathBuf::from("/suites/native")
        );
        assert_eq!(
            resolve_relative(base, Path::new("/abs/tests")),
            PathBuf::from("/abs/tests")
        );
    }
}
