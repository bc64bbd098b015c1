//! Persisted defaults and the options derived from them
//!
//! The configuration file is read once at startup into a [`ResolvedConfig`]
//! which is then passed explicitly to everything that needs it.

pub mod store;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use store::{config_dir, ConfigStore};

/// Names that cannot be used as project names (compared case-insensitively)
pub const DEFAULT_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "bin", "boot",
    "dev", "etc", "lib", "lib64", "proc", "run", "sbin", "srv", "sys", "tmp", "var",
];

/// Default number of run logs kept in the log directory
pub const DEFAULT_MAX_LOG_FILES: usize = 10;

/// Contents of `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedConfig {
    /// Packages offered as the default answer when creating a project
    pub default_packages: Vec<String>,

    /// Directory offered as the default parent for new projects
    pub default_project_path: Option<PathBuf>,

    /// Emit `setup.py`
    pub emit_build_manifest: bool,

    /// Emit `pyproject.toml`
    pub emit_project_manifest: bool,

    /// Whether the built-in templates were seeded into the config directory
    pub templates_copied: bool,

    pub reserved_names: Vec<String>,

    pub max_log_files: usize,

    /// Log at debug level
    pub debug: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            default_packages: Vec::new(),
            default_project_path: None,
            emit_build_manifest: true,
            emit_project_manifest: true,
            templates_copied: false,
            reserved_names: DEFAULT_RESERVED_NAMES.iter().map(|s| s.to_string()).collect(),
            max_log_files: DEFAULT_MAX_LOG_FILES,
            debug: false,
        }
    }
}

impl ResolvedConfig {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            emit_build_manifest: self.emit_build_manifest,
            emit_project_manifest: self.emit_project_manifest,
        }
    }
}

/// Which optional manifest files the pipeline generates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub emit_build_manifest: bool,
    pub emit_project_manifest: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            emit_build_manifest: true,
            emit_project_manifest: true,
        }
    }
}

/// Parse a comma-delimited package list
pub fn parse_package_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ResolvedConfig =
            serde_yaml::from_str("default_packages: [requests]\nemit_build_manifest: false\n")
                .unwrap();

        assert_eq!(config.default_packages, vec!["requests".to_string()]);
        assert!(!config.emit_build_manifest);
        assert!(config.emit_project_manifest);
        assert!(config.reserved_names.iter().any(|n| n == "LPT9"));
        assert_eq!(config.max_log_files, DEFAULT_MAX_LOG_FILES);
    }

    #[test]
    fn test_generation_options_follow_flags() {
        let config = ResolvedConfig {
            emit_project_manifest: false,
            ..Default::default()
        };
        let options = config.generation_options();
        assert!(options.emit_build_manifest);
        assert!(!options.emit_project_manifest);
    }

    #[test]
    fn test_parse_package_list() {
        assert_eq!(
            parse_package_list(" numpy, ,pandas ,"),
            vec!["numpy".to_string(), "pandas".to_string()]
        );
        assert!(parse_package_list("").is_empty());
    }
}
