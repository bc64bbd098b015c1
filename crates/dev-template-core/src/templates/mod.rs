//! Template sources and project materialization
//!
//! This module provides:
//! - Template providers (built-in, or a user-editable directory)
//! - The fixed set of files a project receives ([`FileSpec`])
//! - Directory creation and file materialization

pub mod copier;
pub mod file_spec;
pub mod provider;

use crate::config::{ConfigStore, ResolvedConfig};
use crate::error::Result;
use std::path::PathBuf;

pub use copier::{create_project_directory, create_subdirectories, materialize_files, RenderContext};
pub use file_spec::FileSpec;
pub use provider::{seed_templates, DirectoryTemplates, EmbeddedTemplates, TemplateProvider};

/// Pick the template source for a run.
///
/// An explicit directory wins. Otherwise the built-in templates are seeded into
/// the configuration directory on first use and read from there afterwards.
pub fn resolve_provider(
    explicit_dir: Option<PathBuf>,
    store: &ConfigStore,
    config: &mut ResolvedConfig,
) -> Result<Box<dyn TemplateProvider>> {
    if let Some(dir) = explicit_dir {
        tracing::info!(dir = %dir.display(), "using explicit template directory");
        return Ok(Box::new(DirectoryTemplates::new(dir)));
    }

    let dir = store.templates_dir();
    if !config.templates_copied || !dir.is_dir() {
        seed_templates(&dir)?;
        config.templates_copied = true;
        store.save(config)?;
    }

    Ok(Box::new(DirectoryTemplates::new(dir)))
}
