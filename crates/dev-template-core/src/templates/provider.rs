//! Template sources
//!
//! The built-in python template set is compiled into the binary. On first
//! launch it is seeded into the configuration directory so users can edit it;
//! later runs read from there.

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Built-in templates as (template key, content)
pub const BUILTIN_TEMPLATES: &[(&str, &[u8])] = &[
    ("README.md", include_bytes!("../../templates/python/README.md")),
    (".gitignore", include_bytes!("../../templates/python/.gitignore")),
    ("requirements.txt", include_bytes!("../../templates/python/requirements.txt")),
    ("src/__init__.py", include_bytes!("../../templates/python/src/__init__.py")),
    ("src/main.py", include_bytes!("../../templates/python/src/main.py")),
    ("tests/__init__.py", include_bytes!("../../templates/python/tests/__init__.py")),
    ("tests/test_main.py", include_bytes!("../../templates/python/tests/test_main.py")),
    ("setup.py", include_bytes!("../../templates/python/setup.py")),
    ("pyproject.toml", include_bytes!("../../templates/python/pyproject.toml")),
];

/// Supplies template content by logical key
pub trait TemplateProvider: Send + Sync {
    fn template(&self, key: &str) -> Result<Cow<'_, [u8]>>;
}

/// Templates compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

impl TemplateProvider for EmbeddedTemplates {
    fn template(&self, key: &str) -> Result<Cow<'_, [u8]>> {
        BUILTIN_TEMPLATES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, content)| Cow::Borrowed(*content))
            .ok_or_else(|| Error::TemplateNotFound {
                key: key.to_string(),
            })
    }
}

/// Templates read from a directory, one file per key
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateProvider for DirectoryTemplates {
    fn template(&self, key: &str) -> Result<Cow<'_, [u8]>> {
        let path = self.root.join(key);
        match std::fs::read(&path) {
            Ok(content) => Ok(Cow::Owned(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::TemplateNotFound {
                key: key.to_string(),
            }),
            Err(source) => Err(Error::FileMaterialization { path, source }),
        }
    }
}

/// Copy the built-in templates into `dir`, keeping files that already exist.
/// Returns the keys that were written.
pub fn seed_templates(dir: &Path) -> Result<Vec<&'static str>> {
    let mut written = Vec::new();
    for (key, content) in BUILTIN_TEMPLATES {
        let dest = dir.join(key);
        if dest.exists() {
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, content)?;
        written.push(*key);
    }
    tracing::info!(dir = %dir.display(), count = written.len(), "seeded templates");
    Ok(written)
}
