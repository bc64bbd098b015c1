//! Project directory creation and template file materialization

use crate::error::{Error, Result};
use crate::templates::file_spec::FileSpec;
use crate::templates::provider::TemplateProvider;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Values substituted into template content
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub project_name: String,
    pub distribution_name: String,
}

impl RenderContext {
    fn render(&self, content: &[u8]) -> Vec<u8> {
        match std::str::from_utf8(content) {
            Ok(text) => text
                .replace("{{project_name}}", &self.project_name)
                .replace("{{distribution_name}}", &self.distribution_name)
                .into_bytes(),
            // Binary templates are copied as-is
            Err(_) => content.to_vec(),
        }
    }
}

/// Create the project root. Missing parents are created; the root itself
/// must not exist yet.
pub async fn create_project_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::DirectoryCreation {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    match fs::create_dir(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::ProjectExists {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(Error::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create `src/<project_name>` and `tests` under `root`
pub async fn create_subdirectories(root: &Path, project_name: &str) -> Result<()> {
    for dir in [root.join("src").join(project_name), root.join("tests")] {
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| Error::DirectoryCreation { path: dir, source })?;
    }
    Ok(())
}

/// Write every spec's rendered template under `root`, stopping at the first
/// failure. Returns the written paths relative to `root`, in spec order.
pub async fn materialize_files<T: TemplateProvider + ?Sized>(
    root: &Path,
    context: &RenderContext,
    specs: &[FileSpec],
    templates: &T,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(specs.len());

    for spec in specs {
        let relative = PathBuf::from(spec.resolve_destination(&context.project_name));
        let target_path = root.join(&relative);

        let content = templates
            .template(spec.template_key)
            .map_err(|e| at_destination(e, &target_path))?;
        let rendered = context.render(&content);

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::FileMaterialization {
                    path: target_path.clone(),
                    source,
                })?;
        }

        fs::write(&target_path, rendered)
            .await
            .map_err(|source| Error::FileMaterialization {
                path: target_path.clone(),
                source,
            })?;

        tracing::debug!(file = %relative.display(), template = spec.template_key, "materialized");
        written.push(relative);
    }

    Ok(written)
}

/// Report a template lookup failure against the file it was meant to produce
fn at_destination(err: Error, target_path: &Path) -> Error {
    match err {
        Error::TemplateNotFound { key } => Error::FileMaterialization {
            path: target_path.to_path_buf(),
            source: std::io::Error::new(
                ErrorKind::NotFound,
                format!("template `{}` not found", key),
            ),
        },
        Error::Io(source) => Error::FileMaterialization {
            path: target_path.to_path_buf(),
            source,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationOptions;
    use crate::templates::provider::{DirectoryTemplates, EmbeddedTemplates};

    fn context(name: &str) -> RenderContext {
        RenderContext {
            project_name: name.to_string(),
            distribution_name: crate::request::normalize_name(name),
        }
    }

    #[tokio::test]
    async fn test_create_project_directory_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("demo");

        create_project_directory(&root).await.unwrap();
        assert!(root.is_dir());

        let err = create_project_directory(&root).await.unwrap_err();
        assert!(matches!(err, Error::ProjectExists { .. }));
    }

    #[tokio::test]
    async fn test_create_project_directory_collides_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let err = create_project_directory(&blocker.join("demo"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DirectoryCreation { .. }));
    }

    #[tokio::test]
    async fn test_create_subdirectories_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        create_subdirectories(dir.path(), "demo").await.unwrap();
        create_subdirectories(dir.path(), "demo").await.unwrap();

        assert!(dir.path().join("src/demo").is_dir());
        assert!(dir.path().join("tests").is_dir());
    }

    #[tokio::test]
    async fn test_materialize_renders_paths_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let specs = FileSpec::active_set(&GenerationOptions::default());

        let written = materialize_files(dir.path(), &context("My_App"), &specs, &EmbeddedTemplates)
            .await
            .unwrap();

        assert_eq!(written.len(), specs.len());
        assert!(dir.path().join("src/My_App/main.py").exists());
        assert!(dir.path().join("tests/test_main.py").exists());

        let pyproject = std::fs::read_to_string(dir.path().join("pyproject.toml")).unwrap();
        assert!(pyproject.contains("name = \"my-app\""));
        assert!(pyproject.contains("My_App.main:main"));
        assert!(!pyproject.contains("{{"));
    }

    #[tokio::test]
    async fn test_missing_template_stops_materialization() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = tempfile::tempdir().unwrap();
        std::fs::write(templates_dir.path().join("README.md"), "# readme").unwrap();

        let specs = [
            FileSpec::new("README.md", "README.md"),
            FileSpec::new(".gitignore", ".gitignore"),
            FileSpec::new("requirements.txt", "requirements.txt"),
        ];
        let err = materialize_files(
            dir.path(),
            &context("demo"),
            &specs,
            &DirectoryTemplates::new(templates_dir.path()),
        )
        .await
        .unwrap_err();

        match err {
            Error::FileMaterialization { path, source } => {
                assert_eq!(path, dir.path().join(".gitignore"));
                assert_eq!(source.kind(), ErrorKind::NotFound);
                assert!(source.to_string().contains(".gitignore"));
            }
            other => panic!("expected materialization error, got {:?}", other),
        }
        assert!(dir.path().join("README.md").exists());
        assert!(!dir.path().join("requirements.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_template_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = tempfile::tempdir().unwrap();
        // A directory where a file is expected fails to read on every user
        std::fs::create_dir(templates_dir.path().join("README.md")).unwrap();

        let err = materialize_files(
            dir.path(),
            &context("demo"),
            &[FileSpec::new("README.md", "README.md")],
            &DirectoryTemplates::new(templates_dir.path()),
        )
        .await
        .unwrap_err();

        match err {
            Error::FileMaterialization { path, .. } => {
                assert_eq!(path, templates_dir.path().join("README.md"))
            }
            other => panic!("expected materialization error, got {:?}", other),
        }
    }
}
