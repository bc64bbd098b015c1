//! Which files a new project receives

use crate::config::GenerationOptions;

/// Placeholder in destination paths replaced with the project name
pub const PROJECT_NAME_PLACEHOLDER: &str = "{project_name}";

pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const BUILD_MANIFEST_FILE: &str = "setup.py";
pub const PROJECT_MANIFEST_FILE: &str = "pyproject.toml";
pub const ENTRY_POINT_FILE: &str = "src/{project_name}/main.py";

/// One file to materialize: destination relative to the project root and
/// the template key its content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSpec {
    pub destination: &'static str,
    pub template_key: &'static str,
}

impl FileSpec {
    pub const fn new(destination: &'static str, template_key: &'static str) -> Self {
        Self {
            destination,
            template_key,
        }
    }

    /// Destination with the project name substituted
    pub fn resolve_destination(&self, project_name: &str) -> String {
        resolve(self.destination, project_name)
    }

    /// Core files plus the optional manifests enabled in `options`
    pub fn active_set(options: &GenerationOptions) -> Vec<FileSpec> {
        let mut specs = CORE_FILES.to_vec();
        if options.emit_build_manifest {
            specs.push(FileSpec::new(BUILD_MANIFEST_FILE, "setup.py"));
        }
        if options.emit_project_manifest {
            specs.push(FileSpec::new(PROJECT_MANIFEST_FILE, "pyproject.toml"));
        }
        specs
    }
}

/// Substitute the project name into a destination path template
pub fn resolve(destination: &str, project_name: &str) -> String {
    destination.replace(PROJECT_NAME_PLACEHOLDER, project_name)
}

/// Files every project gets
pub const CORE_FILES: &[FileSpec] = &[
    FileSpec::new("README.md", "README.md"),
    FileSpec::new(".gitignore", ".gitignore"),
    FileSpec::new(REQUIREMENTS_FILE, "requirements.txt"),
    FileSpec::new("src/{project_name}/__init__.py", "src/__init__.py"),
    FileSpec::new(ENTRY_POINT_FILE, "src/main.py"),
    FileSpec::new("tests/__init__.py", "tests/__init__.py"),
    FileSpec::new("tests/test_main.py", "tests/test_main.py"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_set_gates_optional_files() {
        let all = FileSpec::active_set(&GenerationOptions::default());
        assert_eq!(all.len(), CORE_FILES.len() + 2);

        let none = FileSpec::active_set(&GenerationOptions {
            emit_build_manifest: false,
            emit_project_manifest: false,
        });
        assert_eq!(none, CORE_FILES.to_vec());

        let project_only = FileSpec::active_set(&GenerationOptions {
            emit_build_manifest: false,
            emit_project_manifest: true,
        });
        assert!(project_only.iter().any(|s| s.destination == PROJECT_MANIFEST_FILE));
        assert!(!project_only.iter().any(|s| s.destination == BUILD_MANIFEST_FILE));
    }

    #[test]
    fn test_resolve_destination() {
        let spec = FileSpec::new(ENTRY_POINT_FILE, "src/main.py");
        assert_eq!(spec.resolve_destination("demo"), "src/demo/main.py");
    }
}
