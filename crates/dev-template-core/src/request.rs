//! Validated project request
//!
//! A [`ProjectRequest`] can only be built through [`ProjectRequest::new`], which
//! runs every rule and reports all violations at once. Validation reads the
//! filesystem but never writes to it.

use crate::error::{Error, Result};
use crate::packages::base_name;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single validation rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyName,
    ReservedName(String),
    InvalidName(String),
    PathMissing(PathBuf),
    PathNotDirectory(PathBuf),
    PathNotWritable(PathBuf),
    TargetExists(PathBuf),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyName => write!(f, "Project name cannot be empty"),
            ValidationIssue::ReservedName(name) => write!(
                f,
                "Project name '{}' is reserved. Please choose a different name",
                name
            ),
            ValidationIssue::InvalidName(name) => write!(
                f,
                "Project name '{}' may only contain letters, digits, '.', '_' and '-', \
                 and must start and end with a letter or digit",
                name
            ),
            ValidationIssue::PathMissing(path) => {
                write!(f, "The path '{}' does not exist", path.display())
            }
            ValidationIssue::PathNotDirectory(path) => {
                write!(f, "The path '{}' is not a directory", path.display())
            }
            ValidationIssue::PathNotWritable(path) => write!(
                f,
                "You do not have write permissions for the path '{}'",
                path.display()
            ),
            ValidationIssue::TargetExists(path) => {
                write!(f, "'{}' already exists", path.display())
            }
        }
    }
}

/// Every issue found while validating a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|i| format!("  - {}", i)).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Immutable input to the scaffolding pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    project_name: String,
    project_path: PathBuf,
    requested_packages: BTreeSet<String>,
}

impl ProjectRequest {
    /// Validate the raw inputs and build a request.
    ///
    /// `reserved` names are compared case-insensitively. Package entries are
    /// trimmed, empty entries dropped, duplicates collapsed.
    pub fn new<I, S>(
        project_name: &str,
        project_path: impl Into<PathBuf>,
        packages: I,
        reserved: &[String],
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let project_name = project_name.trim().to_string();
        let project_path = project_path.into();

        let mut issues = validate_name(&project_name, reserved);
        issues.extend(validate_path(&project_path));

        if issues.is_empty() {
            let target = project_path.join(&project_name);
            if target.exists() {
                issues.push(ValidationIssue::TargetExists(target));
            }
        }

        if !issues.is_empty() {
            return Err(Error::Validation(ValidationErrors(issues)));
        }

        // The first spelling of a distribution wins (`Flask` vs `flask`)
        let mut seen = HashSet::new();
        let requested_packages = packages
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .filter(|p| seen.insert(normalize_name(base_name(p))))
            .collect();

        Ok(Self {
            project_name,
            project_path,
            requested_packages,
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Deduplicated packages in lexical order
    pub fn requested_packages(&self) -> &BTreeSet<String> {
        &self.requested_packages
    }

    /// `project_path/project_name`
    pub fn target_dir(&self) -> PathBuf {
        self.project_path.join(&self.project_name)
    }

    /// Distribution name used in package metadata
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.project_name)
    }
}

/// Collapse every run of `.`, `_` and `-` to a single `-` and lower-case.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if is_separator(c) {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

fn is_separator(c: char) -> bool {
    matches!(c, '.' | '_' | '-')
}

/// Check name rules only; usable from interactive prompts
pub fn validate_name(name: &str, reserved: &[String]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if name.is_empty() {
        issues.push(ValidationIssue::EmptyName);
        return issues;
    }

    if reserved.iter().any(|r| r.trim().eq_ignore_ascii_case(name)) {
        issues.push(ValidationIssue::ReservedName(name.to_string()));
    }

    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_separator(c));
    let first = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let last = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());

    if !(valid_chars && first && last) {
        issues.push(ValidationIssue::InvalidName(name.to_string()));
    }

    issues
}

/// Check path rules only; usable from interactive prompts
pub fn validate_path(path: &Path) -> Vec<ValidationIssue> {
    match std::fs::metadata(path) {
        Err(_) => vec![ValidationIssue::PathMissing(path.to_path_buf())],
        Ok(meta) if !meta.is_dir() => vec![ValidationIssue::PathNotDirectory(path.to_path_buf())],
        Ok(_) if !is_writable(path) => {
            vec![ValidationIssue::PathNotWritable(path.to_path_buf())]
        }
        Ok(_) => Vec::new(),
    }
}

/// Ask the OS whether the current user may create entries in `path`
#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK | libc::X_OK) == 0 }
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| !meta.permissions().readonly())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved() -> Vec<String> {
        vec!["CON".to_string(), "tmp".to_string()]
    }

    fn issues_of(result: Result<ProjectRequest>) -> Vec<ValidationIssue> {
        match result {
            Err(Error::Validation(errors)) => errors.0,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_collapses_separator_runs() {
        assert_eq!(normalize_name("My__Project..Name"), "my-project-name");
        assert_eq!(normalize_name("demo"), "demo");
        assert_eq!(normalize_name("a-_.b"), "a-b");
    }

    #[test]
    fn test_valid_request_dedupes_and_sorts_packages() {
        let dir = tempfile::tempdir().unwrap();
        let request = ProjectRequest::new(
            "demo",
            dir.path(),
            ["pkgB", " pkgA ", "pkgA", ""],
            &reserved(),
        )
        .unwrap();

        let packages: Vec<&str> = request
            .requested_packages()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(packages, vec!["pkgA", "pkgB"]);
        assert_eq!(request.target_dir(), dir.path().join("demo"));
    }

    #[test]
    fn test_packages_dedupe_on_normalized_name() {
        let dir = tempfile::tempdir().unwrap();
        let request = ProjectRequest::new(
            "demo",
            dir.path(),
            ["Flask", "flask", "flask[async]", "Typing_Extensions", "typing-extensions"],
            &[],
        )
        .unwrap();

        let packages: Vec<&str> = request
            .requested_packages()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(packages, vec!["Flask", "Typing_Extensions"]);
    }

    #[test]
    fn test_reserved_name_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let issues = issues_of(ProjectRequest::new(
            "con",
            dir.path(),
            Vec::<String>::new(),
            &reserved(),
        ));
        assert_eq!(issues, vec![ValidationIssue::ReservedName("con".into())]);
        assert!(!dir.path().join("con").exists());
    }

    #[test]
    fn test_name_grammar() {
        assert!(validate_name("my.project-1_x", &[]).is_empty());
        assert!(!validate_name("-leading", &[]).is_empty());
        assert!(!validate_name("trailing_", &[]).is_empty());
        assert!(!validate_name("has space", &[]).is_empty());
        assert!(!validate_name("slash/name", &[]).is_empty());
        assert_eq!(validate_name("", &[]), vec![ValidationIssue::EmptyName]);
    }

    #[test]
    fn test_reports_every_issue() {
        let missing = PathBuf::from("/definitely/not/here/dev-template");
        let issues = issues_of(ProjectRequest::new(
            "TMP-",
            &missing,
            Vec::<String>::new(),
            &["tmp-".to_string()],
        ));
        assert_eq!(issues.len(), 3);
        assert!(issues.contains(&ValidationIssue::PathMissing(missing)));
    }

    #[cfg(unix)]
    #[test]
    fn test_writability_matches_what_the_os_allows() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Root may still write here; whatever the OS decides must agree with validation
        let can_create = std::fs::create_dir(locked.join("demo")).is_ok();
        let issues = validate_path(&locked);
        assert_eq!(
            issues.contains(&ValidationIssue::PathNotWritable(locked.clone())),
            !can_create
        );

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(validate_path(&locked).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_owned_by_another_user_is_not_writable() {
        use std::os::unix::fs::MetadataExt;

        let root_dir = Path::new("/");
        let meta = std::fs::metadata(root_dir).unwrap();
        if meta.uid() != 0 || meta.mode() & 0o022 != 0 {
            return;
        }

        // Only root may create entries in a root-owned 0755 directory
        let running_as_root = unsafe { libc::geteuid() } == 0;
        assert_eq!(validate_path(root_dir).is_empty(), running_as_root);
    }

    #[test]
    fn test_existing_target_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("demo")).unwrap();

        let issues = issues_of(ProjectRequest::new(
            "demo",
            dir.path(),
            Vec::<String>::new(),
            &[],
        ));
        assert_eq!(
            issues,
            vec![ValidationIssue::TargetExists(dir.path().join("demo"))]
        );
    }

    #[test]
    fn test_path_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(
            validate_path(&file),
            vec![ValidationIssue::PathNotDirectory(file.clone())]
        );
    }
}
