//! Isolated package environments
//!
//! [`EnvironmentProvisioner`] is the seam between the pipeline and the
//! external environment tooling. [`VenvProvisioner`] drives `python -m venv`
//! and the environment's own `pip`.

use crate::error::{Error, Result};
use crate::request::normalize_name;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for creating the environment
const CREATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for a single package install
const INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for listing installed packages
const LIST_TIMEOUT: Duration = Duration::from_secs(60);

/// Installed packages keyed by normalized name, mapped to their version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackageVersions(BTreeMap<String, String>);

impl InstalledPackageVersions {
    pub fn insert(&mut self, name: &str, version: impl Into<String>) {
        self.0.insert(normalize_name(name), version.into());
    }

    /// Version of `name`, matched after normalization (`Flask` == `flask`)
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.0.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for InstalledPackageVersions {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        let mut versions = Self::default();
        for (name, version) in iter {
            let name: String = name.into();
            versions.insert(&name, version);
        }
        versions
    }
}

/// Creates an isolated environment and runs package operations against it
#[async_trait]
pub trait EnvironmentProvisioner: Send + Sync {
    /// Create the environment for `project_name` under `root` and return its path
    async fn create_environment(&self, root: &Path, project_name: &str) -> Result<PathBuf>;

    /// Install one package. Failure is an expected outcome, never an error.
    async fn install_package(&self, env_path: &Path, package: &str) -> bool;

    /// Installed packages with their resolved versions
    async fn list_installed_versions(&self, env_path: &Path) -> Result<InstalledPackageVersions>;
}

/// Environment directory for a project
pub fn environment_path(root: &Path, project_name: &str) -> PathBuf {
    root.join(format!("{}_env", project_name))
}

/// `python -m venv` + `pip` provisioner
#[derive(Debug, Clone)]
pub struct VenvProvisioner {
    python: String,
    create_timeout: Duration,
    install_timeout: Duration,
    list_timeout: Duration,
}

impl VenvProvisioner {
    /// Create a provisioner using the given interpreter command
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            create_timeout: CREATE_TIMEOUT,
            install_timeout: INSTALL_TIMEOUT,
            list_timeout: LIST_TIMEOUT,
        }
    }

    /// Apply one timeout to every external call
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.create_timeout = limit;
        self.install_timeout = limit;
        self.list_timeout = limit;
        self
    }

    /// Path of the environment's pip executable
    pub fn pip_path(env_path: &Path) -> PathBuf {
        if cfg!(windows) {
            env_path.join("Scripts").join("pip.exe")
        } else {
            env_path.join("bin").join("pip")
        }
    }
}

#[async_trait]
impl EnvironmentProvisioner for VenvProvisioner {
    async fn create_environment(&self, root: &Path, project_name: &str) -> Result<PathBuf> {
        let env_path = environment_path(root, project_name);

        let mut cmd = TokioCommand::new(&self.python);
        cmd.arg("-m").arg("venv").arg(&env_path);

        let output = run_with_timeout(cmd, self.create_timeout)
            .await
            .map_err(|e| match e {
                Error::Io(io) => Error::EnvironmentCreation {
                    path: env_path.clone(),
                    message: io.to_string(),
                },
                other => other,
            })?;

        if !output.status.success() {
            return Err(Error::EnvironmentCreation {
                path: env_path,
                message: failure_message(&output),
            });
        }

        tracing::info!(env = %env_path.display(), "environment created");
        Ok(env_path)
    }

    async fn install_package(&self, env_path: &Path, package: &str) -> bool {
        let mut cmd = TokioCommand::new(Self::pip_path(env_path));
        cmd.arg("install").arg(package);

        match run_with_timeout(cmd, self.install_timeout).await {
            Ok(output) => {
                log_output(package, &output);
                output.status.success()
            }
            Err(e) => {
                tracing::warn!(package, error = %e, "package install did not complete");
                false
            }
        }
    }

    async fn list_installed_versions(&self, env_path: &Path) -> Result<InstalledPackageVersions> {
        let mut cmd = TokioCommand::new(Self::pip_path(env_path));
        cmd.arg("freeze");

        let output = run_with_timeout(cmd, self.list_timeout)
            .await
            .map_err(|e| match e {
                Error::Io(io) => Error::EnvironmentQuery {
                    message: io.to_string(),
                },
                other => other,
            })?;

        if !output.status.success() {
            return Err(Error::EnvironmentQuery {
                message: failure_message(&output),
            });
        }

        parse_freeze(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `pip freeze` output.
///
/// `name==version` and `name===version` lines are recorded. Blank lines,
/// comments, options (`-e ...`) and direct references (`name @ url`) are
/// skipped. Anything else is an error.
pub fn parse_freeze(output: &str) -> Result<InstalledPackageVersions> {
    let mut versions = InstalledPackageVersions::default();

    for line in output.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if line.contains(" @ ") {
            tracing::debug!(line, "skipping direct reference");
            continue;
        }

        let (name, version) = line
            .split_once("===")
            .or_else(|| line.split_once("=="))
            .map(|(n, v)| (n.trim(), v.trim()))
            .filter(|(n, v)| !n.is_empty() && !v.is_empty())
            .ok_or_else(|| Error::EnvironmentQuery {
                message: format!("unexpected line in package listing: {}", line),
            })?;

        versions.insert(name, version);
    }

    Ok(versions)
}

async fn run_with_timeout(mut cmd: TokioCommand, limit: Duration) -> Result<Output> {
    let described = describe(&cmd);
    tracing::debug!(command = %described, "running");

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Dropping the future on timeout kills the child
    match timeout(limit, cmd.output()).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Timeout {
            command: described,
            timeout: limit,
        }),
    }
}

fn describe(cmd: &TokioCommand) -> String {
    let std_cmd = cmd.as_std();
    std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    match output.status.code() {
        Some(code) if detail.is_empty() => format!("exit code {}", code),
        Some(code) => format!("exit code {}: {}", code, detail),
        None => "terminated by signal".to_string(),
    }
}

fn log_output(package: &str, output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::debug!(package, "pip: {}", line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        tracing::debug!(package, "pip stderr: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_freeze() {
        let output = "\
# comment
Flask==3.0.0
-e git+https://example.com/repo.git#egg=local
requests===2.31.0
mylib @ file:///tmp/mylib

python_dateutil==2.9.0
";
        let versions = parse_freeze(output).unwrap();

        assert_eq!(versions.len(), 3);
        assert_eq!(versions.version_of("flask"), Some("3.0.0"));
        assert_eq!(versions.version_of("requests"), Some("2.31.0"));
        assert_eq!(versions.version_of("python-dateutil"), Some("2.9.0"));
        assert_eq!(versions.version_of("mylib"), None);
    }

    #[test]
    fn test_parse_freeze_rejects_garbage() {
        let err = parse_freeze("requests==2.0\nthis is not a requirement\n").unwrap_err();
        assert!(matches!(err, Error::EnvironmentQuery { .. }));

        assert!(parse_freeze("broken==\n").is_err());
    }

    #[test]
    fn test_environment_path() {
        assert_eq!(
            environment_path(Path::new("/work/demo"), "demo"),
            PathBuf::from("/work/demo/demo_env")
        );
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_creation_error() {
        let dir = tempfile::tempdir().unwrap();
        let provisioner = VenvProvisioner::new("dev-template-no-such-python");

        let err = provisioner
            .create_environment(dir.path(), "demo")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EnvironmentCreation { .. }));
    }

    #[tokio::test]
    async fn test_install_without_environment_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        let provisioner = VenvProvisioner::new("python3");

        assert!(!provisioner.install_package(dir.path(), "requests").await);
        assert!(matches!(
            provisioner.list_installed_versions(dir.path()).await,
            Err(Error::EnvironmentQuery { .. })
        ));
    }

    #[cfg(unix)]
    fn write_sleeper(path: &Path) {
        use std::os::unix::fs::PermissionsExt;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_environment_creation_is_fatal_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("slow-python");
        write_sleeper(&python);
        let provisioner = VenvProvisioner::new(python.to_string_lossy())
            .with_timeout(Duration::from_millis(300));

        let started = std::time::Instant::now();
        let err = provisioner
            .create_environment(dir.path(), "demo")
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(err.to_string().contains("timed out after 300ms"), "{}", err);
        match err {
            Error::Timeout { timeout, .. } => assert_eq!(timeout, Duration::from_millis(300)),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_install_counts_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        write_sleeper(&VenvProvisioner::pip_path(dir.path()));
        let provisioner =
            VenvProvisioner::new("python3").with_timeout(Duration::from_millis(300));

        let started = std::time::Instant::now();
        assert!(!provisioner.install_package(dir.path(), "alpha").await);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_listing_is_timeout_error() {
        let dir = tempfile::tempdir().unwrap();
        write_sleeper(&VenvProvisioner::pip_path(dir.path()));
        let provisioner =
            VenvProvisioner::new("python3").with_timeout(Duration::from_millis(300));

        let err = provisioner
            .list_installed_versions(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
