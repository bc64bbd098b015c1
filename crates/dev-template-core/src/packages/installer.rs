//! Sequential package installation

use crate::runtime::env::EnvironmentProvisioner;
use std::collections::BTreeSet;
use std::path::Path;

/// Outcome of installing a set of packages, both lists in install order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub successful: Vec<String>,
    pub failed: Vec<String>,
}

impl InstallReport {
    pub fn attempted(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

/// Install every package one at a time, in set order.
///
/// A failed install never stops the loop. `on_progress` is called after each
/// package with `(name, succeeded, done, total)`. An empty set returns an
/// empty report without touching the environment.
pub async fn install_packages<P, F>(
    provisioner: &P,
    env_path: &Path,
    packages: &BTreeSet<String>,
    mut on_progress: F,
) -> InstallReport
where
    P: EnvironmentProvisioner + ?Sized,
    F: FnMut(&str, bool, usize, usize),
{
    let mut report = InstallReport::default();
    let total = packages.len();

    if total == 0 {
        tracing::info!("no packages to install");
        return report;
    }

    for (idx, package) in packages.iter().enumerate() {
        let succeeded = provisioner.install_package(env_path, package).await;
        if succeeded {
            tracing::info!(package = %package, "installed");
            report.successful.push(package.clone());
        } else {
            tracing::warn!(package = %package, "install failed");
            report.failed.push(package.clone());
        }
        on_progress(package, succeeded, idx + 1, total);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::runtime::env::InstalledPackageVersions;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct Scripted {
        failing: Vec<&'static str>,
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EnvironmentProvisioner for Scripted {
        async fn create_environment(&self, root: &Path, _project_name: &str) -> Result<PathBuf> {
            Ok(root.to_path_buf())
        }

        async fn install_package(&self, _env_path: &Path, package: &str) -> bool {
            self.attempts.lock().unwrap().push(package.to_string());
            !self.failing.contains(&package)
        }

        async fn list_installed_versions(
            &self,
            _env_path: &Path,
        ) -> Result<InstalledPackageVersions> {
            Ok(InstalledPackageVersions::default())
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_short_circuit() {
        let provisioner = Scripted {
            failing: vec!["beta"],
            attempts: Mutex::new(Vec::new()),
        };
        let packages: BTreeSet<String> = ["gamma", "beta", "alpha"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut progress = Vec::new();

        let report = install_packages(
            &provisioner,
            Path::new("/env"),
            &packages,
            |name, ok, done, total| progress.push((name.to_string(), ok, done, total)),
        )
        .await;

        assert_eq!(report.successful, vec!["alpha", "gamma"]);
        assert_eq!(report.failed, vec!["beta"]);
        assert_eq!(report.attempted(), 3);
        assert_eq!(
            *provisioner.attempts.lock().unwrap(),
            vec!["alpha", "beta", "gamma"]
        );
        assert_eq!(progress.last(), Some(&("gamma".to_string(), true, 3, 3)));
    }

    #[tokio::test]
    async fn test_empty_set_never_calls_provisioner() {
        let provisioner = Scripted {
            failing: vec![],
            attempts: Mutex::new(Vec::new()),
        };

        let report = install_packages(
            &provisioner,
            Path::new("/env"),
            &BTreeSet::new(),
            |_, _, _, _| panic!("no progress expected"),
        )
        .await;

        assert_eq!(report, InstallReport::default());
        assert!(provisioner.attempts.lock().unwrap().is_empty());
    }
}
