//! Project materialization pipeline
//!
//! Runs the stages strictly in order:
//!
//! `Validating -> DirectoryCreation -> Scaffolding -> EnvironmentSetup ->
//! PackageInstallation -> Reconciliation -> Done`
//!
//! The first fatal error is returned and whatever is already on disk stays
//! there. Failed package installs are collected into the result instead.
//! The cancel flag is checked before every stage.

use crate::config::GenerationOptions;
use crate::error::{Error, Result};
use crate::packages::{install_packages, reconcile};
use crate::request::ProjectRequest;
use crate::runtime::env::{EnvironmentProvisioner, InstalledPackageVersions};
use crate::templates::{self, FileSpec, RenderContext, TemplateProvider};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validating,
    DirectoryCreation,
    Scaffolding,
    EnvironmentSetup,
    PackageInstallation,
    Reconciliation,
    Done,
}

impl Stage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Validating => "validation",
            Stage::DirectoryCreation => "directory creation",
            Stage::Scaffolding => "scaffolding",
            Stage::EnvironmentSetup => "environment setup",
            Stage::PackageInstallation => "package installation",
            Stage::Reconciliation => "reconciliation",
            Stage::Done => "completion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Progress notifications emitted after each discrete step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    DirectoryCreated(PathBuf),
    FilesMaterialized(usize),
    EnvironmentReady(PathBuf),
    /// Emitted before the first install; not emitted for an empty set
    InstallStarted { total: usize },
    PackageProcessed {
        name: String,
        succeeded: bool,
        done: usize,
        total: usize,
    },
    /// Reconciliation finished; `versions_known` is false when the version
    /// query failed and bare names were written
    Reconciled { files: usize, versions_known: bool },
}

/// Receives pipeline progress. Presentation only; cannot affect the run.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Observer that ignores every event
impl PipelineObserver for () {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Shared interrupt flag, set from a signal handler
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub root_path: PathBuf,
    pub env_path: PathBuf,
    pub successful_packages: Vec<String>,
    pub failed_packages: Vec<String>,
    /// False when installed versions could not be queried and the manifests
    /// received unpinned names
    pub version_pins_known: bool,
    /// True when `pyproject.toml` had no dependency list and was left as is
    pub manifest_marker_missing: bool,
}

/// Sequences materialization, environment setup and package installation
pub struct Pipeline<'a> {
    templates: &'a dyn TemplateProvider,
    provisioner: &'a dyn EnvironmentProvisioner,
    observer: &'a dyn PipelineObserver,
    cancel: CancelFlag,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        templates: &'a dyn TemplateProvider,
        provisioner: &'a dyn EnvironmentProvisioner,
    ) -> Self {
        Self {
            templates,
            provisioner,
            observer: &(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn PipelineObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every stage for `request`
    pub async fn run(
        &self,
        request: &ProjectRequest,
        options: &GenerationOptions,
    ) -> Result<PipelineResult> {
        let root = request.target_dir();
        let name = request.project_name();

        // Validating: the request may have been built a while ago
        self.enter(Stage::Validating)?;
        if root.exists() {
            return Err(Error::ProjectExists { path: root });
        }

        self.enter(Stage::DirectoryCreation)?;
        templates::create_project_directory(&root).await?;
        templates::create_subdirectories(&root, name).await?;
        self.emit(PipelineEvent::DirectoryCreated(root.clone()));

        self.enter(Stage::Scaffolding)?;
        let context = RenderContext {
            project_name: name.to_string(),
            distribution_name: request.normalized_name(),
        };
        let specs = FileSpec::active_set(options);
        let written = templates::materialize_files(&root, &context, &specs, self.templates).await?;
        self.emit(PipelineEvent::FilesMaterialized(written.len()));

        self.enter(Stage::EnvironmentSetup)?;
        let env_path = self.provisioner.create_environment(&root, name).await?;
        self.emit(PipelineEvent::EnvironmentReady(env_path.clone()));

        self.enter(Stage::PackageInstallation)?;
        let total = request.requested_packages().len();
        if total > 0 {
            self.emit(PipelineEvent::InstallStarted { total });
        }
        let report = install_packages(
            self.provisioner,
            &env_path,
            request.requested_packages(),
            |package, succeeded, done, total| {
                self.emit(PipelineEvent::PackageProcessed {
                    name: package.to_string(),
                    succeeded,
                    done,
                    total,
                })
            },
        )
        .await;

        let mut version_pins_known = true;
        let mut manifest_marker_missing = false;
        if !report.successful.is_empty() {
            self.enter(Stage::Reconciliation)?;
            let versions = match self.provisioner.list_installed_versions(&env_path).await {
                Ok(versions) => versions,
                Err(e) => {
                    tracing::warn!(error = %e, "version query failed, writing unpinned names");
                    version_pins_known = false;
                    InstalledPackageVersions::default()
                }
            };

            let reconciled = reconcile(
                &root,
                name,
                &report.successful,
                &versions,
                options.emit_project_manifest,
            )
            .await?;
            manifest_marker_missing = reconciled.manifest_marker_missing;
            self.emit(PipelineEvent::Reconciled {
                files: reconciled.updated.len(),
                versions_known: version_pins_known,
            });
        }

        // Everything is on disk; an interrupt now changes nothing
        self.emit(PipelineEvent::StageStarted(Stage::Done));
        tracing::info!(
            root = %root.display(),
            installed = report.successful.len(),
            failed = report.failed.len(),
            "project created"
        );

        Ok(PipelineResult {
            root_path: root,
            env_path,
            successful_packages: report.successful,
            failed_packages: report.failed,
            version_pins_known,
            manifest_marker_missing,
        })
    }

    fn enter(&self, stage: Stage) -> Result<()> {
        if self.cancel.is_cancelled() {
            tracing::warn!(%stage, "cancelled");
            return Err(Error::Cancelled { stage });
        }
        tracing::info!(%stage, "stage started");
        self.emit(PipelineEvent::StageStarted(stage));
        Ok(())
    }

    fn emit(&self, event: PipelineEvent) {
        self.observer.on_event(&event);
    }
}
