//! dev-template core - scaffolding for Python projects with an isolated environment
//!
//! Given a validated [`ProjectRequest`] the [`Pipeline`] creates the project
//! directory, writes the template files, creates a virtual environment, installs
//! the requested packages one at a time and records the ones that installed in
//! `requirements.txt`, `pyproject.toml` and the generated entry point.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - template materialization, environment
//!   provisioning, package installation and reconciliation
//! - **Layer 2: Workflow Orchestration** - [`Pipeline`] with its stages, observer
//!   and cancel flag; [`ProductConfig`] for binaries
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use dev_template_core::{
//!     EmbeddedTemplates, GenerationOptions, Pipeline, ProjectRequest, VenvProvisioner,
//! };
//!
//! let request = ProjectRequest::new("demo", "/tmp/work", ["requests"], &[])?;
//! let provisioner = VenvProvisioner::new("python3");
//! let result = Pipeline::new(&EmbeddedTemplates, &provisioner)
//!     .run(&request, &GenerationOptions::default())
//!     .await?;
//! println!("failed: {:?}", result.failed_packages);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod packages;
pub mod pipeline;
pub mod product;
pub mod request;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{ConfigStore, GenerationOptions, ResolvedConfig};
pub use error::{Error, Result};
pub use packages::InstallReport;
pub use pipeline::{CancelFlag, Pipeline, PipelineEvent, PipelineObserver, PipelineResult, Stage};
pub use product::ProductConfig;
pub use request::{ProjectRequest, ValidationErrors, ValidationIssue};
pub use runtime::{EnvironmentProvisioner, InstalledPackageVersions, VenvProvisioner};
pub use templates::{DirectoryTemplates, EmbeddedTemplates, FileSpec, TemplateProvider};

#[cfg(feature = "tui")]
pub use tui::run;
