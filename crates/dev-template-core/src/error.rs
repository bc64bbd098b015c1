//! Error types for dev-template-core

use crate::pipeline::Stage;
use crate::request::ValidationErrors;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using dev-template-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Scaffolding error types
#[derive(Error, Debug)]
pub enum Error {
    /// The request failed one or more validation rules
    #[error("Invalid project request:\n{0}")]
    Validation(ValidationErrors),

    /// Target directory is already on disk
    #[error("Project already exists at: {}", path.display())]
    ProjectExists { path: PathBuf },

    /// Project directory could not be created
    #[error("Could not create project directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template file could not be written into the project
    #[error("Failed to write {}: {source}", path.display())]
    FileMaterialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template key is not provided by the template source
    #[error("Template not found: {key}")]
    TemplateNotFound { key: String },

    /// The isolated environment could not be created
    #[error("Failed to create environment at {}: {message}", path.display())]
    EnvironmentCreation { path: PathBuf, message: String },

    /// Listing installed packages failed or produced unexpected output
    #[error("Failed to query installed packages: {message}")]
    EnvironmentQuery { message: String },

    /// No usable Python interpreter
    #[error("Python interpreter unavailable: {message}")]
    Interpreter { message: String },

    /// External command exceeded its time budget
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Run was interrupted before the given stage
    #[error("Cancelled before {stage}")]
    Cancelled { stage: Stage },

    /// Configuration could not be read or written
    #[error("Configuration error ({}): {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Other IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was raised before anything on disk changed
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::ProjectExists { .. })
    }
}
