//! Interpreter detection and isolated environments
//!
//! This module provides:
//! - Python interpreter detection with a minimum-version check
//! - The [`EnvironmentProvisioner`] seam and its venv/pip implementation

pub mod check;
pub mod env;
pub mod version;

pub use check::{check_python, find_python, RuntimeInfo};
pub use env::{
    environment_path, parse_freeze, EnvironmentProvisioner, InstalledPackageVersions,
    VenvProvisioner,
};
