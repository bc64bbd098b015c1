//! Reflect successful installs into the generated project files
//!
//! Only packages that actually installed are written. The requirements file
//! is appended to, the project manifest gets entries inserted directly below
//! its `dependencies = [` line, and the entry point gets import lines ahead of
//! its existing content.

use super::{base_name, module_name};
use crate::error::{Error, Result};
use crate::runtime::env::InstalledPackageVersions;
use crate::templates::file_spec::{
    self, ENTRY_POINT_FILE, PROJECT_MANIFEST_FILE, REQUIREMENTS_FILE,
};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files touched by reconciliation, relative to the project root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub updated: Vec<PathBuf>,
    /// Whether the project manifest had no dependency section to extend
    pub manifest_marker_missing: bool,
}

/// Write `successful` packages into the project's requirements, manifest and
/// entry point. With an empty list nothing is touched.
pub async fn reconcile(
    root: &Path,
    project_name: &str,
    successful: &[String],
    versions: &InstalledPackageVersions,
    project_manifest: bool,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    if successful.is_empty() {
        return Ok(report);
    }

    let lines: Vec<String> = successful
        .iter()
        .map(|p| requirement_line(p, versions))
        .collect();

    // requirements.txt
    let requirements = PathBuf::from(REQUIREMENTS_FILE);
    let current = read(root, &requirements).await?;
    write(root, &requirements, append_requirements(&current, &lines)).await?;
    report.updated.push(requirements);

    // pyproject.toml
    if project_manifest {
        let manifest = PathBuf::from(PROJECT_MANIFEST_FILE);
        let current = read(root, &manifest).await?;
        match insert_dependencies(&current, &lines) {
            Some(updated) => {
                write(root, &manifest, updated).await?;
                report.updated.push(manifest);
            }
            None => {
                tracing::warn!(
                    file = PROJECT_MANIFEST_FILE,
                    "no dependency section found, manifest left unchanged"
                );
                report.manifest_marker_missing = true;
            }
        }
    }

    // src/<name>/main.py
    let entry_point = PathBuf::from(file_spec::resolve(ENTRY_POINT_FILE, project_name));
    let modules: Vec<String> = successful.iter().map(|p| module_name(p)).collect();
    let current = read(root, &entry_point).await?;
    write(root, &entry_point, prepend_imports(&current, &modules)).await?;
    report.updated.push(entry_point);

    tracing::info!(
        packages = successful.len(),
        files = report.updated.len(),
        "reconciled installed packages"
    );
    Ok(report)
}

/// `name==version` when the version is known, else the requested spec
pub fn requirement_line(spec: &str, versions: &InstalledPackageVersions) -> String {
    let name = base_name(spec);
    match versions.version_of(name) {
        Some(version) => format!("{}=={}", name, version),
        None => spec.trim().to_string(),
    }
}

/// Append one line per requirement, keeping existing content intact
pub fn append_requirements(current: &str, lines: &[String]) -> String {
    let mut out = String::from(current);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Insert quoted entries directly below the `dependencies = [` line.
///
/// An inline empty list (`dependencies = []`) is expanded. Returns `None`
/// when the manifest has no dependency list.
pub fn insert_dependencies(current: &str, lines: &[String]) -> Option<String> {
    let entries: String = lines
        .iter()
        .map(|l| format!("    \"{}\",\n", toml_escape(l)))
        .collect();

    let mut out = String::with_capacity(current.len() + entries.len());
    let mut inserted = false;

    for line in current.split_inclusive('\n') {
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if !inserted && compact == "dependencies=[" {
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&entries);
            inserted = true;
        } else if !inserted && compact == "dependencies=[]" {
            let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            out.push_str(&format!("{}dependencies = [\n{}{}]\n", indent, entries, indent));
            inserted = true;
        } else {
            out.push_str(line);
        }
    }

    inserted.then_some(out)
}

/// Escape a value for a TOML basic string
fn toml_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Put `import <module>` lines ahead of the existing content
pub fn prepend_imports(current: &str, modules: &[String]) -> String {
    let mut out: String = modules.iter().map(|m| format!("import {}\n", m)).collect();
    if !current.is_empty() {
        out.push('\n');
        out.push_str(current);
    }
    out
}

async fn read(root: &Path, relative: &Path) -> Result<String> {
    let path = root.join(relative);
    fs::read_to_string(&path)
        .await
        .map_err(|source| Error::FileMaterialization { path, source })
}

async fn write(root: &Path, relative: &Path, content: String) -> Result<()> {
    let path = root.join(relative);
    fs::write(&path, content)
        .await
        .map_err(|source| Error::FileMaterialization { path, source })
}
