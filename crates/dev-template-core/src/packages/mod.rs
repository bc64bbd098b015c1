//! Package installation and reconciliation into generated files

pub mod installer;
pub mod reconcile;

pub use installer::{install_packages, InstallReport};
pub use reconcile::{reconcile, ReconcileReport};

/// Distribution name without extras, version specifiers or markers
/// (`requests[socks]>=2.0` -> `requests`)
pub fn base_name(spec: &str) -> &str {
    let spec = spec.trim();
    let end = spec
        .find(|c: char| matches!(c, '[' | '<' | '>' | '=' | '!' | '~' | ';' | '@' | ' '))
        .unwrap_or(spec.len());
    spec[..end].trim()
}

/// Module name used for the generated import line
pub fn module_name(spec: &str) -> String {
    base_name(spec)
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
