//! Python interpreter detection

use crate::error::{Error, Result};
use crate::runtime::version::{check_minimum, MIN_PYTHON};
use std::process::Command;

/// Interpreter names tried in order when none is given explicitly
pub const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// Command used to invoke the runtime
    pub command: String,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether `command --version` runs successfully
pub fn check_python(command: &str) -> RuntimeInfo {
    let output = Command::new(command).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            // Python 2 printed its version on stderr
            let raw = if out.stdout.is_empty() {
                &out.stderr
            } else {
                &out.stdout
            };
            let version = String::from_utf8_lossy(raw).trim().to_string();
            RuntimeInfo {
                command: command.to_string(),
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            command: command.to_string(),
            version: None,
            available: false,
        },
    }
}

/// Find a usable interpreter: the explicit one if given, else the first
/// available candidate. Interpreters older than the supported minimum are
/// rejected.
pub fn find_python(explicit: Option<&str>) -> Result<RuntimeInfo> {
    let candidates: Vec<&str> = match explicit {
        Some(cmd) => vec![cmd],
        None => PYTHON_CANDIDATES.to_vec(),
    };

    let info = candidates
        .iter()
        .map(|cmd| check_python(cmd))
        .find(|info| info.available)
        .ok_or_else(|| Error::Interpreter {
            message: format!(
                "none of {} found (install from https://python.org)",
                candidates.join(", ")
            ),
        })?;

    if let Some(warning) = info
        .version
        .as_deref()
        .and_then(|v| check_minimum(v, MIN_PYTHON))
    {
        return Err(Error::Interpreter { message: warning });
    }

    tracing::info!(
        command = %info.command,
        version = info.version.as_deref().unwrap_or("unknown"),
        "python interpreter found"
    );
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_unavailable() {
        let info = check_python("dev-template-no-such-python");
        assert!(!info.available);
        assert!(info.version.is_none());
    }

    #[test]
    fn test_explicit_missing_interpreter_errors() {
        let err = find_python(Some("dev-template-no-such-python")).unwrap_err();
        assert!(matches!(err, Error::Interpreter { .. }));
        assert!(err.to_string().contains("dev-template-no-such-python"));
    }
}
