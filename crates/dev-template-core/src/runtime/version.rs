//! Interpreter version parsing and minimum-version checks

use semver::Version;

/// Oldest Python whose `venv` module produces a usable pip
pub const MIN_PYTHON: &str = "3.8.0";

/// Parse version output such as `Python 3.11.4` or `3.13.0rc1`.
///
/// Only the leading numeric components are kept; missing components are 0.
pub fn parse_version(version_str: &str) -> Option<Version> {
    let raw = version_str.trim();
    let raw = raw.strip_prefix("Python").unwrap_or(raw).trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    let mut parts = [0u64; 3];
    let mut seen = 0;
    for (slot, component) in parts.iter_mut().zip(raw.split('.')) {
        let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            break;
        }
        *slot = digits.parse().ok()?;
        seen += 1;
        if digits.len() != component.len() {
            break;
        }
    }

    (seen > 0).then(|| Version::new(parts[0], parts[1], parts[2]))
}

/// Returns a warning when `found` is older than `minimum`.
/// Unparseable versions produce no warning.
pub fn check_minimum(found: &str, minimum: &str) -> Option<String> {
    let found_ver = parse_version(found)?;
    let min_ver = Version::parse(minimum).ok()?;

    if found_ver < min_ver {
        Some(format!(
            "Python {} or newer is required, found {}",
            minimum, found_ver
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_output() {
        assert_eq!(parse_version("Python 3.11.4"), Some(Version::new(3, 11, 4)));
        assert_eq!(parse_version("3.13.0rc1"), Some(Version::new(3, 13, 0)));
        assert_eq!(parse_version("Python 3.12"), Some(Version::new(3, 12, 0)));
        assert_eq!(parse_version("garbage"), None);
    }

    #[test]
    fn test_older_than_minimum() {
        let warning = check_minimum("Python 3.7.9", MIN_PYTHON);
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("3.8.0"));
    }

    #[test]
    fn test_same_or_newer() {
        assert!(check_minimum("Python 3.8.0", MIN_PYTHON).is_none());
        assert!(check_minimum("Python 3.12.1", MIN_PYTHON).is_none());
    }

    #[test]
    fn test_invalid_versions() {
        assert!(check_minimum("invalid", MIN_PYTHON).is_none());
    }
}
