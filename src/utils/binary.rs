//! Synthesis executable resolution and validation.
//!
//! Explicit paths (containing `/` or starting with `~`) are expanded and
//! checked up front. Bare names are left for the operating system to look
//! up on `PATH` at spawn time.

use std::env;
use std::path::{Path, PathBuf};

/// Errors that can occur during executable resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Executable not found: {path}")]
    NotFound { path: String },

    #[error("File is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

/// Get the user's home directory from the HOME environment variable
fn get_home_dir() -> Result<PathBuf, BinaryError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| BinaryError::NoHomeDir)
}

/// Returns true if `name_or_path` names a file rather than a `PATH` lookup
pub fn is_explicit_path(name_or_path: &str) -> bool {
    name_or_path.contains('/') || name_or_path.starts_with('~')
}

/// Resolve an executable given by name or path.
///
/// ```ignore
/// resolve_executable("tacos")           -> tacos
/// resolve_executable("./tacos.sh")      -> ./tacos.sh
/// resolve_executable("~/tacos/run.sh")  -> /home/user/tacos/run.sh
/// ```
pub fn resolve_executable(name_or_path: &str) -> Result<PathBuf, BinaryError> {
    let name_or_path = name_or_path.trim();
    if name_or_path.is_empty() {
        return Err(BinaryError::InvalidPath {
            path: name_or_path.to_string(),
        });
    }

    match name_or_path.strip_prefix("~/") {
        Some(rest) => Ok(get_home_dir()?.join(rest)),
        None if name_or_path == "~" => get_home_dir(),
        None => Ok(PathBuf::from(name_or_path)),
    }
}

/// Validate that an explicit executable path exists and is executable.
pub fn validate_executable(path: &Path) -> Result<(), BinaryError> {
    if !path.exists() {
        return Err(BinaryError::NotFound {
            path: path.display().to_string(),
        });
    }

    let metadata = path.metadata().map_err(|_| BinaryError::InvalidPath {
        path: path.display().to_string(),
    })?;
    if !metadata.is_file() {
        return Err(BinaryError::NotExecutable {
            path: path.display().to_string(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Any execute bit
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(BinaryError::NotExecutable {
                path: path.display().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_bare_name() {
        assert_eq!(resolve_executable("tacos").unwrap(), PathBuf::from("tacos"));
        assert!(!is_explicit_path("tacos"));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        assert_eq!(
            resolve_executable("./tacos.sh").unwrap(),
            PathBuf::from("./tacos.sh")
        );
        assert_eq!(
            resolve_executable("/opt/tacos/tacos.sh").unwrap(),
            PathBuf::from("/opt/tacos/tacos.sh")
        );
        assert!(is_explicit_path("./tacos.sh"));
    }

    #[test]
    fn test_resolve_tilde() {
        let result = resolve_executable("~/tacos/run.sh").unwrap();
        assert!(result.ends_with("tacos/run.sh"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(
            resolve_executable("  "),
            Err(BinaryError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_validate_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            validate_executable(&dir.path().join("absent.sh")),
            Err(BinaryError::NotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("tool.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(
            validate_executable(&script),
            Err(BinaryError::NotExecutable { .. })
        ));

        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(validate_executable(&script).is_ok());
    }
}
