//! Fabric tool binaries and path resolution.
//!
//! Builders refer to their tool through [`Binary`]. Resolving it to an actual
//! file only happens at execution time, against an optional bin directory.

use std::env;
use std::fmt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Errors that can occur during binary resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary not found: {path}")]
    NotFound { path: String },

    #[error("Binary is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

/// Known network tooling binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binary {
    /// Channel and genesis artifact generator
    Configtxgen,
    /// Config transaction translator
    Configtxlator,
    /// Crypto material generator
    Cryptogen,
}

impl Binary {
    /// Executable name on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Binary::Configtxgen => "configtxgen",
            Binary::Configtxlator => "configtxlator",
            Binary::Cryptogen => "cryptogen",
        }
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Get the user's home directory from the HOME environment variable
fn get_home_dir() -> Result<PathBuf, BinaryError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| BinaryError::NoHomeDir)
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> Result<PathBuf, BinaryError> {
    if path == "~" {
        return get_home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(get_home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

/// Resolve a binary path from a tool name or explicit path.
///
/// Resolution rules:
/// 1. If the name contains `/` or starts with `~`: explicit path, `~` expanded
/// 2. Otherwise, with a bin directory: `{bin_dir}/{name}`
/// 3. Otherwise: the bare name, left to `PATH` lookup
///
/// # Examples
///
/// ```ignore
/// resolve_binary_path("configtxgen", None) -> configtxgen
/// resolve_binary_path("configtxgen", Some("~/fabric/bin")) -> /home/user/fabric/bin/configtxgen
/// resolve_binary_path("/opt/fabric/bin/configtxgen", Some("/ignored")) -> /opt/fabric/bin/configtxgen
/// ```
pub fn resolve_binary_path(name_or_path: &str, bin_dir: Option<&Path>) -> Result<PathBuf, BinaryError> {
    if name_or_path.is_empty() {
        return Err(BinaryError::InvalidPath {
            path: name_or_path.to_string(),
        });
    }

    if name_or_path.contains('/') || name_or_path.starts_with('~') {
        return expand_tilde(name_or_path);
    }

    match bin_dir {
        Some(dir) => {
            let dir = expand_tilde(&dir.to_string_lossy())?;
            Ok(dir.join(name_or_path))
        }
        None => Ok(PathBuf::from(name_or_path)),
    }
}

/// Validate that a binary exists and is executable.
///
/// Only meaningful for resolved paths; bare names are checked by the OS when
/// spawning.
pub fn validate_binary(path: &Path) -> Result<(), BinaryError> {
    if !path.exists() {
        return Err(BinaryError::NotFound {
            path: path.display().to_string(),
        });
    }

    let metadata = path.metadata().map_err(|_| BinaryError::InvalidPath {
        path: path.display().to_string(),
    })?;

    if !metadata.is_file() {
        return Err(BinaryError::InvalidPath {
            path: path.display().to_string(),
        });
    }

    // Any execute bit set
    let mode = metadata.permissions().mode();
    if mode & 0o111 == 0 {
        return Err(BinaryError::NotExecutable {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_binary_names() {
        assert_eq!(Binary::Configtxgen.as_str(), "configtxgen");
        assert_eq!(Binary::Configtxlator.to_string(), "configtxlator");
        assert_eq!(Binary::Cryptogen.as_str(), "cryptogen");
    }

    #[test]
    fn test_resolve_bare_name_without_bin_dir() {
        let result = resolve_binary_path("configtxgen", None).unwrap();
        assert_eq!(result, PathBuf::from("configtxgen"));
    }

    #[test]
    fn test_resolve_with_bin_dir() {
        let result = resolve_binary_path("configtxgen", Some(Path::new("/opt/fabric/bin"))).unwrap();
        assert_eq!(result, PathBuf::from("/opt/fabric/bin/configtxgen"));
    }

    #[test]
    fn test_resolve_explicit_absolute_ignores_bin_dir() {
        let result = resolve_binary_path("/usr/local/bin/configtxgen", Some(Path::new("/opt"))).unwrap();
        assert_eq!(result, PathBuf::from("/usr/local/bin/configtxgen"));
    }

    #[test]
    fn test_resolve_explicit_tilde() {
        if env::var("HOME").is_err() {
            return;
        }
        let result = resolve_binary_path("~/fabric/bin/configtxgen", None).unwrap();
        assert!(result.ends_with("fabric/bin/configtxgen"));
        assert!(!result.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_resolve_empty_name() {
        assert!(matches!(
            resolve_binary_path("", None),
            Err(BinaryError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_validate_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("configtxgen");
        assert!(matches!(validate_binary(&missing), Err(BinaryError::NotFound { .. })));
    }

    #[test]
    fn test_validate_non_executable_and_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configtxgen");
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(validate_binary(&path), Err(BinaryError::NotExecutable { .. })));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(validate_binary(&path).is_ok());
    }

    #[test]
    fn test_validate_directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(validate_binary(dir.path()), Err(BinaryError::InvalidPath { .. })));
    }
}
