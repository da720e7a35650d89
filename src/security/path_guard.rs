//! Path safety guard.
//!
//! Paths derived from subprocess output (the main checkout of a linked
//! worktree) or about to be deleted are validated here before use. Symlinks
//! are resolved at validation time, so callers re-validate at the point of
//! use rather than trusting an earlier answer.

use crate::resolve::clean_path;
use crate::resolve::path::has_parent_segment;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

/// Directories that may never be deleted themselves.
const PROTECTED_DIRS: &[&str] = &[
    "/",
    "/Applications",
    "/Library",
    "/Users",
    "/Volumes",
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/home",
    "/lib",
    "/lib64",
    "/opt",
    "/private",
    "/proc",
    "/root",
    "/sbin",
    "/srv",
    "/sys",
    "/tmp",
    "/usr",
    "/var",
    "/System",
];

/// Directories whose entire contents are off limits.
const PROTECTED_TREES: &[&str] = &[
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/lib",
    "/lib64",
    "/private/etc",
    "/proc",
    "/sbin",
    "/sys",
    "/usr",
    "/System",
];

/// Home subdirectories whose entire contents are off limits.
const PROTECTED_HOME_TREES: &[&str] = &[".ssh", ".gnupg", ".aws"];

/// Home subdirectories that may not be deleted themselves.
const PROTECTED_HOME_DIRS: &[&str] = &[".config", ".local", ".local/share", ".cache"];

/// Why a path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum PathRejection {
    /// The path was empty.
    #[error("path is empty")]
    Empty,

    /// The path contained a NUL byte.
    #[error("path contains a null byte")]
    NullByte,

    /// The path was relative.
    #[error("path is not absolute: {}", .0.display())]
    NotAbsolute(PathBuf),

    /// The cleaned path still climbs with `..`.
    #[error("path contains a parent-directory segment: {}", .0.display())]
    Traversal(PathBuf),

    /// The path is a system or home-protected directory.
    #[error("path is protected: {}", .0.display())]
    Protected(PathBuf),
}

/// Validates a directory that will be used as a base for writes.
///
/// Rejects empty input, input with a NUL byte, relative input, and input
/// whose cleaned form still has a `..` segment. Returns the cleaned path
/// with symlinks resolved, or just the cleaned path if it cannot be
/// resolved (for example because it does not exist yet).
///
/// # Errors
///
/// Returns the [`PathRejection`] describing the first failed check.
///
/// # Examples
///
/// ```
/// use brain::security::{PathRejection, validate_effective_cwd};
/// use std::path::Path;
///
/// assert!(validate_effective_cwd(Path::new("/nonexistent/brain/../repo")).is_ok());
/// assert_eq!(validate_effective_cwd(Path::new("")), Err(PathRejection::Empty));
/// ```
pub fn validate_effective_cwd(path: &Path) -> Result<PathBuf, PathRejection> {
    if path.as_os_str().is_empty() {
        return Err(PathRejection::Empty);
    }
    if path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(PathRejection::NullByte);
    }
    if !path.is_absolute() {
        return Err(PathRejection::NotAbsolute(path.to_path_buf()));
    }

    let cleaned = clean_path(path);
    if has_parent_segment(&cleaned) {
        return Err(PathRejection::Traversal(cleaned));
    }

    Ok(std::fs::canonicalize(&cleaned).unwrap_or(cleaned))
}

/// Validates a directory that is about to be deleted.
///
/// Applies every [`validate_effective_cwd`] check, then refuses the
/// filesystem root, well-known system directories, anything inside system
/// trees, the home directory and its ancestors, and sensitive dot
/// directories under home. Both the cleaned and the symlink-resolved forms
/// are checked, so a symlink to `/etc` is refused.
///
/// # Errors
///
/// Returns the [`PathRejection`] describing the first failed check.
pub fn validate_deletion_target(path: &Path) -> Result<PathBuf, PathRejection> {
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    validate_deletion_target_with_home(path, home.as_deref())
}

/// [`validate_deletion_target`] with an explicit home directory.
pub(crate) fn validate_deletion_target_with_home(
    path: &Path,
    home: Option<&Path>,
) -> Result<PathBuf, PathRejection> {
    let resolved = validate_effective_cwd(path)?;
    let cleaned = clean_path(path);

    let homes: Vec<PathBuf> = home
        .into_iter()
        .flat_map(|home| {
            let cleaned_home = clean_path(home);
            let real_home = std::fs::canonicalize(&cleaned_home).ok();
            std::iter::once(cleaned_home).chain(real_home)
        })
        .collect();

    for candidate in [&cleaned, &resolved] {
        if is_protected(candidate, &homes) {
            tracing::warn!(path = %candidate.display(), "Refusing to delete protected path");
            return Err(PathRejection::Protected(candidate.clone()));
        }
    }

    Ok(resolved)
}

fn is_protected(path: &Path, homes: &[PathBuf]) -> bool {
    if PROTECTED_DIRS.iter().any(|dir| path == Path::new(dir)) {
        return true;
    }
    if PROTECTED_TREES
        .iter()
        .any(|tree| path.starts_with(Path::new(tree)))
    {
        return true;
    }

    homes.iter().any(|home| {
        // The home directory itself, or any of its ancestors.
        home.starts_with(path)
            || PROTECTED_HOME_TREES
                .iter()
                .any(|tree| path.starts_with(home.join(tree)))
            || PROTECTED_HOME_DIRS
                .iter()
                .any(|dir| path == home.join(dir))
    })
}
