//! Lexical path cleaning.

use std::path::{Component, Path, PathBuf};

/// Cleans a path lexically, without touching the filesystem.
///
/// Drops `.` segments and trailing separators, and folds `name/..` pairs.
/// A `..` directly under the root is dropped (`/..` is `/`). Leading `..`
/// segments of a relative path are kept, so a cleaned relative path may
/// still climb out of its base. An empty path cleans to `.`.
///
/// # Examples
///
/// ```
/// use brain::resolve::clean_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(clean_path(Path::new("/Dev/brain/./apps/../")), PathBuf::from("/Dev/brain"));
/// assert_eq!(clean_path(Path::new("../a/b/..")), PathBuf::from("../a"));
/// ```
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => cleaned.push(component.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                },
                Some(Component::RootDir | Component::Prefix(_)) => {},
                Some(Component::ParentDir | Component::CurDir) | None => cleaned.push(".."),
            },
            Component::Normal(part) => cleaned.push(part),
        }
    }

    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Returns true if `path` still has a `..` segment.
pub(crate) fn has_parent_segment(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}
