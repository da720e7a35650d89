//! Direct code-path matching.

use super::path::clean_path;
use crate::config::ProjectConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A project whose code path contains the matched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMatch {
    /// Project name.
    pub name: String,
    /// The project's cleaned code path.
    pub matched_path: PathBuf,
}

/// Finds the project whose code path contains `dir`.
///
/// A project matches when `dir` equals its cleaned code path or starts with
/// the code path followed by a separator, so `/Dev/brain-other` never
/// matches `/Dev/brain`. The longest code path wins; on equal length the
/// first project in name order wins. Projects with an empty code path, and
/// projects `admit` rejects, are skipped.
///
/// `dir` is cleaned before comparison. A code path of `/` only matches `/`
/// itself, since `//` is never a prefix of a cleaned path.
pub fn match_project<F>(
    dir: &Path,
    projects: &BTreeMap<String, ProjectConfig>,
    admit: F,
) -> Option<DirectMatch>
where
    F: Fn(&ProjectConfig) -> bool,
{
    let dir = clean_path(dir);
    let mut best: Option<DirectMatch> = None;

    for (name, project) in projects {
        if project.code_path.as_os_str().is_empty() || !admit(project) {
            continue;
        }

        let code_path = clean_path(&project.code_path);
        if !contains(&code_path, &dir) {
            continue;
        }

        let longer = best.as_ref().is_none_or(|current| {
            code_path.as_os_str().len() > current.matched_path.as_os_str().len()
        });
        if longer {
            best = Some(DirectMatch {
                name: name.clone(),
                matched_path: code_path,
            });
        }
    }

    best
}

/// [`match_project`] with every project admitted.
pub fn match_all(dir: &Path, projects: &BTreeMap<String, ProjectConfig>) -> Option<DirectMatch> {
    match_project(dir, projects, |_| true)
}

/// Returns true if `dir` is `base` or lies under `base + separator`.
fn contains(base: &Path, dir: &Path) -> bool {
    let base = base.as_os_str().as_encoded_bytes();
    let dir = dir.as_os_str().as_encoded_bytes();

    if dir == base {
        return true;
    }

    dir.len() > base.len()
        && dir.starts_with(base)
        && std::path::is_separator(char::from(dir[base.len()]))
}
