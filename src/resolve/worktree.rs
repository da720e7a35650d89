//! Linked worktree detection.
//!
//! When a working directory matches no configured code path, it may still be
//! a secondary checkout (`git worktree add`) of a configured repository. The
//! detector finds the main checkout of such a worktree so the resolver can
//! match against it instead.
//!
//! Detection costs at most one `git` invocation and is skipped entirely for
//! directories with no `.git` entry above them.

use super::path::clean_path;
use super::process::run_with_timeout;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Name of the repository marker entry (a directory in a main checkout, a
/// file in a linked worktree).
const REPO_MARKER: &str = ".git";

/// Variables that would redirect `git` away from the directory under test.
const GIT_ENV_OVERRIDES: &[&str] = &["GIT_DIR", "GIT_WORK_TREE", "GIT_COMMON_DIR"];

/// A positively identified linked worktree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeDetection {
    /// Absolute path to the main checkout.
    pub main_worktree_path: PathBuf,
    /// Always true for a returned detection; the main checkout and
    /// non-repositories produce no detection at all.
    pub is_linked_worktree: bool,
}

/// Something that can tell whether a directory is a linked worktree.
///
/// Implementations never fail; every problem degrades to `None`.
pub trait WorktreeProbe {
    /// Detects the main checkout for `dir`, if `dir` is inside a linked
    /// worktree.
    fn detect(&self, dir: &Path) -> Option<WorktreeDetection>;
}

/// Detects linked worktrees by asking the `git` binary.
///
/// # Examples
///
/// ```rust,ignore
/// use brain::resolve::{WorktreeDetector, WorktreeProbe};
/// use std::path::Path;
///
/// let detector = WorktreeDetector::new();
/// if let Some(found) = detector.detect(Path::new("/home/me/wt/feature-x")) {
///     println!("main checkout: {}", found.main_worktree_path.display());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeDetector {
    git_binary: PathBuf,
    timeout: Duration,
}

impl Default for WorktreeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WorktreeDetector {
    /// Default deadline for the git query.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    /// Creates a detector that runs `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            git_binary: PathBuf::from("git"),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Uses a specific git binary.
    #[must_use]
    pub fn with_git_binary(mut self, git_binary: impl Into<PathBuf>) -> Self {
        self.git_binary = git_binary.into();
        self
    }

    /// Overrides the deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the single combined `rev-parse` query.
    fn query(&self, dir: &Path) -> Option<RevParseOutput> {
        let mut command = Command::new(&self.git_binary);
        command
            .arg("-C")
            .arg(dir)
            .args([
                "rev-parse",
                "--path-format=absolute",
                "--git-common-dir",
                "--git-dir",
                "--is-bare-repository",
            ]);
        for key in GIT_ENV_OVERRIDES {
            command.env_remove(key);
        }

        let output = match run_with_timeout(command, self.timeout) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, dir = %dir.display(), "git metadata query failed");
                return None;
            },
        };

        if !output.status.success() {
            tracing::debug!(
                status = %output.status,
                stderr = %output.stderr.trim(),
                "git metadata query exited unsuccessfully"
            );
            return None;
        }

        let parsed = parse_rev_parse_output(&output.stdout);
        if parsed.is_none() {
            tracing::warn!(
                stdout = %output.stdout.trim(),
                "Unexpected git rev-parse output, ignoring"
            );
        }
        parsed
    }
}

impl WorktreeProbe for WorktreeDetector {
    fn detect(&self, dir: &Path) -> Option<WorktreeDetection> {
        if !dir.is_absolute() {
            return None;
        }

        let Some(repo_root) = find_repo_marker(dir) else {
            tracing::trace!(dir = %dir.display(), "No repository marker, skipping git");
            return None;
        };
        tracing::debug!(repo_root = %repo_root.display(), "Repository marker found");

        let metadata = self.query(dir)?;
        if metadata.is_bare {
            tracing::debug!(dir = %dir.display(), "Bare repository, no worktree fallback");
            return None;
        }

        let common_dir = real_path(&metadata.common_dir);
        let git_dir = real_path(&metadata.git_dir);
        if common_dir == git_dir {
            // Main checkout; the direct matcher already had its chance.
            return None;
        }

        let main_worktree_path = common_dir.parent()?.to_path_buf();
        tracing::debug!(
            dir = %dir.display(),
            main_worktree = %main_worktree_path.display(),
            "Linked worktree detected"
        );

        Some(WorktreeDetection {
            main_worktree_path,
            is_linked_worktree: true,
        })
    }
}

/// Parsed `git rev-parse` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevParseOutput {
    /// `--git-common-dir`: metadata shared by every worktree.
    pub common_dir: PathBuf,
    /// `--git-dir`: metadata of this checkout.
    pub git_dir: PathBuf,
    /// `--is-bare-repository`.
    pub is_bare: bool,
}

/// Parses the three-line `rev-parse` output.
///
/// Any other shape, a relative path, or a boolean other than `true`/`false`
/// yields `None`. Git releases without `--path-format` echo the flag back as
/// an extra line, which lands here as a four-line answer.
#[must_use]
pub fn parse_rev_parse_output(stdout: &str) -> Option<RevParseOutput> {
    let lines: Vec<&str> = stdout.lines().collect();
    let [common_dir, git_dir, is_bare] = lines.as_slice() else {
        return None;
    };

    let common_dir = PathBuf::from(common_dir.trim());
    let git_dir = PathBuf::from(git_dir.trim());
    if !common_dir.is_absolute() || !git_dir.is_absolute() {
        return None;
    }

    let is_bare = match is_bare.trim() {
        "true" => true,
        "false" => false,
        _ => return None,
    };

    Some(RevParseOutput {
        common_dir,
        git_dir,
        is_bare,
    })
}

/// Walks up from `dir` looking for a `.git` entry.
///
/// Returns the directory that holds the marker. The marker may be a file, a
/// directory or a symlink; it is not followed.
#[must_use]
pub fn find_repo_marker(dir: &Path) -> Option<PathBuf> {
    let mut current = clean_path(dir);
    loop {
        if std::fs::symlink_metadata(current.join(REPO_MARKER)).is_ok() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolves symlinks, falling back to the cleaned path.
fn real_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| clean_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ============================================================================
    // rev-parse Output Parsing
    // ============================================================================

    #[test]
    fn test_parse_linked_worktree_output() {
        let parsed =
            parse_rev_parse_output("/repo/.git\n/repo/.git/worktrees/feature\nfalse\n").unwrap();
        assert_eq!(parsed.common_dir, PathBuf::from("/repo/.git"));
        assert_eq!(parsed.git_dir, PathBuf::from("/repo/.git/worktrees/feature"));
        assert!(!parsed.is_bare);
    }

    #[test]
    fn test_parse_bare_output() {
        let parsed = parse_rev_parse_output("/srv/repo.git\n/srv/repo.git\ntrue\n").unwrap();
        assert!(parsed.is_bare);
    }

    #[test]
    fn test_parse_crlf_output() {
        assert!(parse_rev_parse_output("/repo/.git\r\n/repo/.git\r\nfalse\r\n").is_some());
    }

    #[test]
    fn test_parse_rejects_wrong_line_count() {
        assert!(parse_rev_parse_output("").is_none());
        assert!(parse_rev_parse_output("/repo/.git\nfalse\n").is_none());
        assert!(
            parse_rev_parse_output("--path-format=absolute\n/repo/.git\n/repo/.git\nfalse\n")
                .is_none()
        );
    }

    #[test]
    fn test_parse_rejects_relative_paths() {
        assert!(parse_rev_parse_output(".git\n.git\nfalse\n").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_boolean() {
        assert!(parse_rev_parse_output("/repo/.git\n/repo/.git\nmaybe\n").is_none());
    }

    // ============================================================================
    // Marker Pre-check
    // ============================================================================

    #[test]
    fn test_find_marker_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_marker(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_marker_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".git"), "gitdir: /elsewhere\n").unwrap();

        assert_eq!(find_repo_marker(dir.path()), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_detect_skips_git_without_marker() {
        // Temp dirs may sit under a checkout on some CI runners.
        let dir = TempDir::new().unwrap();
        let detector = WorktreeDetector::new().with_git_binary("/nonexistent/git");
        if find_repo_marker(dir.path()).is_none() {
            assert!(detector.detect(dir.path()).is_none());
        }
    }

    #[test]
    fn test_detect_relative_dir_is_none() {
        assert!(WorktreeDetector::new().detect(Path::new("relative/dir")).is_none());
    }

    #[test]
    fn test_detect_missing_git_binary_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let detector = WorktreeDetector::new().with_git_binary("/nonexistent/git");
        assert!(detector.detect(dir.path()).is_none());
    }

    #[test]
    fn test_real_path_falls_back_to_cleaned() {
        assert_eq!(
            real_path(Path::new("/nonexistent/brain/./x/..")),
            PathBuf::from("/nonexistent/brain")
        );
    }
}
