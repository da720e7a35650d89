//! Resolution orchestrator.

use super::active::ActiveProjectSource;
use super::env::ResolveEnv;
use super::matcher::{match_all, match_project};
use super::path::clean_path;
use super::policy::DetectionPolicy;
use super::worktree::WorktreeProbe;
use crate::config::{BrainConfig, ProjectConfig};
use crate::security::validate_effective_cwd;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which hierarchy level produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The caller named the project.
    Explicit,
    /// The active-project indicator command answered.
    ActiveProject,
    /// `BRAIN_PROJECT` was set.
    EnvProject,
    /// `BRAIN_DEFAULT_PROJECT` was set.
    EnvDefaultProject,
    /// The working directory is inside a configured code path.
    DirectMatch,
    /// The working directory is a linked worktree of a configured checkout.
    WorktreeMatch,
}

impl ResolutionSource {
    /// Returns the wire name of the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::ActiveProject => "active_project",
            Self::EnvProject => "env_project",
            Self::EnvDefaultProject => "env_default_project",
            Self::DirectMatch => "direct_match",
            Self::WorktreeMatch => "worktree_match",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved project and the directory it was resolved from.
///
/// `effective_cwd` is always absolute and free of `..` segments. For a
/// worktree match it is the main checkout, not the caller's directory, and
/// anything that writes beneath it must re-validate it first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionContext {
    /// Resolved project name.
    pub project_name: String,
    /// Directory that matched, or the caller's directory for levels that do
    /// not match paths.
    pub effective_cwd: PathBuf,
    /// True only for a worktree-fallback match.
    pub is_worktree_resolved: bool,
    /// Hierarchy level that answered.
    pub source: ResolutionSource,
}

impl ResolutionContext {
    fn named(project_name: String, cwd: &Path, source: ResolutionSource) -> Self {
        Self {
            project_name,
            effective_cwd: cwd.to_path_buf(),
            is_worktree_resolved: false,
            source,
        }
    }
}

/// Runs the resolution hierarchy over explicit inputs.
///
/// Holds borrowed inputs for one call; build a new one per call so
/// configuration and environment are never stale.
pub struct ProjectResolver<'a> {
    config: &'a BrainConfig,
    env: &'a ResolveEnv,
    active: &'a dyn ActiveProjectSource,
    probe: &'a dyn WorktreeProbe,
}

impl<'a> ProjectResolver<'a> {
    /// Creates a resolver over the given inputs.
    #[must_use]
    pub fn new(
        config: &'a BrainConfig,
        env: &'a ResolveEnv,
        active: &'a dyn ActiveProjectSource,
        probe: &'a dyn WorktreeProbe,
    ) -> Self {
        Self {
            config,
            env,
            active,
            probe,
        }
    }

    /// Resolves the project for `cwd`, trying each level once in order.
    ///
    /// `None` is a normal outcome: the caller should ask for an explicit
    /// project. A non-empty `explicit` name is returned verbatim. An empty
    /// `cwd` stands for the process directory.
    pub fn resolve(&self, explicit: Option<&str>, cwd: &Path) -> Option<ResolutionContext> {
        let Some(cwd) = normalize_cwd(cwd) else {
            tracing::warn!("Working directory cannot be made absolute, not resolving");
            return None;
        };

        if let Some(name) = explicit.filter(|name| !name.is_empty()) {
            tracing::debug!(project = %name, "Resolved from explicit argument");
            return Some(ResolutionContext::named(
                name.to_string(),
                &cwd,
                ResolutionSource::Explicit,
            ));
        }

        if let Some(name) = self.active.active_project() {
            tracing::debug!(project = %name, "Resolved from active-project indicator");
            return Some(ResolutionContext::named(
                name,
                &cwd,
                ResolutionSource::ActiveProject,
            ));
        }

        if let Some(name) = &self.env.project {
            tracing::debug!(project = %name, "Resolved from BRAIN_PROJECT");
            return Some(ResolutionContext::named(
                name.clone(),
                &cwd,
                ResolutionSource::EnvProject,
            ));
        }

        if let Some(name) = &self.env.default_project {
            tracing::debug!(project = %name, "Resolved from BRAIN_DEFAULT_PROJECT");
            return Some(ResolutionContext::named(
                name.clone(),
                &cwd,
                ResolutionSource::EnvDefaultProject,
            ));
        }

        self.match_normalized(&cwd)
    }

    /// Matches `cwd` against configured code paths only, with worktree
    /// fallback. Ignores the explicit, indicator and environment levels.
    pub fn match_cwd(&self, cwd: &Path) -> Option<ResolutionContext> {
        normalize_cwd(cwd).and_then(|cwd| self.match_normalized(&cwd))
    }

    fn match_normalized(&self, cwd: &Path) -> Option<ResolutionContext> {
        if let Some(found) = match_all(cwd, &self.config.projects) {
            tracing::debug!(
                project = %found.name,
                code_path = %found.matched_path.display(),
                "Resolved from working directory"
            );
            return Some(ResolutionContext::named(
                found.name,
                cwd,
                ResolutionSource::DirectMatch,
            ));
        }

        self.worktree_fallback(cwd)
    }

    fn worktree_fallback(&self, cwd: &Path) -> Option<ResolutionContext> {
        let policy = DetectionPolicy::from_env(self.env);
        if !policy.allows_detection() {
            tracing::debug!("Worktree detection disabled by environment");
            return None;
        }

        let detection = self.probe.detect(cwd)?;
        if !detection.is_linked_worktree {
            return None;
        }

        let main_worktree = match validate_effective_cwd(&detection.main_worktree_path) {
            Ok(path) => path,
            Err(rejection) => {
                tracing::warn!(
                    path = %detection.main_worktree_path.display(),
                    %rejection,
                    "Rejected worktree-derived path"
                );
                return None;
            },
        };

        let projects = with_resolved_code_paths(&self.config.projects);
        let found = match_project(&main_worktree, &projects, |project| policy.admits(project))?;
        tracing::debug!(
            project = %found.name,
            main_worktree = %main_worktree.display(),
            "Resolved through linked worktree"
        );

        Some(ResolutionContext {
            project_name: found.name,
            effective_cwd: main_worktree,
            is_worktree_resolved: true,
            source: ResolutionSource::WorktreeMatch,
        })
    }
}

/// Resolves symlinks in each code path so it compares equal to the canonical
/// main checkout. Paths that cannot be resolved are kept as configured.
fn with_resolved_code_paths(
    projects: &BTreeMap<String, ProjectConfig>,
) -> BTreeMap<String, ProjectConfig> {
    projects
        .iter()
        .map(|(name, project)| {
            let mut project = project.clone();
            if let Ok(resolved) = project.code_path.canonicalize() {
                project.code_path = resolved;
            }
            (name.clone(), project)
        })
        .collect()
}

/// Makes `cwd` absolute against the process directory and cleans it.
///
/// The empty path is the process directory. Fails only when that directory
/// cannot be read.
fn normalize_cwd(cwd: &Path) -> Option<PathBuf> {
    let cwd = if cwd.as_os_str().is_empty() {
        Path::new(".")
    } else {
        cwd
    };
    std::path::absolute(cwd).ok().map(|path| clean_path(&path))
}
