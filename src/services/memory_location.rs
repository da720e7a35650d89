//! Memory location translation.
//!
//! Turns a [`ResolutionContext`] into the directory where that project's
//! memories are written. This is where the worktree flag matters: a
//! `CODE`-mode project resolved through a linked worktree writes beneath the
//! main checkout, so that path is re-validated here, at the point of use.
//!
//! # Examples
//!
//! ```rust,ignore
//! use brain::services::MemoryLocator;
//!
//! let locator = MemoryLocator::from_env();
//! let location = locator.locate(&config, &ctx)?;
//! println!("{}", location.path.display());
//! ```

use crate::config::{BrainConfig, MemoriesMode, ProjectConfig};
use crate::resolve::{ResolutionContext, clean_path};
use crate::security::{validate_deletion_target, validate_effective_cwd};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Environment variable overriding the root for `DEFAULT`-mode memories.
pub const MEMORIES_ROOT_ENV: &str = "BRAIN_MEMORIES_ROOT";

/// Subdirectory of a checkout used by `CODE`-mode projects.
pub const CODE_MEMORIES_DIR: &str = "docs/memories";

/// Where a project's memories live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryLocation {
    /// Project the location belongs to.
    pub project_name: String,
    /// Memory directory.
    pub path: PathBuf,
    /// Mode that produced the path.
    pub mode: MemoriesMode,
    /// True when the path was derived from a worktree-resolved directory.
    pub from_worktree: bool,
}

/// Derives memory directories from resolution results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocator {
    memories_root: PathBuf,
}

impl MemoryLocator {
    /// Creates a locator with `memories_root` as the `DEFAULT`-mode root.
    #[must_use]
    pub fn new(memories_root: impl Into<PathBuf>) -> Self {
        Self {
            memories_root: memories_root.into(),
        }
    }

    /// Creates a locator from `BRAIN_MEMORIES_ROOT`, or the platform data
    /// directory.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(MEMORIES_ROOT_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map_or_else(|| Self::new(default_memories_root()), Self::new)
    }

    /// Root for `DEFAULT`-mode memories.
    #[must_use]
    pub fn memories_root(&self) -> &Path {
        &self.memories_root
    }

    /// Computes the memory directory for a resolved project.
    ///
    /// | Mode | Directory |
    /// |------|-----------|
    /// | `CUSTOM` (or no mode with `memories_path` set) | `memories_path` |
    /// | `CODE` | `<code_path>/docs/memories`, or `<effective_cwd>/docs/memories` when worktree-resolved |
    /// | `DEFAULT`, or project not configured | `<memories_root>/<project>` |
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the project name is not a single plain
    ///   path component (it is used as a directory name).
    /// - [`Error::InvalidConfig`] if a `CUSTOM` project lacks an absolute
    ///   `memories_path`, or a `CODE` project lacks a `code_path`.
    /// - [`Error::PathRejected`] if a worktree-resolved base fails
    ///   re-validation.
    pub fn locate(&self, config: &BrainConfig, ctx: &ResolutionContext) -> Result<MemoryLocation> {
        let name = ctx.project_name.as_str();
        let project = config.project(name);
        let mode = project.map_or(MemoriesMode::Default, effective_mode);

        let path = match (mode, project) {
            (MemoriesMode::Custom, Some(project)) => custom_path(config, name, project)?,
            (MemoriesMode::Code, Some(project)) => code_base(config, name, project, ctx)?
                .join(CODE_MEMORIES_DIR),
            _ => self.memories_root.join(plain_component(name)?),
        };

        tracing::debug!(
            project = %name,
            mode = %mode,
            path = %path.display(),
            "Memory location computed"
        );

        Ok(MemoryLocation {
            project_name: ctx.project_name.clone(),
            path,
            mode,
            from_worktree: ctx.is_worktree_resolved && mode == MemoriesMode::Code,
        })
    }
}

/// Default root for `DEFAULT`-mode memories.
#[must_use]
pub fn default_memories_root() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".brain").join("memories"),
        |dirs| dirs.data_local_dir().join("brain").join("memories"),
    )
}

/// Deletes a memory directory after validating it as a deletion target.
///
/// Returns `false` if there was nothing to delete.
///
/// # Errors
///
/// Returns [`Error::PathRejected`] for protected or malformed targets, or
/// [`Error::OperationFailed`] if removal fails.
pub fn clear_memories(location: &MemoryLocation) -> Result<bool> {
    let target = validate_deletion_target(&location.path)?;
    if !target.exists() {
        return Ok(false);
    }

    std::fs::remove_dir_all(&target).map_err(|e| Error::OperationFailed {
        operation: "clear_memories".to_string(),
        cause: format!("{}: {e}", target.display()),
    })?;
    tracing::info!(project = %location.project_name, path = %target.display(), "Memories cleared");
    Ok(true)
}

fn effective_mode(project: &ProjectConfig) -> MemoriesMode {
    match (project.memories_mode, &project.memories_path) {
        (Some(mode), _) => mode,
        (None, Some(_)) => MemoriesMode::Custom,
        (None, None) => MemoriesMode::Default,
    }
}

fn custom_path(config: &BrainConfig, name: &str, project: &ProjectConfig) -> Result<PathBuf> {
    match &project.memories_path {
        Some(path) if path.is_absolute() => Ok(clean_path(path)),
        Some(path) => Err(invalid_config(
            config,
            format!(
                "project '{name}' has a relative memories_path: {}",
                path.display()
            ),
        )),
        None => Err(invalid_config(
            config,
            format!("project '{name}' uses CUSTOM memories_mode without a memories_path"),
        )),
    }
}

fn code_base(
    config: &BrainConfig,
    name: &str,
    project: &ProjectConfig,
    ctx: &ResolutionContext,
) -> Result<PathBuf> {
    if ctx.is_worktree_resolved {
        return Ok(validate_effective_cwd(&ctx.effective_cwd)?);
    }
    if project.code_path.as_os_str().is_empty() {
        return Err(invalid_config(
            config,
            format!("project '{name}' uses CODE memories_mode without a code_path"),
        ));
    }
    Ok(validate_effective_cwd(&project.code_path)?)
}

fn plain_component(name: &str) -> Result<&Path> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(Error::InvalidInput(format!(
            "project name '{name}' cannot be used as a directory name"
        ))),
    }
}

fn invalid_config(config: &BrainConfig, cause: String) -> Error {
    Error::InvalidConfig {
        path: config.source.clone().unwrap_or_default(),
        cause,
    }
}
