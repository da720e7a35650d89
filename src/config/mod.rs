//! Configuration management.
//!
//! The configuration file is a small JSON document that maps project names to
//! their canonical checkout ("code path") and optional memory-location
//! overrides:
//!
//! ```json
//! {
//!   "version": "2.0.0",
//!   "projects": {
//!     "brain": {
//!       "code_path": "/home/me/Dev/brain",
//!       "memories_mode": "CODE",
//!       "disableWorktreeDetection": false
//!     }
//!   }
//! }
//! ```
//!
//! The resolver only reads this file. A missing file is an empty project set;
//! malformed JSON is the one hard failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "BRAIN_CONFIG_PATH";

/// How a project's memory directory is derived.
///
/// The resolver passes this through untouched; only
/// [`crate::services::MemoryLocator`] interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoriesMode {
    /// Memories live under the shared memories root, one directory per project.
    #[default]
    Default,
    /// Memories live inside the project checkout at `docs/memories`.
    Code,
    /// Memories live at the configured `memories_path`.
    Custom,
}

impl MemoriesMode {
    /// Returns the configuration-file spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Code => "CODE",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for MemoriesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the canonical checkout. Empty entries never match.
    #[serde(default, alias = "codePath")]
    pub code_path: PathBuf,
    /// Override for where this project's memories live.
    #[serde(default, alias = "memoriesPath", skip_serializing_if = "Option::is_none")]
    pub memories_path: Option<PathBuf>,
    /// How the memory directory is derived.
    #[serde(default, alias = "memoriesMode", skip_serializing_if = "Option::is_none")]
    pub memories_mode: Option<MemoriesMode>,
    /// Excludes this project from the worktree-fallback re-match.
    #[serde(
        default,
        rename = "disableWorktreeDetection",
        alias = "disable_worktree_detection"
    )]
    pub disable_worktree_detection: bool,
}

impl ProjectConfig {
    /// Creates a project rooted at `code_path` with no overrides.
    #[must_use]
    pub fn new(code_path: impl Into<PathBuf>) -> Self {
        Self {
            code_path: code_path.into(),
            ..Self::default()
        }
    }

    /// Sets the memories path override.
    #[must_use]
    pub fn with_memories_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.memories_path = Some(path.into());
        self
    }

    /// Sets the memories mode.
    #[must_use]
    pub const fn with_memories_mode(mut self, mode: MemoriesMode) -> Self {
        self.memories_mode = Some(mode);
        self
    }

    /// Opts this project out of worktree fallback.
    #[must_use]
    pub const fn with_worktree_detection_disabled(mut self, disabled: bool) -> Self {
        self.disable_worktree_detection = disabled;
        self
    }
}

/// The whole configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BrainConfig {
    /// Schema version string, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Projects keyed by name. Ordered so equal-length matches break ties
    /// deterministically.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
    /// File this configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl BrainConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a project.
    #[must_use]
    pub fn with_project(mut self, name: impl Into<String>, project: ProjectConfig) -> Self {
        self.projects.insert(name.into(), project);
        self
    }

    /// Looks up a project by name.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.get(name)
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if `contents` is not a valid
    /// configuration document. `path` is only used for the error message.
    pub fn parse(contents: &str, path: &Path) -> crate::Result<Self> {
        let mut config: Self =
            serde_json::from_str(contents).map_err(|e| crate::Error::InvalidConfig {
                path: path.to_path_buf(),
                cause: e.to_string(),
            })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the file is malformed, or
    /// [`crate::Error::OperationFailed`] if it exists but cannot be read.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using empty project set");
                return Ok(Self {
                    source: Some(path.to_path_buf()),
                    ..Self::default()
                });
            },
            Err(e) => {
                return Err(crate::Error::OperationFailed {
                    operation: "read_config_file".to_string(),
                    cause: format!("{}: {e}", path.display()),
                });
            },
        };

        Self::parse(&contents, path)
    }
}

/// Returns the default configuration file location.
///
/// `~/.config/brain/config.json` on every platform, so the file can be shared
/// with other tools that read the same document. Falls back to
/// `.brain/config.json` when no home directory can be determined.
#[must_use]
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".brain").join("config.json"),
        |dirs| {
            dirs.home_dir()
                .join(".config")
                .join("brain")
                .join("config.json")
        },
    )
}

/// Picks the configuration file location.
///
/// Precedence: explicit path, then the `BRAIN_CONFIG_PATH` value, then
/// [`default_config_path`]. Blank values are ignored.
#[must_use]
pub fn config_path(explicit: Option<&Path>, env_value: Option<&str>) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return path.to_path_buf();
    }
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return PathBuf::from(value);
    }
    default_config_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "version": "2.0.0",
            "projects": {
                "brain": {
                    "code_path": "/Dev/brain",
                    "memories_path": "/Dev/brain-notes",
                    "memories_mode": "CUSTOM",
                    "disableWorktreeDetection": true
                },
                "other": { "code_path": "/Dev/other" }
            }
        }"#;

        let config = BrainConfig::parse(json, Path::new("config.json")).unwrap();
        assert_eq!(config.version.as_deref(), Some("2.0.0"));
        assert_eq!(config.projects.len(), 2);

        let brain = config.project("brain").unwrap();
        assert_eq!(brain.code_path, PathBuf::from("/Dev/brain"));
        assert_eq!(brain.memories_path, Some(PathBuf::from("/Dev/brain-notes")));
        assert_eq!(brain.memories_mode, Some(MemoriesMode::Custom));
        assert!(brain.disable_worktree_detection);

        let other = config.project("other").unwrap();
        assert_eq!(other.memories_mode, None);
        assert!(!other.disable_worktree_detection);
    }

    #[test]
    fn test_parse_accepts_aliases_and_unknown_keys() {
        let json = r#"{
            "projects": {
                "x": {
                    "codePath": "/repo",
                    "disable_worktree_detection": true,
                    "description": "ignored"
                }
            },
            "ui": { "theme": "dark" }
        }"#;

        let config = BrainConfig::parse(json, Path::new("config.json")).unwrap();
        let project = config.project("x").unwrap();
        assert_eq!(project.code_path, PathBuf::from("/repo"));
        assert!(project.disable_worktree_detection);
    }

    #[test]
    fn test_parse_missing_code_path_is_empty() {
        let config =
            BrainConfig::parse(r#"{"projects":{"x":{}}}"#, Path::new("config.json")).unwrap();
        assert!(config.project("x").unwrap().code_path.as_os_str().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let json = r#"{"projects":{"x":{"code_path":"/repo","memories_mode":"CLOUD"}}}"#;
        let err = BrainConfig::parse(json, Path::new("config.json")).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let config = BrainConfig::load_from_file(&path).unwrap();
        assert!(config.projects.is_empty());
        assert_eq!(config.source, Some(path));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{ not json");

        let err = BrainConfig::load_from_file(&path).unwrap_err();
        match err {
            crate::Error::InvalidConfig { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_valid_file_records_source() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"projects":{"x":{"code_path":"/repo"}}}"#);

        let config = BrainConfig::load_from_file(&path).unwrap();
        assert_eq!(config.source, Some(path));
        assert!(config.project("x").is_some());
    }

    #[test]
    fn test_config_path_precedence() {
        let explicit = Path::new("/explicit.json");
        assert_eq!(
            config_path(Some(explicit), Some("/env.json")),
            PathBuf::from("/explicit.json")
        );
        assert_eq!(
            config_path(None, Some("/env.json")),
            PathBuf::from("/env.json")
        );
        assert_eq!(config_path(None, Some("  ")), default_config_path());
        assert_eq!(config_path(None, None), default_config_path());
    }

    #[test]
    fn test_memories_mode_serde() {
        let mode: MemoriesMode = serde_json::from_str("\"CODE\"").unwrap();
        assert_eq!(mode, MemoriesMode::Code);
        assert_eq!(serde_json::to_string(&MemoriesMode::Custom).unwrap(), "\"CUSTOM\"");
        assert_eq!(MemoriesMode::Default.to_string(), "DEFAULT");
    }

    #[test]
    fn test_builders() {
        let config = BrainConfig::new().with_project(
            "x",
            ProjectConfig::new("/repo")
                .with_memories_mode(MemoriesMode::Code)
                .with_worktree_detection_disabled(true),
        );
        let project = config.project("x").unwrap();
        assert_eq!(project.memories_mode, Some(MemoriesMode::Code));
        assert!(project.disable_worktree_detection);
        assert!(config.project("y").is_none());
    }
}
