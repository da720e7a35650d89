//! Resolution service.

use super::memory_location::{MemoryLocation, MemoryLocator};
use crate::config::{self, BrainConfig, CONFIG_PATH_ENV};
use crate::resolve::{
    ActiveProjectCommand, ActiveProjectSource, NoActiveProject, ProjectResolver,
    ResolutionContext, ResolveEnv, WorktreeDetector, WorktreeProbe,
};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves projects for a surface.
///
/// The configuration file is read fresh on every call, so edits take effect
/// without a restart and concurrent callers share nothing mutable. The
/// environment is captured once, when the service is built.
///
/// # Examples
///
/// ```rust,ignore
/// use brain::services::ResolutionService;
///
/// let service = ResolutionService::from_env(None);
/// match service.resolve(None, None)? {
///     Some(ctx) => println!("{}", ctx.project_name),
///     None => eprintln!("No project; pass --project"),
/// }
/// ```
pub struct ResolutionService {
    config_path: PathBuf,
    env: ResolveEnv,
    active: Arc<dyn ActiveProjectSource + Send + Sync>,
    probe: Arc<dyn WorktreeProbe + Send + Sync>,
    memories: MemoryLocator,
}

impl ResolutionService {
    /// Creates a service over an explicit config path and environment.
    ///
    /// The active-project indicator comes from
    /// [`ResolveEnv::active_project_command`]; worktree detection uses `git`
    /// from `PATH`.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>, env: ResolveEnv) -> Self {
        let active: Arc<dyn ActiveProjectSource + Send + Sync> = match env
            .active_project_command
            .as_deref()
            .and_then(ActiveProjectCommand::parse)
        {
            Some(command) => Arc::new(command),
            None => Arc::new(NoActiveProject),
        };

        Self {
            config_path: config_path.into(),
            env,
            active,
            probe: Arc::new(WorktreeDetector::new()),
            memories: MemoryLocator::new(super::default_memories_root()),
        }
    }

    /// Creates a service from the process environment.
    ///
    /// `config_override` (the `--config` flag) wins over `BRAIN_CONFIG_PATH`.
    #[must_use]
    pub fn from_env(config_override: Option<&Path>) -> Self {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let config_path = config::config_path(config_override, env_path.as_deref());

        Self::new(config_path, ResolveEnv::from_process_env())
            .with_memory_locator(MemoryLocator::from_env())
    }

    /// Replaces the active-project indicator.
    #[must_use]
    pub fn with_active_source(mut self, active: Arc<dyn ActiveProjectSource + Send + Sync>) -> Self {
        self.active = active;
        self
    }

    /// Replaces the worktree probe.
    #[must_use]
    pub fn with_worktree_probe(mut self, probe: Arc<dyn WorktreeProbe + Send + Sync>) -> Self {
        self.probe = probe;
        self
    }

    /// Replaces the memory locator.
    #[must_use]
    pub fn with_memory_locator(mut self, memories: MemoryLocator) -> Self {
        self.memories = memories;
        self
    }

    /// Configuration file this service reads.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Environment captured at construction.
    #[must_use]
    pub const fn env(&self) -> &ResolveEnv {
        &self.env
    }

    /// Reads the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a malformed file.
    pub fn load_config(&self) -> Result<BrainConfig> {
        BrainConfig::load_from_file(&self.config_path)
    }

    /// Runs the full hierarchy. An absent or empty `cwd` means the process
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a malformed configuration file,
    /// or [`Error::OperationFailed`] if `cwd` is omitted and the process
    /// directory cannot be read. An unresolved project is `Ok(None)`.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        cwd: Option<&Path>,
    ) -> Result<Option<ResolutionContext>> {
        let config = self.load_config()?;
        let cwd = working_dir(cwd)?;
        Ok(self.resolver(&config).resolve(explicit, &cwd))
    }

    /// Matches `cwd` against configured code paths only, with worktree
    /// fallback.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub fn match_cwd(&self, cwd: Option<&Path>) -> Result<Option<ResolutionContext>> {
        let config = self.load_config()?;
        let cwd = working_dir(cwd)?;
        Ok(self.resolver(&config).match_cwd(&cwd))
    }

    /// Resolves a project and computes its memory directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`], plus the errors of
    /// [`MemoryLocator::locate`].
    pub fn memory_location(
        &self,
        explicit: Option<&str>,
        cwd: Option<&Path>,
    ) -> Result<Option<MemoryLocation>> {
        let config = self.load_config()?;
        let cwd = working_dir(cwd)?;
        self.resolver(&config)
            .resolve(explicit, &cwd)
            .map(|ctx| self.memories.locate(&config, &ctx))
            .transpose()
    }

    /// Computes the memory directory for an already resolved context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a malformed configuration file,
    /// plus the errors of [`MemoryLocator::locate`].
    pub fn locate(&self, ctx: &ResolutionContext) -> Result<MemoryLocation> {
        let config = self.load_config()?;
        self.memories.locate(&config, ctx)
    }

    fn resolver<'a>(&'a self, config: &'a BrainConfig) -> ProjectResolver<'a> {
        ProjectResolver::new(config, &self.env, &*self.active, &*self.probe)
    }
}

fn working_dir(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd.filter(|cwd| !cwd.as_os_str().is_empty()) {
        Some(cwd) => Ok(cwd.to_path_buf()),
        None => std::env::current_dir().map_err(|e| Error::OperationFailed {
            operation: "current_dir".to_string(),
            cause: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{ResolutionSource, WorktreeDetection};
    use tempfile::TempDir;

    struct LinkedTo(PathBuf);

    impl WorktreeProbe for LinkedTo {
        fn detect(&self, _dir: &Path) -> Option<WorktreeDetection> {
            Some(WorktreeDetection {
                main_worktree_path: self.0.clone(),
                is_linked_worktree: true,
            })
        }
    }

    struct NoWorktree;

    impl WorktreeProbe for NoWorktree {
        fn detect(&self, _dir: &Path) -> Option<WorktreeDetection> {
            None
        }
    }

    fn service_with(contents: Option<&str>, env: ResolveEnv) -> (TempDir, ResolutionService) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        if let Some(contents) = contents {
            std::fs::write(&path, contents).unwrap();
        }
        let service = ResolutionService::new(path, env)
            .with_worktree_probe(Arc::new(NoWorktree))
            .with_memory_locator(MemoryLocator::new(dir.path().join("memories")));
        (dir, service)
    }

    #[test]
    fn test_example_scenario() {
        let (_dir, service) = service_with(
            Some(r#"{"projects":{"x":{"code_path":"/repo"}}}"#),
            ResolveEnv::default(),
        );

        let ctx = service
            .resolve(None, Some(Path::new("/repo/sub/dir")))
            .unwrap()
            .unwrap();
        assert_eq!(ctx.project_name, "x");
        assert_eq!(ctx.effective_cwd, PathBuf::from("/repo/sub/dir"));
        assert!(!ctx.is_worktree_resolved);

        assert!(
            service
                .resolve(None, Some(Path::new("/unrelated")))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let (_dir, service) = service_with(None, ResolveEnv::default());
        assert!(
            service
                .resolve(None, Some(Path::new("/repo")))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let (_dir, service) = service_with(Some("{\"projects\": ["), ResolveEnv::default());
        let err = service.resolve(None, Some(Path::new("/repo"))).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        let err = service.match_cwd(Some(Path::new("/repo"))).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_config_surfaces_even_with_explicit_project() {
        let (_dir, service) = service_with(Some("nope"), ResolveEnv::default());
        assert!(service.resolve(Some("x"), Some(Path::new("/repo"))).is_err());
    }

    #[test]
    fn test_explicit_with_empty_cwd() {
        let (_dir, service) = service_with(None, ResolveEnv::default());

        let ctx = service
            .resolve(Some("x"), Some(Path::new("")))
            .unwrap()
            .unwrap();
        assert_eq!(ctx.project_name, "x");
        assert_eq!(ctx.source, ResolutionSource::Explicit);
        assert!(ctx.effective_cwd.is_absolute());
    }

    #[test]
    fn test_env_project_from_captured_env() {
        let env = ResolveEnv {
            project: Some("from-env".to_string()),
            ..ResolveEnv::default()
        };
        let (_dir, service) = service_with(None, env);

        let ctx = service
            .resolve(None, Some(Path::new("/anywhere")))
            .unwrap()
            .unwrap();
        assert_eq!(ctx.source, ResolutionSource::EnvProject);
    }

    #[test]
    fn test_match_cwd_ignores_env_hierarchy() {
        let env = ResolveEnv {
            project: Some("from-env".to_string()),
            ..ResolveEnv::default()
        };
        let (_dir, service) =
            service_with(Some(r#"{"projects":{"x":{"code_path":"/repo"}}}"#), env);

        let ctx = service.match_cwd(Some(Path::new("/repo/a"))).unwrap().unwrap();
        assert_eq!(ctx.project_name, "x");
        assert_eq!(ctx.source, ResolutionSource::DirectMatch);
    }

    #[test]
    fn test_config_is_read_fresh_each_call() {
        let (dir, service) = service_with(None, ResolveEnv::default());
        assert!(
            service
                .resolve(None, Some(Path::new("/repo")))
                .unwrap()
                .is_none()
        );

        std::fs::write(
            dir.path().join("config.json"),
            r#"{"projects":{"x":{"code_path":"/repo"}}}"#,
        )
        .unwrap();
        assert!(
            service
                .resolve(None, Some(Path::new("/repo")))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_memory_location_follows_worktree() {
        let (dir, service) = service_with(None, ResolveEnv::default());
        let main = dir.path().join("main");
        std::fs::create_dir(&main).unwrap();
        let main = main.canonicalize().unwrap();
        let config = serde_json::json!({
            "projects": { "x": { "code_path": main, "memories_mode": "CODE" } }
        });
        std::fs::write(service.config_path(), config.to_string()).unwrap();

        let service = service.with_worktree_probe(Arc::new(LinkedTo(main.clone())));
        let location = service
            .memory_location(None, Some(Path::new("/elsewhere/wt")))
            .unwrap()
            .unwrap();
        assert_eq!(location.path, main.join("docs").join("memories"));
        assert!(location.from_worktree);
    }

    #[test]
    fn test_memory_location_unresolved_is_none() {
        let (_dir, service) = service_with(None, ResolveEnv::default());
        assert!(
            service
                .memory_location(None, Some(Path::new("/unrelated")))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_indicator_from_env_command() {
        let env = ResolveEnv {
            active_project_command: Some("/nonexistent/brain-indicator".to_string()),
            default_project: Some("fallback".to_string()),
            ..ResolveEnv::default()
        };
        let (_dir, service) = service_with(None, env);

        let ctx = service
            .resolve(None, Some(Path::new("/anywhere")))
            .unwrap()
            .unwrap();
        assert_eq!(ctx.project_name, "fallback");
    }
}
