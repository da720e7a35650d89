//! Worktree detection policy.

use super::env::ResolveEnv;
use crate::config::ProjectConfig;

/// Combines the global and per-project worktree opt-outs.
///
/// Built once per resolve call. The global toggle stops the detector from
/// running at all. The per-project flag does not: detection still runs and
/// opted-out projects are filtered from the re-match against the main
/// checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionPolicy {
    global_disabled: bool,
}

impl DetectionPolicy {
    /// Creates a policy with the given global toggle.
    #[must_use]
    pub const fn new(global_disabled: bool) -> Self {
        Self { global_disabled }
    }

    /// Creates the policy for a call's environment.
    #[must_use]
    pub const fn from_env(env: &ResolveEnv) -> Self {
        Self::new(env.worktree_detection_disabled)
    }

    /// Whether the worktree detector may run.
    #[must_use]
    pub const fn allows_detection(self) -> bool {
        !self.global_disabled
    }

    /// Whether `project` may be matched through a worktree.
    #[must_use]
    pub const fn admits(self, project: &ProjectConfig) -> bool {
        self.allows_detection() && !project.disable_worktree_detection
    }
}
