//! Environment adapter.
//!
//! Resolution never reads the process environment itself. The call boundary
//! gathers everything once into a [`ResolveEnv`] and hands it down.

/// First-priority project override.
pub const PROJECT_ENV: &str = "BRAIN_PROJECT";

/// Second-priority project override.
pub const DEFAULT_PROJECT_ENV: &str = "BRAIN_DEFAULT_PROJECT";

/// Global opt-out of worktree fallback (`1` or `true`).
pub const DISABLE_WORKTREE_DETECTION_ENV: &str = "BRAIN_DISABLE_WORKTREE_DETECTION";

/// Command line of the active-project indicator.
pub const ACTIVE_PROJECT_CMD_ENV: &str = "BRAIN_ACTIVE_PROJECT_CMD";

/// Environment-derived resolution inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveEnv {
    /// Value of `BRAIN_PROJECT`.
    pub project: Option<String>,
    /// Value of `BRAIN_DEFAULT_PROJECT`.
    pub default_project: Option<String>,
    /// Whether `BRAIN_DISABLE_WORKTREE_DETECTION` is set truthy.
    pub worktree_detection_disabled: bool,
    /// Value of `BRAIN_ACTIVE_PROJECT_CMD`.
    pub active_project_command: Option<String>,
}

impl ResolveEnv {
    /// Builds the inputs from an arbitrary lookup function.
    ///
    /// Blank values count as unset. Values are trimmed.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            project: read(PROJECT_ENV),
            default_project: read(DEFAULT_PROJECT_ENV),
            worktree_detection_disabled: read(DISABLE_WORKTREE_DETECTION_ENV)
                .is_some_and(|value| is_truthy(&value)),
            active_project_command: read(ACTIVE_PROJECT_CMD_ENV),
        }
    }

    /// Reads the inputs from the process environment.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Returns true for `1` or any casing of `true`.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn env_from(pairs: &[(&str, &str)]) -> ResolveEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ResolveEnv::from_lookup(|key| map.get(key).cloned())
    }

    #[test_case("1", true)]
    #[test_case("true", true)]
    #[test_case("TRUE", true)]
    #[test_case("True", true)]
    #[test_case(" true ", true)]
    #[test_case("0", false)]
    #[test_case("false", false)]
    #[test_case("yes", false)]
    #[test_case("", false)]
    fn test_is_truthy(value: &str, expected: bool) {
        assert_eq!(is_truthy(value), expected);
    }

    #[test]
    fn test_reads_all_variables() {
        let env = env_from(&[
            (PROJECT_ENV, "brain"),
            (DEFAULT_PROJECT_ENV, "fallback"),
            (DISABLE_WORKTREE_DETECTION_ENV, "1"),
            (ACTIVE_PROJECT_CMD_ENV, "brain-ctl active"),
        ]);

        assert_eq!(env.project.as_deref(), Some("brain"));
        assert_eq!(env.default_project.as_deref(), Some("fallback"));
        assert!(env.worktree_detection_disabled);
        assert_eq!(env.active_project_command.as_deref(), Some("brain-ctl active"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let env = env_from(&[(PROJECT_ENV, "   "), (DEFAULT_PROJECT_ENV, "")]);
        assert_eq!(env, ResolveEnv::default());
    }

    #[test]
    fn test_empty_environment() {
        assert_eq!(env_from(&[]), ResolveEnv::default());
    }
}
