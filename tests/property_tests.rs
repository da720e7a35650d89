//! Property-based tests for path matching and cleaning.
//!
//! Uses proptest to verify invariants across random inputs:
//! - A directory inside a code path matches it, at any depth
//! - A sibling sharing a string prefix never matches
//! - The deepest configured code path wins
//! - Resolution is a pure function of its inputs
//! - Path cleaning is idempotent

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use brain::resolve::{
    NoActiveProject, ProjectResolver, ResolveEnv, WorktreeProbe, clean_path, match_all,
};
use brain::security::{PathRejection, validate_effective_cwd};
use brain::{BrainConfig, ProjectConfig, WorktreeDetection};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

struct NoWorktree;

impl WorktreeProbe for NoWorktree {
    fn detect(&self, _dir: &Path) -> Option<WorktreeDetection> {
        None
    }
}

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}"
}

fn absolute(segments: &[String]) -> PathBuf {
    let mut path = PathBuf::from("/");
    for segment in segments {
        path.push(segment);
    }
    path
}

proptest! {
    /// Property: every directory under a code path matches that project.
    #[test]
    fn prop_directory_inside_code_path_matches(
        base in prop::collection::vec(segment(), 1..5),
        extra in prop::collection::vec(segment(), 0..5),
    ) {
        let code_path = absolute(&base);
        let dir = extra.iter().fold(code_path.clone(), |dir, s| dir.join(s));
        let config = BrainConfig::new().with_project("p", ProjectConfig::new(&code_path));

        let found = match_all(&dir, &config.projects).unwrap();
        prop_assert_eq!(found.name, "p");
        prop_assert_eq!(found.matched_path, code_path);
    }

    /// Property: a sibling whose name extends the code path never matches.
    #[test]
    fn prop_sibling_with_shared_prefix_does_not_match(
        base in prop::collection::vec(segment(), 1..5),
        suffix in "[a-zA-Z0-9_-]{1,8}",
    ) {
        let code_path = absolute(&base);
        let sibling = PathBuf::from(format!("{}{suffix}", code_path.display()));
        let config = BrainConfig::new().with_project("p", ProjectConfig::new(&code_path));

        prop_assert!(match_all(&sibling, &config.projects).is_none());
    }

    /// Property: with nested code paths the deeper one wins.
    #[test]
    fn prop_deepest_code_path_wins(
        outer in prop::collection::vec(segment(), 1..4),
        inner in prop::collection::vec(segment(), 1..4),
        rest in prop::collection::vec(segment(), 0..3),
    ) {
        let outer_path = absolute(&outer);
        let inner_path = inner.iter().fold(outer_path.clone(), |dir, s| dir.join(s));
        let dir = rest.iter().fold(inner_path.clone(), |dir, s| dir.join(s));
        // Names are chosen so name order would favour the outer project.
        let config = BrainConfig::new()
            .with_project("a-outer", ProjectConfig::new(&outer_path))
            .with_project("z-inner", ProjectConfig::new(&inner_path));

        let found = match_all(&dir, &config.projects).unwrap();
        prop_assert_eq!(found.name, "z-inner");
    }

    /// Property: resolving twice with the same inputs gives the same answer.
    #[test]
    fn prop_resolution_is_idempotent(
        base in prop::collection::vec(segment(), 1..4),
        cwd in prop::collection::vec(segment(), 1..6),
        explicit in prop::option::of(segment()),
    ) {
        let config = BrainConfig::new().with_project("p", ProjectConfig::new(absolute(&base)));
        let env = ResolveEnv::default();
        let resolver = ProjectResolver::new(&config, &env, &NoActiveProject, &NoWorktree);
        let cwd = absolute(&cwd);

        let first = resolver.resolve(explicit.as_deref(), &cwd);
        let second = resolver.resolve(explicit.as_deref(), &cwd);
        prop_assert_eq!(first, second);
    }

    /// Property: cleaning a cleaned path changes nothing.
    #[test]
    fn prop_clean_path_is_idempotent(
        parts in prop::collection::vec(
            prop_oneof![segment(), Just(".".to_string()), Just("..".to_string())],
            0..8,
        ),
        rooted in any::<bool>(),
    ) {
        let joined = parts.join("/");
        let raw = if rooted { format!("/{joined}") } else { joined };
        let once = clean_path(Path::new(&raw));

        prop_assert_eq!(clean_path(&once), once);
    }

    /// Property: an absolute path never cleans to one that still climbs.
    #[test]
    fn prop_absolute_paths_never_rejected_for_traversal(
        parts in prop::collection::vec(
            prop_oneof![segment(), Just("..".to_string())],
            0..8,
        ),
    ) {
        let raw = format!("/{}", parts.join("/"));
        let result = validate_effective_cwd(Path::new(&raw));

        prop_assert!(!matches!(result, Err(PathRejection::Traversal(_))));
    }
}
