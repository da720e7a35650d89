//! Security features.
//!
//! Validation for paths that become the base of writes or deletions.

mod path_guard;

pub use path_guard::{PathRejection, validate_deletion_target, validate_effective_cwd};
