//! Project resolution.
//!
//! Decides which configured project a working directory belongs to. The
//! hierarchy, first hit wins:
//!
//! 1. explicit project argument
//! 2. active-project indicator command
//! 3. `BRAIN_PROJECT`, then `BRAIN_DEFAULT_PROJECT`
//! 4. direct code-path match of the working directory
//! 5. worktree fallback: match the main checkout of a linked worktree
//!
//! Everything here is synchronous and reads no process state. Environment
//! values arrive through [`ResolveEnv`], and the two subprocess-backed steps
//! sit behind the [`ActiveProjectSource`] and [`WorktreeProbe`] traits.

mod active;
mod env;
mod matcher;
pub(crate) mod path;
mod policy;
mod process;
mod resolver;
mod worktree;

pub use active::{
    ActiveProjectCommand, ActiveProjectSource, NoActiveProject, interpret_indicator_output,
};
pub use env::{
    ACTIVE_PROJECT_CMD_ENV, DEFAULT_PROJECT_ENV, DISABLE_WORKTREE_DETECTION_ENV, PROJECT_ENV,
    ResolveEnv, is_truthy,
};
pub use matcher::{DirectMatch, match_all, match_project};
pub use path::clean_path;
pub use policy::DetectionPolicy;
pub use process::{CommandFailure, CommandOutput, run_with_timeout};
pub use resolver::{ProjectResolver, ResolutionContext, ResolutionSource};
pub use worktree::{
    RevParseOutput, WorktreeDetection, WorktreeDetector, WorktreeProbe, find_repo_marker,
    parse_rev_parse_output,
};
