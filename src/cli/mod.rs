//! CLI command implementations.
//!
//! Each command writes its output to a caller-supplied writer and reports
//! whether a project was found, leaving exit codes and stderr hints to the
//! binary.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `resolve` | Run the full resolution hierarchy |
//! | `match` | Match the working directory against configured code paths |
//! | `projects` | List configured projects |
//! | `memories path` | Show where a project's memories live |
//! | `memories clear` | Delete a project's memory directory |
//! | `hook` | Agent hook handlers |
//! | `config path` | Show the effective configuration file |
//!
//! # Example Usage
//!
//! ```bash
//! # Which project is this directory?
//! brain resolve
//!
//! # Same, as JSON, for scripts
//! brain resolve --cwd ~/src/app-feature --json
//!
//! # Where do the notes for "app" go?
//! brain memories path --project app
//! ```

mod hook;
mod memories;
mod output;
mod projects;
mod resolve;

pub use hook::{HookEvent, cmd_hook, read_hook_input};
pub use memories::{cmd_memories_clear, cmd_memories_path};
pub use output::{UNRESOLVED_HINT, format_context, format_location, write_json};
pub use projects::cmd_projects;
pub use resolve::{cmd_match, cmd_resolve};

/// Result of a command that looks up a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command produced its output.
    Done,
    /// No project could be determined.
    Unresolved,
}
