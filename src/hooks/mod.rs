//! Agent hooks.
//!
//! Implements handlers for agent hook events. A hook reads one JSON object
//! on stdin and writes one JSON object on stdout.
//!
//! # Hook Response JSON Format
//!
//! | Event | `hookEventName` | `additionalContext` Content |
//! |-------|-----------------|----------------------------|
//! | Session start | `SessionStart` | Resolved project, effective directory, memory location |
//!
//! ```json
//! {
//!   "hookSpecificOutput": {
//!     "hookEventName": "SessionStart",
//!     "additionalContext": "# Brain Project\n\n..."
//!   }
//! }
//! ```
//!
//! When no project resolves, the response is an empty object `{}`.

mod session_start;

pub use session_start::SessionStartHandler;

use crate::Result;

/// Trait for hook handlers.
pub trait HookHandler: Send + Sync {
    /// The hook event type this handler handles.
    fn event_type(&self) -> &'static str;

    /// Handles the hook event.
    ///
    /// # Errors
    ///
    /// Returns an error if the hook handling fails.
    fn handle(&self, input: &str) -> Result<String>;
}
