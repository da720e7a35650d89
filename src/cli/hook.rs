//! Hook commands.
//!
//! Hooks are invoked by the agent at lifecycle events, with the event
//! payload as JSON on stdin and the response as JSON on stdout.
//!
//! ```json
//! {
//!   "hooks": {
//!     "SessionStart": [{ "type": "command", "command": "brain hook session-start" }]
//!   }
//! }
//! ```

use super::output::write_line;
use crate::hooks::{HookHandler, SessionStartHandler};
use crate::services::ResolutionService;
use crate::{Error, Result};
use clap::Subcommand;
use std::io::{Read, Write};
use std::sync::Arc;

/// Hook events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum HookEvent {
    /// Session start hook.
    SessionStart,
}

impl HookEvent {
    /// Returns the hook event as a lowercase hyphenated string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "session-start",
        }
    }
}

/// Runs a hook handler on `input` and writes its response.
///
/// # Errors
///
/// Returns the handler's error or a failed write.
pub fn cmd_hook<W: Write>(
    service: Arc<ResolutionService>,
    event: HookEvent,
    input: &str,
    out: &mut W,
) -> Result<()> {
    tracing::debug!(event = event.as_str(), "Running hook");
    let response = match event {
        HookEvent::SessionStart => SessionStartHandler::new(service).handle(input)?,
    };
    write_line(out, &response)
}

/// Reads hook input. Blank input becomes `{}`.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if reading fails.
pub fn read_hook_input<R: Read>(mut reader: R) -> Result<String> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| Error::OperationFailed {
            operation: "read_hook_input".to_string(),
            cause: e.to_string(),
        })?;

    if input.trim().is_empty() {
        Ok("{}".to_string())
    } else {
        Ok(input)
    }
}
