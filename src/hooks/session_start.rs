//! Session start hook handler.

use super::HookHandler;
use crate::resolve::{ResolutionContext, ResolutionSource};
use crate::services::{MemoryLocation, ResolutionService};
use crate::{Error, Result};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// Handles `SessionStart` hook events.
///
/// Resolves the project for the session's working directory and injects it
/// as additional context, so the agent knows which project's memories it is
/// working with before the first prompt.
pub struct SessionStartHandler {
    service: Arc<ResolutionService>,
}

impl SessionStartHandler {
    /// Creates a handler backed by `service`.
    #[must_use]
    pub const fn new(service: Arc<ResolutionService>) -> Self {
        Self { service }
    }

    fn build_context(ctx: &ResolutionContext, location: Option<&MemoryLocation>) -> String {
        let mut context = String::from("# Brain Project\n\n");
        let _ = writeln!(context, "Project: **{}**", ctx.project_name);
        let _ = writeln!(context, "Directory: `{}`", ctx.effective_cwd.display());

        if ctx.is_worktree_resolved {
            context.push_str(
                "Resolved through a linked git worktree; memories follow the main checkout.\n",
            );
        } else if ctx.source != ResolutionSource::DirectMatch {
            let _ = writeln!(context, "Resolved from: {}", ctx.source);
        }

        if let Some(location) = location {
            let _ = writeln!(
                context,
                "Memories: `{}` ({})",
                location.path.display(),
                location.mode
            );
        }

        context
    }
}

impl HookHandler for SessionStartHandler {
    fn event_type(&self) -> &'static str {
        "SessionStart"
    }

    #[instrument(skip(self, input), fields(hook = "SessionStart"))]
    fn handle(&self, input: &str) -> Result<String> {
        let input_json: serde_json::Value =
            serde_json::from_str(input).unwrap_or_else(|_| serde_json::json!({}));

        let cwd = input_json
            .get("cwd")
            .and_then(|v| v.as_str())
            .filter(|cwd| !cwd.trim().is_empty())
            .map(Path::new);

        let Some(ctx) = self.service.resolve(None, cwd)? else {
            tracing::debug!("No project resolved for session");
            return Ok("{}".to_string());
        };

        let location = match self.service.locate(&ctx) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!(error = %e, project = %ctx.project_name, "Memory location unavailable");
                None
            },
        };

        let response = serde_json::json!({
            "hookSpecificOutput": {
                "hookEventName": self.event_type(),
                "additionalContext": Self::build_context(&ctx, location.as_ref()),
            }
        });

        serde_json::to_string(&response).map_err(|e| Error::OperationFailed {
            operation: "serialize_response".to_string(),
            cause: e.to_string(),
        })
    }
}
