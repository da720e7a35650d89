//! Output formatting shared by the commands.

use crate::resolve::ResolutionContext;
use crate::services::MemoryLocation;
use crate::{Error, Result};
use serde::Serialize;
use std::io::Write;

/// Hint printed when no project is resolved.
pub const UNRESOLVED_HINT: &str = "No project resolved. Pass --project, set BRAIN_PROJECT, \
                                   or add this directory to the brain configuration.";

/// Renders a resolution context as text.
#[must_use]
pub fn format_context(ctx: &ResolutionContext) -> String {
    let mut lines = vec![
        format!("project:   {}", ctx.project_name),
        format!("directory: {}", ctx.effective_cwd.display()),
        format!("source:    {}", ctx.source),
    ];
    if ctx.is_worktree_resolved {
        lines.push("worktree:  yes".to_string());
    }
    lines.join("\n")
}

/// Renders a memory location as text.
#[must_use]
pub fn format_location(location: &MemoryLocation) -> String {
    let mut text = format!(
        "{} ({}, project {})",
        location.path.display(),
        location.mode,
        location.project_name
    );
    if location.from_worktree {
        text.push_str(" via worktree");
    }
    text
}

/// Writes `value` as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized, W: Write>(out: &mut W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| Error::OperationFailed {
        operation: "serialize_output".to_string(),
        cause: e.to_string(),
    })?;
    write_line(out, &json)
}

pub(super) fn write_line<W: Write>(out: &mut W, line: &str) -> Result<()> {
    writeln!(out, "{line}").map_err(|e| Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoriesMode;
    use crate::resolve::ResolutionSource;

    fn ctx(worktree: bool) -> ResolutionContext {
        ResolutionContext {
            project_name: "app".to_string(),
            effective_cwd: "/src/app".into(),
            is_worktree_resolved: worktree,
            source: if worktree {
                ResolutionSource::WorktreeMatch
            } else {
                ResolutionSource::DirectMatch
            },
        }
    }

    #[test]
    fn test_format_context() {
        let text = format_context(&ctx(false));
        assert!(text.contains("project:   app"));
        assert!(text.contains("source:    direct_match"));
        assert!(!text.contains("worktree"));
    }

    #[test]
    fn test_format_context_worktree() {
        assert!(format_context(&ctx(true)).contains("worktree:  yes"));
    }

    #[test]
    fn test_format_location() {
        let location = MemoryLocation {
            project_name: "app".to_string(),
            path: "/data/app".into(),
            mode: MemoriesMode::Default,
            from_worktree: false,
        };
        assert_eq!(format_location(&location), "/data/app (DEFAULT, project app)");
    }

    #[test]
    fn test_write_json_null() {
        let mut out = Vec::new();
        write_json(&mut out, &Option::<ResolutionContext>::None).unwrap();
        assert_eq!(out, b"null\n");
    }
}
