//! `resolve` and `match` commands.

use super::Outcome;
use super::output::{format_context, write_json, write_line};
use crate::Result;
use crate::resolve::ResolutionContext;
use crate::services::ResolutionService;
use std::io::Write;
use std::path::Path;

/// Runs the full resolution hierarchy.
///
/// In JSON mode an unresolved project prints `null` and still counts as
/// [`Outcome::Done`].
///
/// # Errors
///
/// Returns an error for a malformed configuration file or a failed write.
pub fn cmd_resolve<W: Write>(
    service: &ResolutionService,
    project: Option<&str>,
    cwd: Option<&Path>,
    json: bool,
    out: &mut W,
) -> Result<Outcome> {
    let resolved = service.resolve(project, cwd)?;
    emit(resolved.as_ref(), json, out)
}

/// Matches the working directory against configured code paths only.
///
/// # Errors
///
/// Returns an error for a malformed configuration file or a failed write.
pub fn cmd_match<W: Write>(
    service: &ResolutionService,
    cwd: Option<&Path>,
    json: bool,
    out: &mut W,
) -> Result<Outcome> {
    let matched = service.match_cwd(cwd)?;
    emit(matched.as_ref(), json, out)
}

fn emit<W: Write>(ctx: Option<&ResolutionContext>, json: bool, out: &mut W) -> Result<Outcome> {
    if json {
        write_json(out, &ctx)?;
        return Ok(Outcome::Done);
    }

    match ctx {
        Some(ctx) => {
            write_line(out, &format_context(ctx))?;
            Ok(Outcome::Done)
        },
        None => Ok(Outcome::Unresolved),
    }
}
