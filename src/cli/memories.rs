//! `memories` commands.

use super::Outcome;
use super::output::{format_location, write_json, write_line};
use crate::services::{ResolutionService, clear_memories};
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Shows where the resolved project's memories live.
///
/// # Errors
///
/// Returns an error for a malformed configuration, an invalid memories
/// setting, or a failed write.
pub fn cmd_memories_path<W: Write>(
    service: &ResolutionService,
    project: Option<&str>,
    cwd: Option<&Path>,
    json: bool,
    out: &mut W,
) -> Result<Outcome> {
    let location = service.memory_location(project, cwd)?;

    if json {
        write_json(out, &location)?;
        return Ok(Outcome::Done);
    }

    match location {
        Some(location) => {
            write_line(out, &format_location(&location))?;
            Ok(Outcome::Done)
        },
        None => Ok(Outcome::Unresolved),
    }
}

/// Deletes a project's memory directory.
///
/// Refuses to run unless `confirmed` is set.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] without confirmation,
/// [`Error::PathRejected`] for a protected target, or the errors of
/// [`clear_memories`].
pub fn cmd_memories_clear<W: Write>(
    service: &ResolutionService,
    project: &str,
    confirmed: bool,
    out: &mut W,
) -> Result<()> {
    let location = service
        .memory_location(Some(project), None)?
        .ok_or_else(|| Error::InvalidInput(format!("unknown project: {project}")))?;

    if !confirmed {
        return Err(Error::InvalidInput(format!(
            "refusing to delete {} without --yes",
            location.path.display()
        )));
    }

    let message = if clear_memories(&location)? {
        format!("Cleared {}", location.path.display())
    } else {
        format!("Nothing to clear at {}", location.path.display())
    };
    write_line(out, &message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolveEnv;
    use crate::services::MemoryLocator;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ResolutionService {
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        ResolutionService::new(path, ResolveEnv::default())
            .with_memory_locator(MemoryLocator::new(dir.path().join("memories")))
    }

    #[test]
    fn test_memories_path_default_mode() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let mut out = Vec::new();

        let outcome =
            cmd_memories_path(&service, Some("app"), Some(Path::new("/x")), true, &mut out)
                .unwrap();

        assert_eq!(outcome, Outcome::Done);
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["mode"], "DEFAULT");
        assert!(json["path"].as_str().unwrap().ends_with("memories/app"));
    }

    #[test]
    fn test_memories_path_unresolved() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let mut out = Vec::new();

        let outcome =
            cmd_memories_path(&service, None, Some(Path::new("/x")), false, &mut out).unwrap();
        assert_eq!(outcome, Outcome::Unresolved);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let target = dir.path().join("memories").join("app");
        std::fs::create_dir_all(&target).unwrap();

        let err = cmd_memories_clear(&service, "app", false, &mut Vec::new()).unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(target.exists());
    }

    #[test]
    fn test_clear_removes_directory() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let target = dir.path().join("memories").join("app");
        std::fs::create_dir_all(target.join("notes")).unwrap();
        let mut out = Vec::new();

        cmd_memories_clear(&service, "app", true, &mut out).unwrap();

        assert!(!target.exists());
        assert!(String::from_utf8(out).unwrap().starts_with("Cleared"));
    }

    #[test]
    fn test_clear_missing_directory() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let mut out = Vec::new();

        cmd_memories_clear(&service, "app", true, &mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().starts_with("Nothing to clear"));
    }
}
