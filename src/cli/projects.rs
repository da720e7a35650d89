//! `projects` command.

use super::output::{write_json, write_line};
use crate::Result;
use crate::config::BrainConfig;
use crate::services::ResolutionService;
use std::fmt::Write as _;
use std::io::Write;

/// Lists configured projects.
///
/// # Errors
///
/// Returns an error for a malformed configuration file or a failed write.
pub fn cmd_projects<W: Write>(service: &ResolutionService, json: bool, out: &mut W) -> Result<()> {
    let config = service.load_config()?;

    if json {
        return write_json(out, &config.projects);
    }

    write_line(out, &format_table(&config))
}

fn format_table(config: &BrainConfig) -> String {
    if config.projects.is_empty() {
        return "No projects configured.".to_string();
    }

    let width = config.projects.keys().map(String::len).max().unwrap_or(0);
    config
        .projects
        .iter()
        .map(|(name, project)| {
            let mut line = format!("{name:<width$}  {}", project.code_path.display());
            if let Some(mode) = project.memories_mode {
                let _ = write!(line, "  [{mode}]");
            }
            if project.disable_worktree_detection {
                line.push_str("  (no worktree detection)");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
