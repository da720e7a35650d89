//! External active-project indicator.

use super::process::run_with_timeout;
use std::process::Command;
use std::time::Duration;

/// Source of the "currently active project" answer.
///
/// Consulted once per resolve call, after the explicit argument and before
/// the environment variables. Implementations never fail: any problem is
/// "no value".
pub trait ActiveProjectSource {
    /// Returns the active project name, if the source has one.
    fn active_project(&self) -> Option<String>;
}

/// A source that never has an answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActiveProject;

impl ActiveProjectSource for NoActiveProject {
    fn active_project(&self) -> Option<String> {
        None
    }
}

/// Asks an external command for the active project.
///
/// The command's trimmed stdout is the project name. Empty output, `null`,
/// a non-zero exit, a spawn failure or a timeout all mean "no value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveProjectCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ActiveProjectCommand {
    /// Default deadline for the indicator command.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates an indicator that runs `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Builds an indicator from a command line, split on whitespace.
    ///
    /// Returns `None` for a blank command line. No shell quoting is
    /// interpreted; wrap anything more complex in a script.
    #[must_use]
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    /// Overrides the deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ActiveProjectSource for ActiveProjectCommand {
    fn active_project(&self) -> Option<String> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        let output = match run_with_timeout(command, self.timeout) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "Active-project indicator unavailable");
                return None;
            },
        };

        if !output.status.success() {
            tracing::debug!(
                program = %self.program,
                status = %output.status,
                "Active-project indicator exited unsuccessfully"
            );
            return None;
        }

        interpret_indicator_output(&output.stdout)
    }
}

/// Interprets indicator stdout: trimmed, with empty and `null` meaning none.
#[must_use]
pub fn interpret_indicator_output(stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed.to_string())
    }
}
