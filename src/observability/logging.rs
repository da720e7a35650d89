//! Logging configuration.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter directive environment variable.
pub const LOG_FILTER_ENV: &str = "BRAIN_LOG";

/// Output format environment variable (`pretty` or `json`).
pub const LOG_FORMAT_ENV: &str = "BRAIN_LOG_FORMAT";

/// Log file environment variable.
pub const LOG_FILE_ENV: &str = "BRAIN_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names are `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the configuration from the process environment.
    #[must_use]
    pub fn from_env(verbose: bool) -> Self {
        Self::from_lookup(verbose, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// An invalid `BRAIN_LOG` directive falls back to the default filter,
    /// which is `warn`, or `debug` when `verbose` is set.
    pub fn from_lookup<F>(verbose: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_directive = if verbose { "debug" } else { "warn" };
        let filter = lookup(LOG_FILTER_ENV)
            .filter(|value| !value.trim().is_empty())
            .and_then(|value| EnvFilter::try_new(value.trim()).ok())
            .unwrap_or_else(|| EnvFilter::new(default_directive));

        let format = lookup(LOG_FORMAT_ENV)
            .as_deref()
            .and_then(LogFormat::parse)
            .unwrap_or_default();

        let file = lookup(LOG_FILE_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            filter,
            format,
            file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test_case("json" => Some(LogFormat::Json); "json")]
    #[test_case("JSON" => Some(LogFormat::Json); "uppercase")]
    #[test_case("pretty" => Some(LogFormat::Pretty); "pretty")]
    #[test_case("text" => Some(LogFormat::Pretty); "text alias")]
    #[test_case("xml" => None; "unknown")]
    fn test_format_parse(value: &str) -> Option<LogFormat> {
        LogFormat::parse(value)
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_lookup(false, lookup(&[]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert_eq!(config.filter.to_string(), "warn");
    }

    #[test]
    fn test_verbose_default_filter() {
        let config = LoggingConfig::from_lookup(true, lookup(&[]));
        assert_eq!(config.filter.to_string(), "debug");
    }

    #[test]
    fn test_env_overrides() {
        let config = LoggingConfig::from_lookup(
            false,
            lookup(&[
                (LOG_FILTER_ENV, "brain=trace"),
                (LOG_FORMAT_ENV, "json"),
                (LOG_FILE_ENV, "/tmp/brain.log"),
            ]),
        );
        assert_eq!(config.filter.to_string(), "brain=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/brain.log")));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = LoggingConfig::from_lookup(
            false,
            lookup(&[(LOG_FILTER_ENV, "  "), (LOG_FILE_ENV, "")]),
        );
        assert_eq!(config.filter.to_string(), "warn");
        assert!(config.file.is_none());
    }
}
