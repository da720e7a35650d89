//! # Brain
//!
//! Project resolution and worktree detection for AI coding agent memory.
//!
//! Given a working directory (or explicit hints), `brain` decides which
//! configured project a caller belongs to. When no configured code path
//! contains the directory, it checks whether the directory is a linked git
//! worktree whose main checkout is configured, and resolves against that.
//! The answer decides where an agent's persistent memory is written.
//!
//! ## Surfaces
//!
//! - `brain` command-line tool
//! - MCP server over stdio (`brain serve`)
//! - Session-start hook (`brain hook session-start`)
//!
//! All three go through [`services::ResolutionService`], so they return the
//! same [`ResolutionContext`] for the same inputs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brain::services::ResolutionService;
//! use std::path::Path;
//!
//! let service = ResolutionService::from_env(None);
//! if let Some(ctx) = service.resolve(None, Some(Path::new("/home/me/Dev/brain/apps")))? {
//!     println!("{} ({})", ctx.project_name, ctx.effective_cwd.display());
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod hooks;
pub mod mcp;
pub mod observability;
pub mod resolve;
pub mod security;
pub mod services;

// Re-exports for convenience
pub use config::{BrainConfig, MemoriesMode, ProjectConfig};
pub use resolve::{
    DetectionPolicy, DirectMatch, ResolutionContext, ResolutionSource, ResolveEnv,
    WorktreeDetection,
};
pub use security::PathRejection;
pub use services::{MemoryLocation, ResolutionService};

/// Error type for brain operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed tool arguments, missing required parameters |
/// | `InvalidConfig` | Configuration file is not valid JSON or has the wrong shape |
/// | `OperationFailed` | I/O errors reading config, removing directories, logging init |
/// | `PathRejected` | A path used as a write or delete base fails the path guard |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - JSON deserialization fails in MCP tool handlers
    /// - A command needs a project and none was given or resolved
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The configuration file could not be parsed.
    ///
    /// Raised when:
    /// - The file exists but is not valid JSON
    /// - A field has the wrong type or an unknown `memories_mode`
    /// - A `CUSTOM` project has no absolute `memories_path`
    ///
    /// This is the only error resolution itself surfaces.
    #[error("invalid configuration at {}: {cause}", path.display())]
    InvalidConfig {
        /// The configuration file.
        path: std::path::PathBuf,
        /// The underlying cause.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur (other than a missing config file)
    /// - Logging was already initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A path was rejected by the path guard.
    ///
    /// Raised when:
    /// - A worktree-derived memory base fails re-validation at the point of use
    /// - A deletion target is protected or malformed
    #[error("path rejected: {0}")]
    PathRejected(#[from] PathRejection),
}

/// Result type alias for brain operations.
pub type Result<T> = std::result::Result<T, Error>;
