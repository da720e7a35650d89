//! MCP server implementation.
//!
//! Exposes project resolution to agents over the Model Context Protocol.
//!
//! ## Features
//!
//! - **Tools**: `brain_resolve_project`, `brain_match_cwd`, `brain_list_projects`,
//!   `brain_memory_location`
//!
//! ## Usage
//!
//! ```bash
//! brain serve
//! ```
//!
//! ### Client Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "brain": {
//!       "command": "brain",
//!       "args": ["serve"]
//!     }
//!   }
//! }
//! ```

// Allow format_push_string - we prefer readability over micro-optimization here.
#![allow(clippy::format_push_string)]

mod dispatch;
mod server;
mod tools;

pub use dispatch::McpMethod;
pub use server::McpServer;
pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult};
