//! MCP method dispatch.
//!
//! Incoming method names are parsed once into [`McpMethod`] and the server
//! matches on the enum. Names outside the supported set are kept in
//! [`McpMethod::Unknown`] so the error response can echo them, and
//! `notifications/*` names are recognised so they get no response.

use std::fmt;

/// MCP method identifier.
///
/// Represents all supported MCP protocol methods with type-safe variants.
/// Unknown methods are captured for proper error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum McpMethod {
    /// Initialize the MCP session.
    Initialize,
    /// List available tools.
    ListTools,
    /// Call a specific tool.
    CallTool,
    /// Ping the server (health check).
    Ping,
    /// Unknown method (for error handling).
    Unknown(String),
}

impl McpMethod {
    /// Returns the MCP protocol method name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Initialize => "initialize",
            Self::ListTools => "tools/list",
            Self::CallTool => "tools/call",
            Self::Ping => "ping",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns true if this is a known method.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns true for JSON-RPC notifications, which get no response.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        matches!(self, Self::Unknown(name) if name.starts_with("notifications/"))
    }

    /// Returns all known methods.
    #[must_use]
    pub const fn known_methods() -> &'static [Self] {
        &[Self::Initialize, Self::ListTools, Self::CallTool, Self::Ping]
    }
}

impl From<&str> for McpMethod {
    fn from(s: &str) -> Self {
        match s {
            "initialize" => Self::Initialize,
            "tools/list" => Self::ListTools,
            "tools/call" => Self::CallTool,
            "ping" => Self::Ping,
            unknown => Self::Unknown(unknown.to_string()),
        }
    }
}

impl fmt::Display for McpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
