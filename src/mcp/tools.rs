//! MCP tool implementations.
//!
//! Provides tool handlers for the Model Context Protocol. Every tool goes
//! through [`ResolutionService`], so answers match the CLI and hooks.

use crate::config::BrainConfig;
use crate::services::ResolutionService;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Hint returned when no project resolves.
const UNRESOLVED_HINT: &str =
    "No project resolved for this directory. Pass `project` explicitly or add the directory to the brain configuration.";

/// Registry of MCP tools.
pub struct ToolRegistry {
    /// Available tools, by name.
    tools: BTreeMap<String, ToolDefinition>,
    service: Arc<ResolutionService>,
}

impl ToolRegistry {
    /// Creates a new tool registry with all brain tools.
    #[must_use]
    pub fn new(service: Arc<ResolutionService>) -> Self {
        let mut tools = BTreeMap::new();

        let definitions = [
            ToolDefinition {
                name: "brain_resolve_project".to_string(),
                description: "Resolve which configured project a directory belongs to, following linked git worktrees back to their main checkout".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "project": {
                            "type": "string",
                            "description": "Optional explicit project name; wins over everything else"
                        },
                        "cwd": {
                            "type": "string",
                            "description": "Absolute working directory (default: server's directory)"
                        }
                    },
                    "required": []
                }),
            },
            ToolDefinition {
                name: "brain_match_cwd".to_string(),
                description: "Match a directory against configured code paths only, ignoring environment overrides".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "cwd": {
                            "type": "string",
                            "description": "Absolute working directory"
                        }
                    },
                    "required": ["cwd"]
                }),
            },
            ToolDefinition {
                name: "brain_list_projects".to_string(),
                description: "List configured projects and their code paths".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
            ToolDefinition {
                name: "brain_memory_location".to_string(),
                description: "Show where the resolved project's memories are stored".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "project": {
                            "type": "string",
                            "description": "Optional explicit project name"
                        },
                        "cwd": {
                            "type": "string",
                            "description": "Absolute working directory (default: server's directory)"
                        }
                    },
                    "required": []
                }),
            },
        ];
        for definition in definitions {
            tools.insert(definition.name.clone(), definition);
        }

        Self { tools, service }
    }

    /// Returns all tool definitions, ordered by name.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Executes a tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tools, malformed arguments, or a
    /// malformed configuration file.
    pub fn execute(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        match name {
            "brain_resolve_project" => self.execute_resolve(arguments),
            "brain_match_cwd" => self.execute_match(arguments),
            "brain_list_projects" => self.execute_list_projects(),
            "brain_memory_location" => self.execute_memory_location(arguments),
            _ => Err(Error::InvalidInput(format!("Unknown tool: {name}"))),
        }
    }

    /// Executes the resolve tool.
    fn execute_resolve(&self, arguments: Value) -> Result<ToolResult> {
        let args: ResolveArgs = parse_args(arguments)?;
        let resolved = self
            .service
            .resolve(args.project.as_deref(), args.cwd.as_deref().map(Path::new))?;

        Ok(match resolved {
            Some(ctx) => ToolResult::json(&ctx),
            None => ToolResult::text(UNRESOLVED_HINT),
        })
    }

    /// Executes the match tool.
    fn execute_match(&self, arguments: Value) -> Result<ToolResult> {
        let args: MatchArgs = parse_args(arguments)?;
        let matched = self.service.match_cwd(Some(Path::new(&args.cwd)))?;

        Ok(match matched {
            Some(ctx) => ToolResult::json(&ctx),
            None => ToolResult::text(UNRESOLVED_HINT),
        })
    }

    /// Executes the project listing tool.
    fn execute_list_projects(&self) -> Result<ToolResult> {
        let config = self.service.load_config()?;
        Ok(ToolResult::text(&format_projects(&config)))
    }

    /// Executes the memory location tool.
    fn execute_memory_location(&self, arguments: Value) -> Result<ToolResult> {
        let args: ResolveArgs = parse_args(arguments)?;
        let location = self
            .service
            .memory_location(args.project.as_deref(), args.cwd.as_deref().map(Path::new))?;

        Ok(match location {
            Some(location) => ToolResult::json(&location),
            None => ToolResult::text(UNRESOLVED_HINT),
        })
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T> {
    // Clients send `null` or omit arguments for parameterless calls.
    let arguments = if arguments.is_null() {
        serde_json::json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn format_projects(config: &BrainConfig) -> String {
    if config.projects.is_empty() {
        return "No projects configured.".to_string();
    }

    let mut output = format!("Configured projects ({}):\n\n", config.projects.len());
    for (name, project) in &config.projects {
        output.push_str(&format!(
            "- **{name}**: {}",
            project.code_path.display()
        ));
        if let Some(mode) = project.memories_mode {
            output.push_str(&format!(" [{mode}]"));
        }
        if project.disable_worktree_detection {
            output.push_str(" (worktree detection off)");
        }
        output.push('\n');
    }
    output
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    /// A successful plain-text result.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: text.to_string(),
            }],
            is_error: false,
        }
    }

    /// A successful result holding pretty-printed JSON.
    #[must_use]
    pub fn json<T: Serialize>(value: &T) -> Self {
        let text = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("Failed to serialize result: {e}"));
        Self::text(&text)
    }

    /// An error result.
    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.to_string(),
            }],
            is_error: true,
        }
    }
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Arguments for the resolve and memory location tools.
#[derive(Debug, Default, Deserialize)]
struct ResolveArgs {
    project: Option<String>,
    cwd: Option<String>,
}

/// Arguments for the match tool.
#[derive(Debug, Deserialize)]
struct MatchArgs {
    cwd: String,
}
