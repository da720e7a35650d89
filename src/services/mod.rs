//! Business logic services.
//!
//! Services wire configuration, environment and the real subprocess-backed
//! collaborators to the resolution core. Every surface (CLI, MCP server,
//! hooks) goes through these.

mod memory_location;
mod resolution;

pub use memory_location::{
    CODE_MEMORIES_DIR, MEMORIES_ROOT_ENV, MemoryLocation, MemoryLocator, clear_memories,
    default_memories_root,
};
pub use resolution::ResolutionService;
