//! # Troupe Tools
//!
//! Tools that agents can carry, and a registry to organise them.
//!
//! - [`FunctionTool`]: a tool assembled from declared parameters and a
//!   closure, switchable on and off at runtime
//! - [`ToolRegistry`]: name-keyed collection with category listing,
//!   schema export and conversion into an agent [`ToolSet`](troupe_core::ToolSet)
//! - [`standard`]: file system tools

/// Closure-backed tools with parameter checking.
pub mod function;
/// Tool registry for managing collections of tools.
pub mod registry;
/// Standard tool library.
pub mod standard;

pub use function::{FunctionTool, ToolHandler};
pub use registry::ToolRegistry;
pub use standard::{FileReadTool, FileWriteTool};
pub use troupe_core::tool::{
    FailureReason, Tool, ToolCategory, ToolParameter, ToolParams, ToolResult, ToolSet,
};
