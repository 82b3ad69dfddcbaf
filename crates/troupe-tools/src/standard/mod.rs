//! # Standard Tool Library
//!
//! Ready-made tools for common agent operations.
//!
//! ```rust
//! use std::sync::Arc;
//! use troupe_tools::{FileReadTool, ToolRegistry};
//!
//! let registry = ToolRegistry::new().with_tool(Arc::new(FileReadTool::new()));
//! assert!(registry.contains("file_read"));
//! ```

/// File system I/O operations
pub mod file;

pub use file::{FileReadTool, FileWriteTool};
