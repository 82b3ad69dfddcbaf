//! # File System Tools
//!
//! Reading and writing files on behalf of an agent.

use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use troupe_core::tool::{FailureReason, Tool, ToolCategory, ToolParameter, ToolParams, ToolResult};

fn string_param<'a>(params: &'a ToolParams, name: &str) -> Result<&'a str, FailureReason> {
    match params.get(name) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(FailureReason::InvalidInput {
            message: format!("parameter '{name}' must be a string, got {other}"),
        }),
        None => Err(FailureReason::MissingParameter {
            name: name.to_string(),
        }),
    }
}

/// File reading tool
#[derive(Debug)]
pub struct FileReadTool {
    parameters: Vec<ToolParameter>,
}

impl FileReadTool {
    pub fn new() -> Self {
        Self {
            parameters: vec![ToolParameter::required(
                "path",
                "string",
                "Path of the file to read",
            )],
        }
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read a UTF-8 text file"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::FileSystem
    }

    fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    fn execute(&self, params: &ToolParams) -> ToolResult {
        let path = match string_param(params, "path") {
            Ok(path) => path,
            Err(reason) => return ToolResult::failed(reason),
        };

        match fs::read_to_string(path) {
            Ok(content) => ToolResult::success(json!({
                "path": path,
                "size": content.len(),
                "content": content,
            })),
            Err(e) => ToolResult::failed(FailureReason::Io {
                message: format!("Failed to read file '{}': {}", path, e),
            }),
        }
    }
}

/// File writing tool
#[derive(Debug)]
pub struct FileWriteTool {
    parameters: Vec<ToolParameter>,
}

impl FileWriteTool {
    pub fn new() -> Self {
        Self {
            parameters: vec![
                ToolParameter::required("path", "string", "Path of the file to write"),
                ToolParameter::required("content", "string", "Text to write"),
                ToolParameter::optional("create_dirs", "boolean", "Create missing parent directories")
                    .with_default(false),
            ],
        }
    }
}

impl Default for FileWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write text to a file, replacing its contents"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::FileSystem
    }

    fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    fn execute(&self, params: &ToolParams) -> ToolResult {
        let (path, content) = match (string_param(params, "path"), string_param(params, "content")) {
            (Ok(path), Ok(content)) => (path, content),
            (Err(reason), _) | (_, Err(reason)) => return ToolResult::failed(reason),
        };
        let create_dirs = params
            .get("create_dirs")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if let Some(parent) = create_dirs.then(|| Path::new(path).parent()).flatten()
            && let Err(e) = fs::create_dir_all(parent)
        {
            return ToolResult::failed(FailureReason::Io {
                message: format!("Failed to create directories for '{}': {}", path, e),
            });
        }

        match fs::write(path, content) {
            Ok(()) => ToolResult::success(json!({
                "path": path,
                "bytes_written": content.len(),
            })),
            Err(e) => ToolResult::failed(FailureReason::Io {
                message: format!("Failed to write file '{}': {}", path, e),
            }),
        }
    }
}
