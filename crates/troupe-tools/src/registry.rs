use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use troupe_core::tool::{FailureReason, Tool, ToolCategory, ToolParams, ToolResult, ToolSet};

use crate::standard::{FileReadTool, FileWriteTool};

/// Name-keyed collection of tools.
///
/// Registering a tool under a name that is already taken replaces the
/// previous tool.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use troupe_tools::{FunctionTool, ToolParams, ToolRegistry, ToolResult};
///
/// let registry = ToolRegistry::new()
///     .with_tool(Arc::new(
///         FunctionTool::new("ping", "Replies pong").handler(|_| ToolResult::success("pong")),
///     ));
///
/// let result = registry.execute("ping", &ToolParams::new());
/// assert!(result.is_success());
/// assert!(registry.execute("missing", &ToolParams::new()).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard file tools.
    pub fn with_standard_tools() -> Self {
        Self::new()
            .with_tool(Arc::new(FileReadTool::new()))
            .with_tool(Arc::new(FileWriteTool::new()))
    }

    /// Add a tool using the builder pattern.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Register a tool under its own name, returning the tool it replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        let previous = self.tools.insert(name.clone(), tool);
        if previous.is_some() {
            debug!(tool = %name, "Replaced registered tool");
        }
        previous
    }

    /// Remove a tool. Returns whether anything was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tools sorted by name, optionally restricted to one category.
    pub fn list_tools(&self, category: Option<ToolCategory>) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = self
            .tools
            .values()
            .filter(|tool| category.is_none_or(|c| tool.category() == c))
            .cloned()
            .collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Execute a tool by name. Unknown names fail with
    /// [`FailureReason::NotFound`].
    pub fn execute(&self, name: &str, params: &ToolParams) -> ToolResult {
        match self.tools.get(name) {
            Some(tool) => tool.execute(params),
            None => {
                warn!(tool = name, "Tool not found in registry");
                ToolResult::failed(FailureReason::NotFound {
                    tool: name.to_string(),
                })
            }
        }
    }

    /// Schemas of every registered tool, sorted by name.
    pub fn export_schemas(&self) -> Vec<Value> {
        self.list_tools(None)
            .iter()
            .map(|tool| tool.schema())
            .collect()
    }

    /// Agent tool set holding every registered tool.
    pub fn to_tool_set(&self) -> ToolSet {
        self.select(self.tools.keys().map(String::as_str))
    }

    /// Agent tool set holding the named tools. Unknown names are skipped.
    pub fn select<'a, I>(&self, names: I) -> ToolSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = ToolSet::new();
        for name in names {
            match self.tools.get(name) {
                Some(tool) => {
                    set.insert(Arc::clone(tool));
                }
                None => warn!(tool = name, "Skipping unknown tool"),
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
