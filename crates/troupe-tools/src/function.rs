use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use troupe_core::tool::{FailureReason, Tool, ToolCategory, ToolParameter, ToolParams, ToolResult};

/// Closure invoked with validated parameters.
pub type ToolHandler = Arc<dyn Fn(&ToolParams) -> ToolResult + Send + Sync>;

/// A tool built from a description, declared parameters and a handler.
///
/// `execute` checks, in order, that the tool is enabled, that it has a
/// handler, and that every required parameter is present, before calling
/// the handler.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use troupe_tools::{FunctionTool, Tool, ToolParameter, ToolParams, ToolResult};
///
/// let greet = FunctionTool::new("greet", "Greets someone")
///     .parameter(ToolParameter::required("who", "string", "Name to greet"))
///     .handler(|params: &ToolParams| {
///         let who = params.get("who").and_then(|v| v.as_str()).unwrap_or_default();
///         ToolResult::success(format!("Hello, {who}!"))
///     });
///
/// let mut params = ToolParams::new();
/// params.insert("who".to_string(), json!("Ada"));
/// assert_eq!(greet.execute(&params).data(), Some(&json!("Hello, Ada!")));
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    category: ToolCategory,
    parameters: Vec<ToolParameter>,
    handler: Option<ToolHandler>,
    enabled: AtomicBool,
}

impl FunctionTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: ToolCategory::Custom,
            parameters: Vec::new(),
            handler: None,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    pub fn parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ToolParams) -> ToolResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.enabled.store(enabled, Ordering::Relaxed);
        self
    }

    /// Switch the tool on or off while it is shared.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> ToolCategory {
        self.category
    }

    fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    fn execute(&self, params: &ToolParams) -> ToolResult {
        if !self.is_enabled() {
            return ToolResult::failed(FailureReason::Disabled {
                tool: self.name.clone(),
            });
        }

        let Some(handler) = &self.handler else {
            return ToolResult::failed(FailureReason::MissingHandler {
                tool: self.name.clone(),
            });
        };

        if let Some(missing) = self
            .parameters
            .iter()
            .find(|p| p.required && !params.contains_key(&p.name))
        {
            debug!(tool = %self.name, parameter = %missing.name, "Missing required parameter");
            return ToolResult::failed(FailureReason::MissingParameter {
                name: missing.name.clone(),
            });
        }

        handler(params)
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("parameters", &self.parameters)
            .field("has_handler", &self.has_handler())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
