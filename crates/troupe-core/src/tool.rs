//! # Tools
//!
//! The capability contract agents carry. Concrete tools and the registry
//! live in `troupe-tools`; the core only needs the trait, the result type,
//! and the per-agent [`ToolSet`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::result::ToolCallRecord;

/// Named parameters passed to a tool.
pub type ToolParams = Map<String, Value>;

/// Grouping used to organise tools in listings and registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    FileSystem,
    Web,
    Database,
    Api,
    #[default]
    Custom,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::FileSystem => "file_system",
            ToolCategory::Web => "web",
            ToolCategory::Database => "database",
            ToolCategory::Api => "api",
            ToolCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared input of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    /// Free-form type label, e.g. `"string"` or `"integer"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

fn default_required() -> bool {
    true
}

impl ToolParameter {
    /// A parameter the caller must supply.
    pub fn required(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// A parameter the caller may omit.
    pub fn optional(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Categorized failure reasons for tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// No tool is registered under the requested name.
    NotFound { tool: String },
    /// The tool exists but has been switched off.
    Disabled { tool: String },
    /// The tool was declared without an implementation.
    MissingHandler { tool: String },
    /// A required parameter was not supplied.
    MissingParameter { name: String },
    /// Parameters were present but unusable.
    InvalidInput { message: String },
    /// I/O operation failed.
    Io { message: String },
    /// Internal tool error or unexpected state.
    Internal { message: String },
}

impl FailureReason {
    /// Human-readable error message.
    pub fn message(&self) -> String {
        match self {
            FailureReason::NotFound { tool } => format!("Tool '{}' not found", tool),
            FailureReason::Disabled { tool } => format!("Tool '{}' is disabled", tool),
            FailureReason::MissingHandler { tool } => format!("No handler for tool '{}'", tool),
            FailureReason::MissingParameter { name } => {
                format!("Missing required parameter: {}", name)
            }
            FailureReason::InvalidInput { message } => format!("Invalid input: {}", message),
            FailureReason::Io { message } => format!("I/O error: {}", message),
            FailureReason::Internal { message } => format!("Internal error: {}", message),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The result of executing a tool.
///
/// Either the tool produced data or it failed for a structured reason; a
/// result can never carry both.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success { data: Value },
    Failure { reason: FailureReason },
}

impl ToolResult {
    pub fn success(data: impl Into<Value>) -> Self {
        ToolResult::Success { data: data.into() }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ToolResult::Failure { reason }
    }

    /// Failure from a plain message, wrapped as [`FailureReason::Internal`].
    pub fn failure(message: impl Into<String>) -> Self {
        ToolResult::Failure {
            reason: FailureReason::Internal {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ToolResult::Success { data } => Some(data),
            ToolResult::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ToolResult::Success { .. } => None,
            ToolResult::Failure { reason } => Some(reason),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.failure_reason().map(FailureReason::message)
    }

    pub fn into_result(self) -> Result<Value, FailureReason> {
        match self {
            ToolResult::Success { data } => Ok(data),
            ToolResult::Failure { reason } => Err(reason),
        }
    }

    /// `{"success", "data", "error"}` form used in logs and transport.
    pub fn to_representation(&self) -> Value {
        match self {
            ToolResult::Success { data } => json!({
                "success": true,
                "data": data,
                "error": null,
            }),
            ToolResult::Failure { reason } => json!({
                "success": false,
                "data": null,
                "error": reason.message(),
            }),
        }
    }
}

/// Trait defining an external capability that agents can carry.
///
/// # Example
///
/// ```rust
/// use troupe_core::tool::{Tool, ToolParams, ToolResult, FailureReason};
///
/// struct Doubler;
///
/// impl Tool for Doubler {
///     fn name(&self) -> &str {
///         "doubler"
///     }
///
///     fn execute(&self, params: &ToolParams) -> ToolResult {
///         match params.get("value").and_then(|v| v.as_f64()) {
///             Some(n) => ToolResult::success(n * 2.0),
///             None => ToolResult::failed(FailureReason::MissingParameter {
///                 name: "value".to_string(),
///             }),
///         }
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// Unique name used as the registration key.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Custom
    }

    fn parameters(&self) -> &[ToolParameter] {
        &[]
    }

    /// Run the tool. Failures are reported in the result, never panicked.
    fn execute(&self, params: &ToolParams) -> ToolResult;

    /// JSON description of the tool for listings and model prompts.
    fn schema(&self) -> Value {
        let parameters: Map<String, Value> = self
            .parameters()
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({
                        "type": p.kind,
                        "description": p.description,
                        "required": p.required,
                    }),
                )
            })
            .collect();

        json!({
            "name": self.name(),
            "description": self.description(),
            "category": self.category(),
            "parameters": parameters,
        })
    }
}

/// The named capability set attached to one agent.
///
/// Registration overwrites by name; removal of an unknown name is a no-op.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tool` under its own name, returning any tool it replaced.
    pub fn insert(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        self.tools.insert(tool.name().to_string(), tool)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Tool>)> {
        self.tools.iter().map(|(name, tool)| (name.as_str(), tool))
    }

    /// Execute a tool by name and record the call.
    ///
    /// An unknown name yields a failed record with [`FailureReason::NotFound`].
    pub fn invoke(&self, name: &str, params: ToolParams) -> ToolCallRecord {
        let result = match self.tools.get(name) {
            Some(tool) => tool.execute(&params),
            None => ToolResult::failed(FailureReason::NotFound {
                tool: name.to_string(),
            }),
        };
        debug!(tool = name, success = result.is_success(), "Tool invoked");
        ToolCallRecord::new(name, params, &result)
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Returns its input"
        }

        fn parameters(&self) -> &[ToolParameter] {
            static PARAMS: std::sync::OnceLock<Vec<ToolParameter>> = std::sync::OnceLock::new();
            PARAMS.get_or_init(|| vec![ToolParameter::required("text", "string", "Text to echo")])
        }

        fn execute(&self, params: &ToolParams) -> ToolResult {
            match params.get("text") {
                Some(text) => ToolResult::success(text.clone()),
                None => ToolResult::failed(FailureReason::MissingParameter {
                    name: "text".to_string(),
                }),
            }
        }
    }

    fn params(pairs: &[(&str, Value)]) -> ToolParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn result_accessors_are_exclusive() {
        let ok = ToolResult::success("done");
        assert!(ok.is_success());
        assert_eq!(ok.data(), Some(&json!("done")));
        assert!(ok.error_message().is_none());

        let err = ToolResult::failure("broken");
        assert!(err.is_failure());
        assert!(err.data().is_none());
        assert_eq!(err.error_message().as_deref(), Some("Internal error: broken"));
    }

    #[test]
    fn representation_matches_transport_shape() {
        let failed = ToolResult::failed(FailureReason::Disabled {
            tool: "web".to_string(),
        });
        assert_eq!(
            failed.to_representation(),
            json!({"success": false, "data": null, "error": "Tool 'web' is disabled"})
        );
    }

    #[test]
    fn failure_reason_serializes_tagged() {
        let reason = FailureReason::MissingParameter {
            name: "path".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&reason).unwrap(),
            json!({"type": "missing_parameter", "name": "path"})
        );
    }

    #[test]
    fn default_schema_lists_parameters() {
        let schema = Echo.schema();
        assert_eq!(schema["name"], json!("echo"));
        assert_eq!(schema["category"], json!("custom"));
        assert_eq!(schema["parameters"]["text"]["required"], json!(true));
    }

    #[test]
    fn tool_set_overwrites_by_name() {
        let mut set = ToolSet::new();
        assert!(set.insert(Arc::new(Echo)).is_none());
        assert!(set.insert(Arc::new(Echo)).is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.names(), vec!["echo".to_string()]);
    }

    #[test]
    fn tool_set_removal_of_unknown_name_is_noop() {
        let mut set = ToolSet::new();
        set.insert(Arc::new(Echo));

        assert!(set.remove("nope").is_none());
        assert_eq!(set.names(), vec!["echo".to_string()]);
    }

    #[test]
    fn invoke_records_success_and_missing_tool() {
        let mut set = ToolSet::new();
        set.insert(Arc::new(Echo));

        let record = set.invoke("echo", params(&[("text", json!("hi"))]));
        assert!(record.success);
        assert_eq!(record.data, Some(json!("hi")));

        let record = set.invoke("ghost", ToolParams::new());
        assert!(!record.success);
        assert_eq!(record.error.as_deref(), Some("Tool 'ghost' not found"));
    }
}
