//! # Mock Tools for Testing
//!
//! Tools that return a canned result and remember how they were called.

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use troupe_core::{FailureReason, Tool, ToolCategory, ToolParams, ToolResult};

/// A tool that always returns the same result.
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    category: ToolCategory,
    result: ToolResult,
    call_count: Arc<AtomicUsize>,
    call_history: Arc<Mutex<Vec<ToolParams>>>,
}

impl MockTool {
    /// Mock that succeeds with `"Mock response for: <name>"`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            result: ToolResult::success(format!("Mock response for: {}", name)),
            name,
            category: ToolCategory::Custom,
            call_count: Arc::new(AtomicUsize::new(0)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    /// Succeed with `data` on every call.
    pub fn with_response(mut self, data: impl Into<Value>) -> Self {
        self.result = ToolResult::success(data);
        self
    }

    /// Fail with `reason` on every call.
    pub fn with_failure(mut self, reason: FailureReason) -> Self {
        self.result = ToolResult::failed(reason);
        self
    }

    /// Get the number of times this tool has been called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the history of parameters passed to this tool
    pub fn call_history(&self) -> Vec<ToolParams> {
        self.history().clone()
    }

    /// Reset call count and history
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.history().clear();
    }

    fn history(&self) -> std::sync::MutexGuard<'_, Vec<ToolParams>> {
        self.call_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Mock tool"
    }

    fn category(&self) -> ToolCategory {
        self.category
    }

    fn execute(&self, params: &ToolParams) -> ToolResult {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.history().push(params.clone());
        self.result.clone()
    }
}
