//! # Mock Task Processor
//!
//! A processor with a scripted outcome. Clones share their call tracking, so
//! keep one handle in the test and give a clone to the agent.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use troupe_core::{TaskContext, TaskError, TaskOutput, TaskProcessor, TaskRequest, ToolParams};

#[derive(Debug, Clone)]
enum Outcome {
    /// `{"agent": <name>, "task": <task>}`
    Echo,
    Output(Value),
    Failure(String),
}

#[derive(Debug, Default)]
struct CallLog {
    tasks: Vec<String>,
    contexts: Vec<TaskContext>,
}

/// Scripted [`TaskProcessor`] that records every call.
#[derive(Debug, Clone)]
pub struct MockProcessor {
    outcome: Outcome,
    delay: Duration,
    tool_calls: Vec<(String, ToolParams)>,
    call_count: Arc<AtomicUsize>,
    log: Arc<Mutex<CallLog>>,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    /// Succeeds with `{"agent": <name>, "task": <task>}`.
    pub fn new() -> Self {
        Self {
            outcome: Outcome::Echo,
            delay: Duration::ZERO,
            tool_calls: Vec::new(),
            call_count: Arc::new(AtomicUsize::new(0)),
            log: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    /// Always succeeds with `output`.
    pub fn returning(output: impl Into<Value>) -> Self {
        Self {
            outcome: Outcome::Output(output.into()),
            ..Self::new()
        }
    }

    /// Always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure(message.into()),
            ..Self::new()
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Invoke the named agent tool on every call and report the record.
    pub fn with_tool_call(mut self, tool: impl Into<String>, params: ToolParams) -> Self {
        self.tool_calls.push((tool.into(), params));
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Tasks received, in call order.
    pub fn tasks(&self) -> Vec<String> {
        self.log().tasks.clone()
    }

    /// Contexts received, in call order.
    pub fn contexts(&self) -> Vec<TaskContext> {
        self.log().contexts.clone()
    }

    pub fn last_context(&self) -> Option<TaskContext> {
        self.log().contexts.last().cloned()
    }

    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        let mut log = self.log();
        log.tasks.clear();
        log.contexts.clear();
    }

    fn log(&self) -> std::sync::MutexGuard<'_, CallLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TaskProcessor for MockProcessor {
    async fn process(&self, request: TaskRequest<'_>) -> Result<TaskOutput, TaskError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        {
            let mut log = self.log();
            log.tasks.push(request.task.to_string());
            log.contexts.push(request.context.clone());
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let records = self
            .tool_calls
            .iter()
            .map(|(tool, params)| request.tools.invoke(tool, params.clone()))
            .collect();

        let output = match &self.outcome {
            Outcome::Echo => json!({"agent": request.agent.name, "task": request.task}),
            Outcome::Output(output) => output.clone(),
            Outcome::Failure(message) => return Err(TaskError::failed(message.clone())),
        };

        Ok(TaskOutput::new(output).with_tool_calls(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use troupe_core::{Agent, AgentStatus};

    #[tokio::test]
    async fn clones_share_call_tracking() {
        let processor = MockProcessor::returning("ok");
        let agent = Agent::new("a").with_processor(processor.clone());

        let mut context = TaskContext::new();
        context.insert("user".to_string(), json!("ada"));
        agent.run("one", &context).await;
        agent.run("two", &TaskContext::new()).await;

        assert_eq!(processor.call_count(), 2);
        assert_eq!(processor.tasks(), vec!["one", "two"]);
        assert_eq!(processor.contexts()[0]["user"], json!("ada"));
        assert!(processor.last_context().unwrap().is_empty());

        processor.reset();
        assert_eq!(processor.call_count(), 0);
        assert!(processor.tasks().is_empty());
    }

    #[test]
    fn echo_outcome_names_agent_and_task() {
        let agent = Agent::new("scout").with_processor(MockProcessor::new());
        let result = tokio_test::block_on(agent.run("look", &TaskContext::new()));
        assert_eq!(
            result.output(),
            Some(&json!({"agent": "scout", "task": "look"}))
        );
    }

    #[tokio::test]
    async fn failing_outcome_marks_agent_failed() {
        let agent = Agent::new("a").with_processor(MockProcessor::failing("nope"));
        let result = agent.run("t", &TaskContext::new()).await;
        assert_eq!(result.error(), Some("nope"));
        assert_eq!(agent.status(), AgentStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let agent = Agent::new("a")
            .with_processor(MockProcessor::new().with_delay(Duration::from_secs(3)));
        let result = agent.run("t", &TaskContext::new()).await;
        assert!(result.execution_time() >= Duration::from_secs(3));
    }
}
