//! # Troupe Testing
//!
//! Test doubles for agents: a [`MockProcessor`] with scripted outcomes,
//! latency and call tracking, and a [`MockTool`] with a canned result.
//!
//! ```rust
//! use troupe_core::{Agent, TaskContext};
//! use troupe_testing::MockProcessor;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let processor = MockProcessor::failing("boom");
//! let agent = Agent::new("subject").with_processor(processor.clone());
//!
//! let result = agent.run("task", &TaskContext::new()).await;
//!
//! assert_eq!(result.error(), Some("boom"));
//! assert_eq!(processor.call_count(), 1);
//! # }
//! ```

pub mod mock_processor;
pub mod mock_tools;

pub use mock_processor::MockProcessor;
pub use mock_tools::MockTool;
