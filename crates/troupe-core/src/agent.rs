//! # Agents
//!
//! An [`Agent`] is a named execution unit: it owns a status, a memory, a
//! tool set and a [`TaskProcessor`](crate::processor::TaskProcessor), and
//! turns every run into an [`AgentResult`](crate::result::AgentResult).

pub mod core;
pub mod status;

pub use self::core::{Agent, AgentProfile, AgentSnapshot};
pub use status::AgentStatus;
