use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an agent.
///
/// Every run enters `Running` and leaves through `Completed` or `Failed`.
/// The status only reflects the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    /// Reserved for processors that suspend on external input. Nothing in
    /// the lifecycle enters this state yet.
    Waiting,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Running => "running",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
            AgentStatus::Waiting => "waiting",
        }
    }

    /// Whether the most recent run has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Completed | AgentStatus::Failed)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AgentStatus::Idle, "idle")]
    #[case(AgentStatus::Running, "running")]
    #[case(AgentStatus::Completed, "completed")]
    #[case(AgentStatus::Failed, "failed")]
    #[case(AgentStatus::Waiting, "waiting")]
    fn labels_are_lowercase(#[case] status: AgentStatus, #[case] label: &str) {
        assert_eq!(status.to_string(), label);
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            serde_json::Value::from(label)
        );
    }

    #[test]
    fn only_finished_states_are_terminal() {
        assert!(AgentStatus::Completed.is_terminal());
        assert!(AgentStatus::Failed.is_terminal());
        assert!(!AgentStatus::Running.is_terminal());
        assert!(!AgentStatus::default().is_terminal());
    }
}
