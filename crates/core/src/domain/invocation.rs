use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(pub String);

/// Parameters sent with a command document: each name maps to a single-value list.
pub type CommandParameters = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub target_id: String,
    pub document_name: String,
    /// `None` when the request carried no parameters; backends must omit the map entirely.
    pub parameters: Option<CommandParameters>,
}

/// Acknowledgement of a submitted command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedCommand {
    pub invocation_id: InvocationId,
    pub target_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    TimedOut,
    Cancelled,
}

impl InvocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::TimedOut => "TimedOut",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parses a backend status string. `Delayed` is still waiting to start and
    /// `Cancelling` is still running, so both fold into non-terminal states.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Pending" | "Delayed" => Some(Self::Pending),
            "InProgress" | "Cancelling" => Some(Self::InProgress),
            "Success" => Some(Self::Success),
            "Failed" => Some(Self::Failed),
            "TimedOut" => Some(Self::TimedOut),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::TimedOut | Self::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: InvocationStatus,
    pub standard_output: String,
    pub standard_error: String,
}

impl InvocationResult {
    /// Stdout for a successful invocation, stderr for any other outcome.
    pub fn into_output(self) -> String {
        if self.status == InvocationStatus::Success {
            self.standard_output
        } else {
            self.standard_error
        }
    }
}

/// Bound on how long a caller waits for an invocation to reach a terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitPolicy {
    pub budget: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self { budget: Duration::from_secs(10), poll_interval: Duration::from_millis(500) }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvocationResult, InvocationStatus};

    #[test]
    fn backend_statuses_fold_into_lifecycle() {
        assert_eq!(InvocationStatus::parse("Delayed"), Some(InvocationStatus::Pending));
        assert_eq!(InvocationStatus::parse("Cancelling"), Some(InvocationStatus::InProgress));
        assert_eq!(InvocationStatus::parse("TimedOut"), Some(InvocationStatus::TimedOut));
        assert_eq!(InvocationStatus::parse("Exploded"), None);
    }

    #[test]
    fn only_final_states_are_terminal() {
        assert!(!InvocationStatus::Pending.is_terminal());
        assert!(!InvocationStatus::InProgress.is_terminal());
        assert!(InvocationStatus::Success.is_terminal());
        assert!(InvocationStatus::Failed.is_terminal());
        assert!(InvocationStatus::TimedOut.is_terminal());
        assert!(InvocationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn output_selects_stream_by_status() {
        let success = InvocationResult {
            status: InvocationStatus::Success,
            standard_output: "user1\nuser2".to_string(),
            standard_error: String::new(),
        };
        assert_eq!(success.into_output(), "user1\nuser2");

        let cancelled = InvocationResult {
            status: InvocationStatus::Cancelled,
            standard_output: "partial".to_string(),
            standard_error: "cancelled by operator".to_string(),
        };
        assert_eq!(cancelled.into_output(), "cancelled by operator");
    }
}
