use std::time::Duration;

use thiserror::Error;

use crate::domain::invocation::InvocationId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandServiceError {
    #[error("command submission failed: {0}")]
    Submission(String),
    #[error("command acknowledgement is missing `{0}`")]
    IncompleteAcknowledgement(&'static str),
    #[error("invocation {invocation_id:?} did not finish within {budget:?}")]
    WaitTimeout { invocation_id: InvocationId, budget: Duration },
    #[error("invocation status query failed: {0}")]
    Poll(String),
}

/// Failures reported by the directory-data collaborator.
///
/// `Service` errors are modeled responses from the directory service and carry a
/// message meant for humans; `Transport` covers everything else (dispatch, timeouts,
/// unparseable responses) and is never shown to the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DirectoryServiceError {
    #[error("directory service error: {message}")]
    Service { code: Option<String>, message: String },
    #[error("directory transport failure: {0}")]
    Transport(String),
}

impl DirectoryServiceError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service { code: None, message: message.into() }
    }

    /// Text that may be returned to the caller verbatim, if this error has any.
    pub fn surfaceable_message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } if !message.trim().is_empty() => Some(message),
            Self::Service { code: Some(code), .. } if !code.trim().is_empty() => Some(code),
            Self::Service { .. } | Self::Transport(_) => None,
        }
    }
}
