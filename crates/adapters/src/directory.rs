//! Direct directory-data lookups: list users, describe a user, list a user's groups.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use adbridge_core::config::DirectorySettings;
use adbridge_core::envelope::{
    decode, find_parameter, AgentRequest, AgentResponse, Parameter, MASKED_ERROR_BODY,
};
use adbridge_core::errors::DirectoryServiceError;

use crate::backend::DirectoryService;
use crate::registry::Adapter;

pub const DIRECTORY_ADAPTER_NAME: &str = "directory";

/// Name of the parameter carrying the target account name.
pub const USERNAME_PARAMETER: &str = "username";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectoryOperation {
    ListAllUsers,
    GetUserDetails,
    ListUserGroups,
}

impl DirectoryOperation {
    pub const ALL: [Self; 3] = [Self::ListAllUsers, Self::GetUserDetails, Self::ListUserGroups];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListAllUsers => "AD-GetAllUsers",
            Self::GetUserDetails => "AD-GetUserDetails",
            Self::ListUserGroups => "AD-GetUserGroups",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operation| operation.name() == name)
    }

    /// Performs the backend call and serializes the result as JSON text.
    pub async fn run(
        self,
        service: &dyn DirectoryService,
        directory_id: &str,
        parameters: &[Parameter],
    ) -> Result<String, DirectoryQueryError> {
        match self {
            Self::ListAllUsers => {
                let users = service.list_users(directory_id).await?;
                Ok(serde_json::to_string(&users)?)
            }
            Self::GetUserDetails => {
                let username = required_username(parameters)?;
                let user = service.describe_user(directory_id, username).await?;
                Ok(serde_json::to_string(&user)?)
            }
            Self::ListUserGroups => {
                let username = required_username(parameters)?;
                let groups = service.list_groups_for_member(directory_id, username).await?;
                Ok(serde_json::to_string(&groups)?)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryQueryError {
    #[error("unknown directory operation `{0}`")]
    UnknownOperation(String),
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),
    #[error(transparent)]
    Backend(#[from] DirectoryServiceError),
    #[error("result serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DirectoryQueryError {
    pub fn surfaceable_message(&self) -> Option<&str> {
        match self {
            Self::Backend(backend) => backend.surfaceable_message(),
            Self::UnknownOperation(_) | Self::MissingParameter(_) | Self::Serialization(_) => None,
        }
    }

    /// Body returned to the caller: service messages verbatim, everything else masked.
    pub fn response_body(&self) -> &str {
        self.surfaceable_message().unwrap_or(MASKED_ERROR_BODY)
    }
}

fn required_username(parameters: &[Parameter]) -> Result<&str, DirectoryQueryError> {
    find_parameter(parameters, USERNAME_PARAMETER)
        .ok_or(DirectoryQueryError::MissingParameter(USERNAME_PARAMETER))
}

pub struct DirectoryDataAdapter {
    service: Arc<dyn DirectoryService>,
    directory_id: String,
}

impl DirectoryDataAdapter {
    pub fn new(service: Arc<dyn DirectoryService>, settings: DirectorySettings) -> Self {
        Self { service, directory_id: settings.directory_id }
    }

    pub fn directory_id(&self) -> &str {
        &self.directory_id
    }

    pub async fn execute(
        &self,
        operation: &str,
        parameters: &[Parameter],
    ) -> Result<String, DirectoryQueryError> {
        let operation = DirectoryOperation::from_name(operation)
            .ok_or_else(|| DirectoryQueryError::UnknownOperation(operation.to_string()))?;

        let body = operation.run(self.service.as_ref(), &self.directory_id, parameters).await?;
        info!(
            event_name = "adapter.directory.query_succeeded",
            operation = operation.name(),
            directory_id = %self.directory_id,
            "directory query succeeded"
        );
        Ok(body)
    }

    pub async fn respond(&self, request: AgentRequest) -> AgentResponse {
        let request = decode(request);

        let body = match self.execute(&request.operation, &request.parameters).await {
            Ok(body) => body,
            Err(err) => match err.surfaceable_message() {
                Some(message) => {
                    warn!(
                        event_name = "adapter.directory.service_error",
                        correlation_id = %request.session_id,
                        operation = %request.operation,
                        error = %err,
                        "directory service rejected the query"
                    );
                    message.to_string()
                }
                None => {
                    error!(
                        event_name = "adapter.directory.query_failed",
                        correlation_id = %request.session_id,
                        operation = %request.operation,
                        error = %err,
                        "directory query failed; returning masked body"
                    );
                    MASKED_ERROR_BODY.to_string()
                }
            },
        };

        request.into_response(body)
    }
}

#[async_trait]
impl Adapter for DirectoryDataAdapter {
    fn name(&self) -> &'static str {
        DIRECTORY_ADAPTER_NAME
    }

    async fn handle(&self, request: AgentRequest) -> AgentResponse {
        self.respond(request).await
    }
}

#[cfg(test)]
mod tests {
    use adbridge_core::errors::DirectoryServiceError;
    use adbridge_core::MASKED_ERROR_BODY;

    use super::{DirectoryOperation, DirectoryQueryError};

    #[test]
    fn operation_names_round_trip() {
        for operation in DirectoryOperation::ALL {
            assert_eq!(DirectoryOperation::from_name(operation.name()), Some(operation));
        }
        assert_eq!(DirectoryOperation::from_name("ad-getallusers"), None);
    }

    #[test]
    fn only_service_errors_surface() {
        let service = DirectoryQueryError::from(DirectoryServiceError::service("User not found"));
        assert_eq!(service.response_body(), "User not found");

        let transport =
            DirectoryQueryError::from(DirectoryServiceError::Transport("reset".to_string()));
        assert_eq!(transport.response_body(), MASKED_ERROR_BODY);

        let missing = DirectoryQueryError::MissingParameter("username");
        assert_eq!(missing.response_body(), MASKED_ERROR_BODY);
    }
}
