use async_trait::async_trait;

use adbridge_core::domain::directory::{GroupRecord, UserDetails, UserRecord};
use adbridge_core::domain::invocation::{
    CommandRequest, InvocationResult, SubmittedCommand, WaitPolicy,
};
use adbridge_core::errors::{CommandServiceError, DirectoryServiceError};

/// Remote command-execution service.
#[async_trait]
pub trait CommandService: Send + Sync {
    async fn submit(&self, request: &CommandRequest)
        -> Result<SubmittedCommand, CommandServiceError>;

    async fn invocation_result(
        &self,
        command: &SubmittedCommand,
    ) -> Result<InvocationResult, CommandServiceError>;

    /// Polls [`CommandService::invocation_result`] until the invocation is terminal or
    /// the wait budget runs out. The first status query is issued immediately.
    async fn await_completion(
        &self,
        command: &SubmittedCommand,
        policy: &WaitPolicy,
    ) -> Result<(), CommandServiceError> {
        let poll = async {
            loop {
                let result = self.invocation_result(command).await?;
                if result.status.is_terminal() {
                    return Ok::<(), CommandServiceError>(());
                }
                tokio::time::sleep(policy.poll_interval).await;
            }
        };

        match tokio::time::timeout(policy.budget, poll).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CommandServiceError::WaitTimeout {
                invocation_id: command.invocation_id.clone(),
                budget: policy.budget,
            }),
        }
    }
}

/// Directory-data service scoped by directory id and account name.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_users(&self, directory_id: &str)
        -> Result<Vec<UserRecord>, DirectoryServiceError>;

    async fn describe_user(
        &self,
        directory_id: &str,
        account_name: &str,
    ) -> Result<UserDetails, DirectoryServiceError>;

    async fn list_groups_for_member(
        &self,
        directory_id: &str,
        account_name: &str,
    ) -> Result<Vec<GroupRecord>, DirectoryServiceError>;
}
