use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use adbridge_core::domain::directory::{GroupRecord, UserDetails, UserRecord};
use adbridge_core::domain::invocation::{
    CommandRequest, InvocationId, InvocationResult, InvocationStatus, SubmittedCommand,
};
use adbridge_core::errors::{CommandServiceError, DirectoryServiceError};

use crate::backend::{CommandService, DirectoryService};

/// Scripted outcome for one command document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedCommand {
    pub status: InvocationStatus,
    pub standard_output: String,
    pub standard_error: String,
    /// Status queries answered with `InProgress` before `status` is reported.
    pub pending_polls: u32,
}

impl ScriptedCommand {
    pub fn succeeds(standard_output: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Success,
            standard_output: standard_output.into(),
            standard_error: String::new(),
            pending_polls: 0,
        }
    }

    pub fn fails(standard_error: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Failed,
            standard_output: String::new(),
            standard_error: standard_error.into(),
            pending_polls: 0,
        }
    }

    pub fn never_finishes() -> Self {
        Self {
            status: InvocationStatus::InProgress,
            standard_output: String::new(),
            standard_error: String::new(),
            pending_polls: 0,
        }
    }

    pub fn with_status(mut self, status: InvocationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn after_polls(mut self, pending_polls: u32) -> Self {
        self.pending_polls = pending_polls;
        self
    }
}

#[derive(Debug)]
struct TrackedInvocation {
    script: ScriptedCommand,
    polls: u32,
}

#[derive(Default)]
pub struct InMemoryCommandService {
    scripts: HashMap<String, ScriptedCommand>,
    submission_error: Option<String>,
    poll_error: Option<String>,
    submitted: RwLock<Vec<CommandRequest>>,
    invocations: RwLock<HashMap<InvocationId, TrackedInvocation>>,
}

impl InMemoryCommandService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(
        mut self,
        document_name: impl Into<String>,
        script: ScriptedCommand,
    ) -> Self {
        self.scripts.insert(document_name.into(), script);
        self
    }

    pub fn failing_submissions(mut self, message: impl Into<String>) -> Self {
        self.submission_error = Some(message.into());
        self
    }

    /// Submissions succeed but every status query fails with `message`.
    pub fn failing_polls(mut self, message: impl Into<String>) -> Self {
        self.poll_error = Some(message.into());
        self
    }

    pub async fn submitted(&self) -> Vec<CommandRequest> {
        self.submitted.read().await.clone()
    }

    pub async fn status_queries(&self) -> u32 {
        self.invocations.read().await.values().map(|invocation| invocation.polls).sum()
    }
}

#[async_trait]
impl CommandService for InMemoryCommandService {
    async fn submit(
        &self,
        request: &CommandRequest,
    ) -> Result<SubmittedCommand, CommandServiceError> {
        self.submitted.write().await.push(request.clone());

        if let Some(message) = &self.submission_error {
            return Err(CommandServiceError::Submission(message.clone()));
        }

        let script = self.scripts.get(&request.document_name).cloned().ok_or_else(|| {
            CommandServiceError::Submission(format!(
                "document `{}` does not exist",
                request.document_name
            ))
        })?;

        let invocation_id = InvocationId(Uuid::new_v4().to_string());
        self.invocations
            .write()
            .await
            .insert(invocation_id.clone(), TrackedInvocation { script, polls: 0 });

        Ok(SubmittedCommand { invocation_id, target_id: request.target_id.clone() })
    }

    async fn invocation_result(
        &self,
        command: &SubmittedCommand,
    ) -> Result<InvocationResult, CommandServiceError> {
        let mut invocations = self.invocations.write().await;
        let invocation = invocations.get_mut(&command.invocation_id).ok_or_else(|| {
            CommandServiceError::Poll(format!(
                "invocation `{}` does not exist",
                command.invocation_id.0
            ))
        })?;

        invocation.polls += 1;
        if let Some(message) = &self.poll_error {
            return Err(CommandServiceError::Poll(message.clone()));
        }
        if invocation.polls <= invocation.script.pending_polls {
            return Ok(InvocationResult {
                status: InvocationStatus::InProgress,
                standard_output: String::new(),
                standard_error: String::new(),
            });
        }

        Ok(InvocationResult {
            status: invocation.script.status,
            standard_output: invocation.script.standard_output.clone(),
            standard_error: invocation.script.standard_error.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryCall {
    ListUsers { directory_id: String },
    DescribeUser { directory_id: String, account_name: String },
    ListGroupsForMember { directory_id: String, account_name: String },
}

#[derive(Default)]
pub struct InMemoryDirectoryService {
    users: Vec<UserDetails>,
    groups: HashMap<String, Vec<GroupRecord>>,
    failure: Option<DirectoryServiceError>,
    calls: RwLock<Vec<DirectoryCall>>,
}

impl InMemoryDirectoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserDetails) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_groups(
        mut self,
        account_name: impl Into<String>,
        groups: Vec<GroupRecord>,
    ) -> Self {
        self.groups.insert(account_name.into(), groups);
        self
    }

    /// Every call fails with `error`.
    pub fn failing_with(mut self, error: DirectoryServiceError) -> Self {
        self.failure = Some(error);
        self
    }

    pub async fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: DirectoryCall) -> Result<(), DirectoryServiceError> {
        self.calls.write().await.push(call);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn find_user(&self, account_name: &str) -> Result<&UserDetails, DirectoryServiceError> {
        self.users.iter().find(|user| user.sam_account_name == account_name).ok_or_else(|| {
            DirectoryServiceError::Service {
                code: Some("ResourceNotFoundException".to_string()),
                message: "User not found".to_string(),
            }
        })
    }
}

#[async_trait]
impl DirectoryService for InMemoryDirectoryService {
    async fn list_users(
        &self,
        directory_id: &str,
    ) -> Result<Vec<UserRecord>, DirectoryServiceError> {
        self.record(DirectoryCall::ListUsers { directory_id: directory_id.to_string() }).await?;

        Ok(self
            .users
            .iter()
            .map(|user| UserRecord {
                sam_account_name: user.sam_account_name.clone(),
                sid: user.sid.clone(),
                given_name: user.given_name.clone(),
                surname: user.surname.clone(),
                enabled: user.enabled,
            })
            .collect())
    }

    async fn describe_user(
        &self,
        directory_id: &str,
        account_name: &str,
    ) -> Result<UserDetails, DirectoryServiceError> {
        self.record(DirectoryCall::DescribeUser {
            directory_id: directory_id.to_string(),
            account_name: account_name.to_string(),
        })
        .await?;

        self.find_user(account_name).cloned()
    }

    async fn list_groups_for_member(
        &self,
        directory_id: &str,
        account_name: &str,
    ) -> Result<Vec<GroupRecord>, DirectoryServiceError> {
        self.record(DirectoryCall::ListGroupsForMember {
            directory_id: directory_id.to_string(),
            account_name: account_name.to_string(),
        })
        .await?;

        self.find_user(account_name)?;
        Ok(self.groups.get(account_name).cloned().unwrap_or_default())
    }
}
