use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_ssm::error::{DisplayErrorContext, SdkError};
use aws_sdk_ssm::operation::get_command_invocation::GetCommandInvocationError;
use aws_sdk_ssm::operation::send_command::SendCommandOutput;
use aws_sdk_ssm::Client;
use tracing::debug;

use adbridge_adapters::backend::CommandService;
use adbridge_core::domain::invocation::{
    CommandRequest, InvocationId, InvocationResult, InvocationStatus, SubmittedCommand,
};
use adbridge_core::errors::CommandServiceError;

/// Runs command documents on managed instances through Systems Manager.
#[derive(Clone, Debug)]
pub struct SsmCommandService {
    client: Client,
}

impl SsmCommandService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl CommandService for SsmCommandService {
    async fn submit(
        &self,
        request: &CommandRequest,
    ) -> Result<SubmittedCommand, CommandServiceError> {
        let parameters = request
            .parameters
            .as_ref()
            .map(|parameters| parameters.clone().into_iter().collect());

        let output = self
            .client
            .send_command()
            .instance_ids(request.target_id.clone())
            .document_name(request.document_name.clone())
            .set_parameters(parameters)
            .send()
            .await
            .map_err(|err| {
                CommandServiceError::Submission(DisplayErrorContext(&err).to_string())
            })?;

        acknowledged(&output)
    }

    async fn invocation_result(
        &self,
        command: &SubmittedCommand,
    ) -> Result<InvocationResult, CommandServiceError> {
        let response = self
            .client
            .get_command_invocation()
            .command_id(command.invocation_id.0.clone())
            .instance_id(command.target_id.clone())
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(err) => return map_poll_error(err, command),
        };

        let status = parse_status(output.status().map(|status| status.as_str()))?;

        Ok(InvocationResult {
            status,
            standard_output: output.standard_output_content().unwrap_or_default().to_string(),
            standard_error: output.standard_error_content().unwrap_or_default().to_string(),
        })
    }
}

fn acknowledged(output: &SendCommandOutput) -> Result<SubmittedCommand, CommandServiceError> {
    let command =
        output.command().ok_or(CommandServiceError::IncompleteAcknowledgement("Command"))?;
    let invocation_id = command
        .command_id()
        .ok_or(CommandServiceError::IncompleteAcknowledgement("CommandId"))?;
    let target_id = command
        .instance_ids()
        .first()
        .ok_or(CommandServiceError::IncompleteAcknowledgement("InstanceIds"))?;

    Ok(SubmittedCommand {
        invocation_id: InvocationId(invocation_id.to_string()),
        target_id: target_id.clone(),
    })
}

/// Invocations become visible shortly after SendCommand returns, so "does not exist"
/// reads as pending. Every other failure ends the wait.
fn map_poll_error<R>(
    err: SdkError<GetCommandInvocationError, R>,
    command: &SubmittedCommand,
) -> Result<InvocationResult, CommandServiceError>
where
    R: Debug + 'static,
{
    let not_visible = err
        .as_service_error()
        .map(GetCommandInvocationError::is_invocation_does_not_exist)
        .unwrap_or(false);

    if not_visible {
        debug!(
            event_name = "backend.ssm.invocation_not_visible",
            invocation_id = %command.invocation_id.0,
            "invocation not yet visible; reporting pending"
        );
        return Ok(pending());
    }

    Err(CommandServiceError::Poll(DisplayErrorContext(&err).to_string()))
}

fn pending() -> InvocationResult {
    InvocationResult {
        status: InvocationStatus::Pending,
        standard_output: String::new(),
        standard_error: String::new(),
    }
}

/// A missing status means the invocation has not been scheduled yet.
fn parse_status(raw: Option<&str>) -> Result<InvocationStatus, CommandServiceError> {
    match raw {
        None => Ok(InvocationStatus::Pending),
        Some(value) => InvocationStatus::parse(value).ok_or_else(|| {
            CommandServiceError::Poll(format!("unrecognized invocation status `{value}`"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_ssm::error::{ErrorMetadata, SdkError};
    use aws_sdk_ssm::operation::get_command_invocation::GetCommandInvocationError;
    use aws_sdk_ssm::operation::send_command::SendCommandOutput;
    use aws_sdk_ssm::types::error::InvocationDoesNotExist;
    use aws_sdk_ssm::types::Command;

    use adbridge_core::domain::invocation::{InvocationId, InvocationStatus, SubmittedCommand};
    use adbridge_core::errors::CommandServiceError;

    use super::{acknowledged, map_poll_error, parse_status};

    fn submitted() -> SubmittedCommand {
        SubmittedCommand {
            invocation_id: InvocationId("c-0f1e2d3c".to_string()),
            target_id: "i-0123456789abcdef0".to_string(),
        }
    }

    #[test]
    fn missing_status_is_pending() {
        assert_eq!(parse_status(None), Ok(InvocationStatus::Pending));
    }

    #[test]
    fn service_statuses_map_onto_lifecycle() {
        assert_eq!(parse_status(Some("Success")), Ok(InvocationStatus::Success));
        assert_eq!(parse_status(Some("Delayed")), Ok(InvocationStatus::Pending));
        assert_eq!(parse_status(Some("Cancelling")), Ok(InvocationStatus::InProgress));
    }

    #[test]
    fn unknown_status_is_a_poll_failure() {
        assert!(matches!(parse_status(Some("Paused")), Err(CommandServiceError::Poll(_))));
    }

    #[test]
    fn invisible_invocation_reads_as_pending() {
        let err = SdkError::<GetCommandInvocationError, ()>::service_error(
            GetCommandInvocationError::InvocationDoesNotExist(
                InvocationDoesNotExist::builder().build(),
            ),
            (),
        );

        let result = map_poll_error(err, &submitted()).expect("should report pending");
        assert_eq!(result.status, InvocationStatus::Pending);
        assert!(result.standard_output.is_empty());
    }

    #[test]
    fn other_service_errors_end_the_wait() {
        let metadata =
            ErrorMetadata::builder().code("ThrottlingException").message("Rate exceeded").build();
        let err = SdkError::<GetCommandInvocationError, ()>::service_error(
            GetCommandInvocationError::generic(metadata),
            (),
        );

        assert!(matches!(map_poll_error(err, &submitted()), Err(CommandServiceError::Poll(_))));
    }

    #[test]
    fn transport_failures_end_the_wait() {
        let err = SdkError::<GetCommandInvocationError, ()>::timeout_error("read timed out");

        assert!(matches!(map_poll_error(err, &submitted()), Err(CommandServiceError::Poll(_))));
    }

    #[test]
    fn acknowledgement_needs_command_id_and_target() {
        let empty = SendCommandOutput::builder().build();
        assert_eq!(
            acknowledged(&empty),
            Err(CommandServiceError::IncompleteAcknowledgement("Command"))
        );

        let without_id = SendCommandOutput::builder()
            .command(Command::builder().instance_ids("i-0123456789abcdef0").build())
            .build();
        assert_eq!(
            acknowledged(&without_id),
            Err(CommandServiceError::IncompleteAcknowledgement("CommandId"))
        );

        let without_target = SendCommandOutput::builder()
            .command(Command::builder().command_id("c-0f1e2d3c").build())
            .build();
        assert_eq!(
            acknowledged(&without_target),
            Err(CommandServiceError::IncompleteAcknowledgement("InstanceIds"))
        );
    }

    #[test]
    fn full_acknowledgement_identifies_the_invocation() {
        let output = SendCommandOutput::builder()
            .command(
                Command::builder()
                    .command_id("c-0f1e2d3c")
                    .instance_ids("i-0123456789abcdef0")
                    .build(),
            )
            .build();

        assert_eq!(acknowledged(&output), Ok(submitted()));
    }
}
