//! Runs a managed command document on the management instance and returns its output.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use adbridge_core::config::CommandSettings;
use adbridge_core::domain::invocation::{CommandParameters, CommandRequest, WaitPolicy};
use adbridge_core::envelope::{decode, AgentRequest, AgentResponse, Parameter, MASKED_ERROR_BODY};
use adbridge_core::errors::CommandServiceError;

use crate::backend::CommandService;
use crate::registry::Adapter;

pub const COMMAND_ADAPTER_NAME: &str = "command";

pub struct CommandExecutionAdapter {
    service: Arc<dyn CommandService>,
    management_instance_id: String,
    wait: WaitPolicy,
}

impl CommandExecutionAdapter {
    pub fn new(service: Arc<dyn CommandService>, settings: CommandSettings) -> Self {
        Self {
            service,
            management_instance_id: settings.management_instance_id,
            wait: settings.wait,
        }
    }

    pub fn management_instance_id(&self) -> &str {
        &self.management_instance_id
    }

    /// The document is the operation name; the target is always the configured
    /// management instance.
    pub fn build_request(&self, operation: &str, parameters: &[Parameter]) -> CommandRequest {
        CommandRequest {
            target_id: self.management_instance_id.clone(),
            document_name: operation.to_string(),
            parameters: command_parameters(parameters),
        }
    }

    /// Submits the command, waits for it within the budget, and returns stdout on
    /// success or stderr for any other terminal status.
    pub async fn execute(
        &self,
        operation: &str,
        parameters: &[Parameter],
    ) -> Result<String, CommandServiceError> {
        let request = self.build_request(operation, parameters);
        let submitted = self.service.submit(&request).await?;

        info!(
            event_name = "adapter.command.submitted",
            invocation_id = %submitted.invocation_id.0,
            target_id = %submitted.target_id,
            document_name = %request.document_name,
            "command submitted"
        );

        self.service.await_completion(&submitted, &self.wait).await?;
        let result = self.service.invocation_result(&submitted).await?;

        info!(
            event_name = "adapter.command.completed",
            invocation_id = %submitted.invocation_id.0,
            status = result.status.as_str(),
            "command reached terminal status"
        );

        Ok(result.into_output())
    }

    /// Never fails: every error is logged and replaced with the masked body.
    pub async fn respond(&self, request: AgentRequest) -> AgentResponse {
        let request = decode(request);

        let body = match self.execute(&request.operation, &request.parameters).await {
            Ok(output) => output,
            Err(err) => {
                error!(
                    event_name = "adapter.command.failed",
                    correlation_id = %request.session_id,
                    operation = %request.operation,
                    error = %err,
                    "command execution failed; returning masked body"
                );
                MASKED_ERROR_BODY.to_string()
            }
        };

        request.into_response(body)
    }
}

#[async_trait]
impl Adapter for CommandExecutionAdapter {
    fn name(&self) -> &'static str {
        COMMAND_ADAPTER_NAME
    }

    async fn handle(&self, request: AgentRequest) -> AgentResponse {
        self.respond(request).await
    }
}

/// No parameters means no map at all; the command service treats an empty map
/// differently from an omitted one.
fn command_parameters(parameters: &[Parameter]) -> Option<CommandParameters> {
    if parameters.is_empty() {
        return None;
    }

    let mut map = CommandParameters::new();
    for parameter in parameters {
        map.insert(parameter.name.clone(), vec![parameter.value.clone()]);
    }
    Some(map)
}

#[cfg(test)]
mod tests {
    use adbridge_core::envelope::Parameter;

    use super::command_parameters;

    #[test]
    fn empty_parameter_list_omits_map() {
        assert_eq!(command_parameters(&[]), None);
    }

    #[test]
    fn parameters_become_single_value_lists() {
        let map = command_parameters(&[
            Parameter::string("username", "jdoe"),
            Parameter::string("ou", "Engineering"),
        ])
        .expect("map should be present");

        assert_eq!(map.get("username"), Some(&vec!["jdoe".to_string()]));
        assert_eq!(map.get("ou"), Some(&vec!["Engineering".to_string()]));
    }

    #[test]
    fn duplicate_names_keep_last_value() {
        let map = command_parameters(&[
            Parameter::string("username", "first"),
            Parameter::string("username", "second"),
        ])
        .expect("map should be present");

        assert_eq!(map.get("username"), Some(&vec!["second".to_string()]));
    }
}
