use std::sync::Arc;

use lambda_runtime::{Context, LambdaEvent};
use serde_json::{json, Value};

use adbridge_adapters::memory::{InMemoryCommandService, InMemoryDirectoryService, ScriptedCommand};
use adbridge_core::config::{AppConfig, ConfigError};
use adbridge_core::domain::directory::UserDetails;
use adbridge_core::envelope::AgentRequest;
use adbridge_lambda::{build_command_adapter, build_directory_adapter, handle_event, BootstrapError};

fn configured() -> AppConfig {
    let mut config = AppConfig::default();
    config.command.management_instance_id = Some("i-0123456789abcdef0".to_string());
    config.directory.directory_id = Some("d-9067a1b2c3".to_string());
    config
}

fn event(payload: Value) -> LambdaEvent<AgentRequest> {
    let request: AgentRequest = serde_json::from_value(payload).expect("request decodes");
    LambdaEvent::new(request, Context::default())
}

fn agent_event(function: &str, parameters: Value) -> Value {
    json!({
        "messageVersion": "1.0",
        "agent": {
            "name": "ad-admin-agent",
            "id": "AGENT01",
            "alias": "TSTALIASID",
            "version": "DRAFT"
        },
        "inputText": "list the users",
        "sessionId": "session-42",
        "actionGroup": "ad-actions",
        "function": function,
        "parameters": parameters,
        "sessionAttributes": { "tenant": "corp" },
        "promptSessionAttributes": {}
    })
}

#[tokio::test]
async fn command_event_round_trips_through_the_wire_shape() {
    let service = Arc::new(
        InMemoryCommandService::new()
            .with_script("AD-GetAllUsers", ScriptedCommand::succeeds("jdoe\nasmith\n")),
    );
    let adapter = build_command_adapter(&configured(), service).expect("adapter builds");

    let response = handle_event(&adapter, event(agent_event("AD-GetAllUsers", json!([]))))
        .await
        .expect("handler never fails");

    let wire = serde_json::to_value(&response).expect("response encodes");
    assert_eq!(
        wire,
        json!({
            "messageVersion": "1.0",
            "response": {
                "actionGroup": "ad-actions",
                "function": "AD-GetAllUsers",
                "functionResponse": {
                    "responseBody": { "TEXT": { "body": "jdoe\nasmith\n" } }
                }
            },
            "sessionAttributes": { "tenant": "corp" },
            "promptSessionAttributes": {}
        })
    );
}

#[tokio::test]
async fn directory_event_without_parameters_is_accepted() {
    let mut payload = agent_event("AD-GetUserDetails", Value::Null);
    if let Some(fields) = payload.as_object_mut() {
        fields.remove("parameters");
    }

    let service = Arc::new(InMemoryDirectoryService::new().with_user(UserDetails {
        sam_account_name: "jdoe".to_string(),
        ..UserDetails::default()
    }));
    let adapter = build_directory_adapter(&configured(), service).expect("adapter builds");

    let response = handle_event(&adapter, event(payload)).await.expect("handler never fails");

    assert_eq!(response.text_body(), Some("There was an error"));
    assert_eq!(response.response.operation, "AD-GetUserDetails");
}

#[test]
fn adapters_take_their_targets_from_config() {
    let command = build_command_adapter(&configured(), Arc::new(InMemoryCommandService::new()))
        .expect("command adapter builds");
    assert_eq!(command.management_instance_id(), "i-0123456789abcdef0");

    let directory =
        build_directory_adapter(&configured(), Arc::new(InMemoryDirectoryService::new()))
            .expect("directory adapter builds");
    assert_eq!(directory.directory_id(), "d-9067a1b2c3");
}

#[test]
fn missing_ids_fail_at_startup() {
    let config = AppConfig::default();

    let command = build_command_adapter(&config, Arc::new(InMemoryCommandService::new()));
    match command {
        Err(BootstrapError::Config(ConfigError::Validation(message))) => {
            assert!(message.contains("AD_MANAGEMENT_INSTANCE_ID"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("command adapter should require an instance id"),
    }

    let directory = build_directory_adapter(&config, Arc::new(InMemoryDirectoryService::new()));
    match directory {
        Err(BootstrapError::Config(ConfigError::Validation(message))) => {
            assert!(message.contains("DIRECTORY_ID"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("directory adapter should require a directory id"),
    }
}
