//! Function-call envelope exchanged between the conversational agent and an adapter.
//!
//! The field names follow the agent's wire format exactly (`messageVersion`,
//! `function`, `promptSessionAttributes`, ...). Both adapters consume an
//! [`AgentRequest`] and always produce a well-formed [`AgentResponse`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Content-type tag under which adapters place their response text.
pub const TEXT_CONTENT_TYPE: &str = "TEXT";

/// Body returned whenever an adapter masks the underlying failure.
pub const MASKED_ERROR_BODY: &str = "There was an error";

pub type Attributes = BTreeMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub name: String,
    pub id: String,
    pub alias: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub value: String,
}

impl Parameter {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), declared_type: "string".to_string(), value: value.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub message_version: String,
    #[serde(default)]
    pub agent: AgentIdentity,
    #[serde(default)]
    pub input_text: String,
    pub session_id: String,
    pub action_group: String,
    #[serde(rename = "function")]
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default)]
    pub session_attributes: Attributes,
    #[serde(default)]
    pub prompt_session_attributes: Attributes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseState {
    Failure,
    Reprompt,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBody {
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_state: Option<ResponseState>,
    pub response_body: BTreeMap<String, ContentBody>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub action_group: String,
    #[serde(rename = "function")]
    pub operation: String,
    pub function_response: FunctionResponse,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub message_version: String,
    pub response: ResponsePayload,
    pub session_attributes: Attributes,
    pub prompt_session_attributes: Attributes,
}

impl AgentResponse {
    /// Text placed under the `TEXT` content type, if any.
    pub fn text_body(&self) -> Option<&str> {
        self.response
            .function_response
            .response_body
            .get(TEXT_CONTENT_TYPE)
            .map(|content| content.body.as_str())
    }
}

/// The fields an adapter reads from a request, pulled out of the wire shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedRequest {
    pub message_version: String,
    pub agent: AgentIdentity,
    pub input_text: String,
    pub session_id: String,
    pub action_group: String,
    pub operation: String,
    pub parameters: Vec<Parameter>,
    pub session_attributes: Attributes,
    pub prompt_session_attributes: Attributes,
}

impl DecodedRequest {
    pub fn parameter(&self, name: &str) -> Option<&str> {
        find_parameter(&self.parameters, name)
    }

    pub fn into_response(self, body: impl Into<String>) -> AgentResponse {
        encode(
            self.action_group,
            self.operation,
            body,
            self.session_attributes,
            self.prompt_session_attributes,
            self.message_version,
        )
    }
}

/// Extracts the adapter-relevant fields. No validation beyond what deserialization
/// already enforced; an absent parameter list becomes an empty one.
pub fn decode(request: AgentRequest) -> DecodedRequest {
    DecodedRequest {
        message_version: request.message_version,
        agent: request.agent,
        input_text: request.input_text,
        session_id: request.session_id,
        action_group: request.action_group,
        operation: request.operation,
        parameters: request.parameters.unwrap_or_default(),
        session_attributes: request.session_attributes,
        prompt_session_attributes: request.prompt_session_attributes,
    }
}

pub fn encode(
    action_group: impl Into<String>,
    operation: impl Into<String>,
    body: impl Into<String>,
    session_attributes: Attributes,
    prompt_session_attributes: Attributes,
    message_version: impl Into<String>,
) -> AgentResponse {
    let mut response_body = BTreeMap::new();
    response_body.insert(TEXT_CONTENT_TYPE.to_string(), ContentBody { body: body.into() });

    AgentResponse {
        message_version: message_version.into(),
        response: ResponsePayload {
            action_group: action_group.into(),
            operation: operation.into(),
            function_response: FunctionResponse { response_state: None, response_body },
        },
        session_attributes,
        prompt_session_attributes,
    }
}

/// First parameter named `name`, if present.
pub fn find_parameter<'a>(parameters: &'a [Parameter], name: &str) -> Option<&'a str> {
    parameters
        .iter()
        .find(|parameter| parameter.name == name)
        .map(|parameter| parameter.value.as_str())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{decode, encode, find_parameter, AgentRequest, Attributes, Parameter};

    fn wire_request() -> serde_json::Value {
        json!({
            "messageVersion": "1.0",
            "agent": {"name": "ad-agent", "id": "AGENT1", "alias": "TSTALIASID", "version": "DRAFT"},
            "inputText": "what groups is jdoe in?",
            "sessionId": "session-42",
            "actionGroup": "managed-ad-data",
            "function": "AD-GetUserGroups",
            "parameters": [{"name": "username", "type": "string", "value": "jdoe"}],
            "sessionAttributes": {"tenant": "corp"},
            "promptSessionAttributes": {}
        })
    }

    #[test]
    fn request_deserializes_from_wire_names() {
        let request: AgentRequest =
            serde_json::from_value(wire_request()).expect("request should deserialize");

        assert_eq!(request.operation, "AD-GetUserGroups");
        assert_eq!(request.agent.alias, "TSTALIASID");
        assert_eq!(request.session_attributes.get("tenant").map(String::as_str), Some("corp"));

        let decoded = decode(request);
        assert_eq!(decoded.parameter("username"), Some("jdoe"));
        assert_eq!(decoded.session_id, "session-42");
    }

    #[test]
    fn missing_parameters_and_attributes_decode_as_empty() {
        let request: AgentRequest = serde_json::from_value(json!({
            "messageVersion": "1.0",
            "sessionId": "s",
            "actionGroup": "g",
            "function": "AD-GetAllUsers"
        }))
        .expect("minimal request should deserialize");

        assert!(request.parameters.is_none());
        let decoded = decode(request);
        assert!(decoded.parameters.is_empty());
        assert!(decoded.session_attributes.is_empty());
        assert!(decoded.prompt_session_attributes.is_empty());
    }

    #[test]
    fn response_serializes_text_body_and_echoes_attributes() {
        let mut session = Attributes::new();
        session.insert("tenant".to_string(), "corp".to_string());

        let response =
            encode("group", "AD-GetAllUsers", "user1\nuser2", session, Attributes::new(), "1.0");
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(
            value,
            json!({
                "messageVersion": "1.0",
                "response": {
                    "actionGroup": "group",
                    "function": "AD-GetAllUsers",
                    "functionResponse": {
                        "responseBody": {"TEXT": {"body": "user1\nuser2"}}
                    }
                },
                "sessionAttributes": {"tenant": "corp"},
                "promptSessionAttributes": {}
            })
        );
        assert_eq!(response.text_body(), Some("user1\nuser2"));
    }

    #[test]
    fn find_parameter_returns_first_match() {
        let parameters = vec![
            Parameter::string("username", "first"),
            Parameter::string("username", "second"),
            Parameter::string("domain", "corp"),
        ];

        assert_eq!(find_parameter(&parameters, "username"), Some("first"));
        assert_eq!(find_parameter(&parameters, "domain"), Some("corp"));
        assert_eq!(find_parameter(&parameters, "missing"), None);
    }
}
