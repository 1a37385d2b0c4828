//! OpenAI-compatible completion provider
//!
//! Works with any API that implements the OpenAI chat completions
//! format, including local servers and hosted gateways. Tool calls are
//! carried natively on the wire: the request advertises the catalogue
//! and the response's `tool_calls` are handed back verbatim for the
//! chat engine to dispatch.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::{Message, Role, ToolCall};
use crate::tools::ToolDefinition;

use super::{CompletionService, ProviderError};

/// Sampling temperature for every completion call.
const TEMPERATURE: f32 = 0.7;

/// Wire-format chat message
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            }
            .to_string(),
            content: msg.content.clone(),
            tool_call_id: msg.tool_call_id.clone(),
            tool_calls: msg
                .tool_calls
                .as_ref()
                .map(|calls| calls.iter().map(ToolCallPayload::from).collect()),
        }
    }
}

/// Tool declaration in the request body
#[derive(Debug, Clone, Serialize)]
struct ToolDef {
    #[serde(rename = "type")]
    tool_type: String,
    function: FunctionDef,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDef {
    name: String,
    description: String,
    parameters: Value,
}

impl From<&ToolDefinition> for ToolDef {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallPayload>>,
}

/// Tool call as it appears on the wire, in both directions
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: FunctionPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionPayload {
    name: String,
    /// JSON string of arguments, exactly as the service produced it.
    arguments: String,
}

impl From<&ToolCall> for ToolCallPayload {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            call_type: "function".to_string(),
            function: FunctionPayload {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }
}

impl From<ToolCallPayload> for ToolCall {
    fn from(payload: ToolCallPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.function.name,
            arguments: payload.function.arguments,
        }
    }
}

/// Error response from the API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenAI-compatible API provider
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiProvider {
    /// Create a new provider.
    ///
    /// No request timeout is configured: a completion call blocks until
    /// the service answers or the connection drops.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> ChatCompletionRequest {
        let tools: Option<Vec<ToolDef>> =
            tools.map(|defs| defs.iter().map(ToolDef::from).collect());
        // The model chooses freely whether to call a tool.
        let tool_choice = tools.as_ref().map(|_| "auto".to_string());

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            temperature: TEMPERATURE,
            tools,
            tool_choice,
        }
    }
}

/// Turn a non-success response into a provider error, preferring the
/// API's own error message when the body parses.
fn error_from_body(status: reqwest::StatusCode, body: &str) -> ProviderError {
    if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(body) {
        return ProviderError::InvalidResponse(format!("API error: {}", error_resp.error.message));
    }
    ProviderError::InvalidResponse(format!("HTTP {status}: {body}"))
}

/// Parse a completion body into an assistant message, carrying any tool
/// calls through verbatim.
fn parse_completion(body: &str) -> Result<Message, ProviderError> {
    let completion: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .filter(|calls| !calls.is_empty())
        .map(|calls| calls.into_iter().map(ToolCall::from).collect());

    Ok(Message {
        role: Role::Assistant,
        content: choice.message.content.unwrap_or_default(),
        tool_call_id: None,
        tool_calls,
    })
}

#[async_trait]
impl CompletionService for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Message, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(messages, tools);

        let mut req_builder = self.client.post(&url);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = req_builder
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        parse_completion(&body)
    }
}
