//! OpenAI-compatible chat completions backend.
//!
//! Works with any endpoint speaking the `/chat/completions` protocol with
//! function tools (Groq, OpenAI, local servers).

use crate::llm::{Backend, ModelError, ModelRequest, ModelResponse, ToolCall, Turn, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ApiToolCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

impl<'a> ApiMessage<'a> {
    fn text(role: &'static str, content: &'a str) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: ApiFunctionCall<'a>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionCall<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ApiFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ApiFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ApiResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ApiResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Builder for creating an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiBackendBuilder {
    /// Create a new builder with the endpoint credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Base URL without the `/chat/completions` suffix.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the maximum tokens for responses.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the backend.
    pub fn build(self) -> OpenAiBackend {
        OpenAiBackend {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", self.base_url.trim_end_matches('/')),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
        }
    }
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    /// Create a builder for the backend.
    pub fn builder(api_key: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, request: &ModelRequest<'a>) -> ApiRequest<'a> {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if let Some(system) = request.system {
            messages.push(ApiMessage::text("system", system));
        }
        messages.extend(request.turns.iter().map(to_api_message));

        ApiRequest {
            model: &self.model,
            messages,
            tools: request
                .tools
                .iter()
                .map(|spec| ApiTool {
                    tool_type: "function",
                    function: ApiFunction {
                        name: &spec.name,
                        description: &spec.description,
                        parameters: &spec.input_schema,
                    },
                })
                .collect(),
            tool_choice: (!request.tools.is_empty()).then_some("auto"),
            max_tokens: self.max_tokens,
        }
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({}, {})", self.model, self.endpoint)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        parse_response(&body)
    }
}

fn to_api_message(turn: &Turn) -> ApiMessage<'_> {
    match turn {
        Turn::User { content } => ApiMessage::text("user", content),
        Turn::Assistant {
            content,
            tool_calls,
        } => ApiMessage {
            role: "assistant",
            content: (!content.is_empty() || tool_calls.is_empty()).then_some(content.as_str()),
            tool_calls: tool_calls
                .iter()
                .map(|call| ApiToolCall {
                    id: &call.id,
                    call_type: "function",
                    function: ApiFunctionCall {
                        name: &call.name,
                        arguments: &call.arguments,
                    },
                })
                .collect(),
            tool_call_id: None,
        },
        Turn::ToolResult {
            tool_call_id,
            content,
        } => ApiMessage {
            tool_call_id: Some(tool_call_id.as_str()),
            ..ApiMessage::text("tool", content)
        },
    }
}

/// Decode a completions response body into the first choice's turn.
fn parse_response(body: &str) -> Result<ModelResponse, ModelError> {
    let api_response: ApiResponse =
        serde_json::from_str(body).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

    let usage = api_response.usage.unwrap_or_default();
    let message = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidResponse("response has no choices".into()))?
        .message;

    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id.unwrap_or_default(),
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    Ok(ModelResponse {
        content: message.content.unwrap_or_default(),
        tool_calls,
        usage: Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tools::ToolSpec;

    fn backend() -> OpenAiBackend {
        OpenAiBackend::builder("test-key")
            .model("test-model")
            .base_url("http://localhost:9999/v1/")
            .max_tokens(128)
            .build()
    }

    #[test]
    fn display_shows_model_and_endpoint() {
        assert_eq!(
            backend().to_string(),
            "openai(test-model, http://localhost:9999/v1/chat/completions)"
        );
    }

    #[test]
    fn request_maps_every_turn_kind() {
        let backend = backend();
        let turns = vec![
            Turn::user("list files"),
            Turn::Assistant {
                content: String::new(),
                tool_calls: vec![ToolCall::new("call_1", "list_files", "{}")],
            },
            Turn::tool_result("call_1", "[\"a.txt\"]"),
            Turn::assistant("There is one file."),
        ];
        let specs = vec![ToolSpec::new("list_files", "List files", json!({"type": "object"}))];
        let request = ModelRequest {
            system: Some("be brief"),
            turns: &turns,
            tools: &specs,
        };

        let value = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "test-model",
                "max_tokens": 128,
                "tool_choice": "auto",
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "list_files",
                        "description": "List files",
                        "parameters": {"type": "object"},
                    },
                }],
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "list files"},
                    {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "list_files", "arguments": "{}"},
                        }],
                    },
                    {"role": "tool", "content": "[\"a.txt\"]", "tool_call_id": "call_1"},
                    {"role": "assistant", "content": "There is one file."},
                ],
            })
        );
    }

    #[test]
    fn request_without_tools_omits_tool_choice() {
        let backend = backend();
        let turns = vec![Turn::user("hi")];
        let request = ModelRequest {
            system: None,
            turns: &turns,
            tools: &[],
        };
        let value = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("tool_choice").is_none());
    }

    #[test]
    fn parse_text_response() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.content, "Hello!");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.total_tokens(), 15);
    }

    #[test]
    fn parse_tool_call_response() {
        let body = r#"{
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {"id": "call_a", "type": "function",
                     "function": {"name": "read_file", "arguments": "{\"path\":\"main.go\"}"}},
                    {"type": "function", "function": {"name": "list_files"}}
                ]
            }}]
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.content, "");
        assert_eq!(
            response.tool_calls,
            vec![
                ToolCall::new("call_a", "read_file", r#"{"path":"main.go"}"#),
                ToolCall::new("", "list_files", ""),
            ]
        );
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn parse_rejects_empty_choices() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
