//! Ollama backend adapter.
//!
//! Talks to a local Ollama server over its native HTTP API and
//! implements the [`ModelBackend`] / [`BackendSession`] ports. The
//! `/api/tags` probe backs the availability check; `/api/chat` (non-
//! streaming) serves generation. When the session's tool registry is
//! non-empty, tool definitions are surfaced in OpenAI-compatible
//! format and reported tool calls are resolved through the registry,
//! bounded to a fixed number of rounds per request.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vault_application::ports::backend::{BackendError, BackendSession, ModelBackend};
use vault_domain::{
    GenerationOptions, ModelAvailability, ResponseTurn, SessionConfig, ToolCall, ToolDefinition,
    ToolInvocation, ToolRegistry, UnavailableReason,
};

/// Upper bound on tool-call resolution rounds within one request.
const MAX_TOOL_ROUNDS: usize = 4;

/// Connection settings for an Ollama server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Server endpoint (default: http://localhost:11434)
    pub endpoint: String,
    /// Model name (e.g., "llama3.2:3b")
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: model.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new("llama3.2:3b")
    }
}

/// [`ModelBackend`] adapter for an Ollama server.
pub struct OllamaBackend {
    config: OllamaConfig,
    client: Client,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Result<Self, BackendError> {
        debug!("creating Ollama backend for {}", config.endpoint);
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn availability(&self) -> ModelAvailability {
        let url = format!("{}/api/tags", self.config.endpoint);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                return ModelAvailability::Unavailable(UnavailableReason::Other(e.to_string()));
            }
        };

        if !response.status().is_success() {
            let detail = format!("tags query returned HTTP {}", response.status());
            return ModelAvailability::Unavailable(UnavailableReason::Other(detail));
        }

        match response.json::<TagsResponse>().await {
            Ok(tags) => classify_tags(&tags, &self.config.model),
            Err(e) => ModelAvailability::Unavailable(UnavailableReason::Other(e.to_string())),
        }
    }

    async fn open_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Arc<dyn BackendSession>, BackendError> {
        let mut history = Vec::new();
        if !config.instructions.trim().is_empty() {
            history.push(WireMessage::new("system", config.instructions.clone()));
        }

        Ok(Arc::new(OllamaSession {
            client: self.client.clone(),
            endpoint: self.config.endpoint.clone(),
            model: self.config.model.clone(),
            tools: config.tools.clone(),
            history: Mutex::new(history),
        }))
    }
}

/// One Ollama conversation. `/api/chat` is stateless, so the session
/// keeps the accumulated wire messages and replays them every turn.
struct OllamaSession {
    client: Client,
    endpoint: String,
    model: String,
    tools: ToolRegistry,
    history: Mutex<Vec<WireMessage>>,
}

impl OllamaSession {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let url = format!("{}/api/chat", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    BackendError::Connection(e.to_string())
                } else {
                    BackendError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Request(format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// What to do with a chat response at a given tool round.
#[derive(Debug, PartialEq, Eq)]
enum RoundOutcome {
    /// No tool calls pending, the content is the final answer.
    Complete,
    /// Tool calls pending and budget remains.
    ResolveTools,
    /// Tool calls pending but the round budget is spent.
    LimitExceeded,
}

fn round_outcome(has_tool_calls: bool, round: usize) -> RoundOutcome {
    if !has_tool_calls {
        RoundOutcome::Complete
    } else if round < MAX_TOOL_ROUNDS {
        RoundOutcome::ResolveTools
    } else {
        RoundOutcome::LimitExceeded
    }
}

#[async_trait]
impl BackendSession for OllamaSession {
    async fn respond(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<ResponseTurn, BackendError> {
        let mut messages = self.history.lock().unwrap_or_else(|p| p.into_inner()).clone();
        messages.push(WireMessage::new("user", prompt));

        let tools = wire_tools(&self.tools);
        let mut invocations = Vec::new();

        for round in 0..=MAX_TOOL_ROUNDS {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                stream: false,
                options: WireOptions::from(options),
                tools: tools.clone(),
            };

            let response = self.chat(&request).await?;

            match round_outcome(!response.message.tool_calls.is_empty(), round) {
                RoundOutcome::Complete => {
                    let text = response.message.content;
                    messages.push(WireMessage::new("assistant", text.clone()));
                    // Tool exchanges stay in the replayed history so later
                    // turns see what the model asked for and got back.
                    *self.history.lock().unwrap_or_else(|p| p.into_inner()) = messages;
                    return Ok(ResponseTurn {
                        text,
                        tool_invocations: invocations,
                    });
                }
                RoundOutcome::ResolveTools => {}
                RoundOutcome::LimitExceeded => {
                    warn!(
                        "model still requesting tools after {} rounds, giving up",
                        MAX_TOOL_ROUNDS
                    );
                    return Err(BackendError::Tool("tool round limit exceeded".to_string()));
                }
            }

            debug!(
                "model requested {} tool call(s) in round {}",
                response.message.tool_calls.len(),
                round
            );

            // Keep the assistant's partial turn, then resolve each call
            // through the registry and feed results back.
            messages.push(WireMessage::new("assistant", response.message.content));
            for wire_call in &response.message.tool_calls {
                let call = wire_call.to_tool_call();
                let output = self.tools.dispatch(&call).await.map_err(|e| {
                    warn!("tool '{}' failed: {}", call.tool_name, e);
                    BackendError::Tool(e.to_string())
                })?;
                invocations.push(ToolInvocation::new(call.tool_name.clone(), output.clone()));
                messages.push(WireMessage::new("tool", output));
            }
        }

        unreachable!("tool round loop always returns")
    }
}

/// Classify an `/api/tags` listing against the configured model.
///
/// The model missing from the listing means it has not been pulled yet,
/// which is the "installed but not ready" bucket.
fn classify_tags(tags: &TagsResponse, model: &str) -> ModelAvailability {
    let found = tags
        .models
        .iter()
        .any(|m| m.name == model || m.name.split(':').next() == Some(model));
    if found {
        ModelAvailability::Available
    } else {
        ModelAvailability::Unavailable(UnavailableReason::ModelNotReady)
    }
}

/// Convert registry definitions to Ollama's OpenAI-compatible tool list.
fn wire_tools(registry: &ToolRegistry) -> Vec<WireTool> {
    registry
        .definitions()
        .into_iter()
        .map(tool_to_schema)
        .collect()
}

fn tool_to_schema(definition: &ToolDefinition) -> WireTool {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in &definition.parameters {
        properties.insert(
            param.name.clone(),
            serde_json::json!({
                "type": param.param_type,
                "description": param.description,
            }),
        );
        if param.required {
            required.push(param.name.clone());
        }
    }

    WireTool {
        tool_type: "function".to_string(),
        function: WireToolFunction {
            name: definition.name.clone(),
            description: definition.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        },
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    options: WireOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl WireMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl From<&GenerationOptions> for WireOptions {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            temperature: options.temperature,
            num_predict: options.max_response_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireToolFunction,
}

#[derive(Debug, Clone, Serialize)]
struct WireToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: CalledFunction,
}

#[derive(Debug, Deserialize)]
struct CalledFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

impl WireToolCall {
    fn to_tool_call(&self) -> ToolCall {
        let mut call = ToolCall::new(&self.function.name);
        if let Some(object) = self.function.arguments.as_object() {
            for (key, value) in object {
                call = call.with_arg(key.clone(), value.clone());
            }
        }
        call
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}
