use async_trait::async_trait;
use log::error;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

use super::{join_url, snippet, Provider, RequestOptions};

/// Public OpenAI API base
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI client for the chat completions API
#[derive(Debug, Clone)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
}

/// Chat message in OpenAI format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Requested response format
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Chat completions request, shared by every OpenAI-compatible backend
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// The model (or deployment) to use
    pub model: String,

    /// The messages for the conversation
    pub messages: Vec<ChatMessage>,

    /// Structured output mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            response_format: None,
            temperature: None,
        }
    }

    /// Create a request carrying a prompt's system and user messages
    ///
    /// An empty system message is left out entirely.
    pub fn from_prompt(model: impl Into<String>, prompt: &Prompt) -> Self {
        let request = Self::new(model);
        let request = if prompt.system_message.is_empty() {
            request
        } else {
            request.add_message("system", &prompt.system_message)
        };
        request.add_message("user", &prompt.user_message)
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Request a JSON object response
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }
}

/// Error object embedded in an OpenAI-style envelope
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Error message
    #[serde(default)]
    pub message: Option<String>,
    /// Error code
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// Message inside a choice
#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    /// Role of the author
    #[serde(default)]
    pub role: Option<String>,
    /// Assistant text
    #[serde(default)]
    pub content: Option<String>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The message produced by the model
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

/// Chat completions response envelope
///
/// Every field is optional: backends return either choices or an error object.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices
    #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>,
    /// Error reported by the backend
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl ChatCompletionResponse {
    /// Text content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}

/// Extract the assistant text from an OpenAI-style envelope
///
/// The backend's own error message wins over the HTTP status when both are present.
pub fn extract_chat_content(
    backend: &str,
    status: StatusCode,
    body: &str,
) -> Result<String, ProviderError> {
    let envelope = match serde_json::from_str::<ChatCompletionResponse>(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(ProviderError::ParseError(format!(
                "{} returned a non-JSON body ({}): {}",
                backend,
                e,
                snippet(body)
            )));
        }
        Err(_) => return Err(ProviderError::from_status(status.as_u16(), snippet(body))),
    };

    if let Some(api_error) = &envelope.error {
        let message = api_error
            .message
            .clone()
            .unwrap_or_else(|| snippet(body));
        error!("{} API error ({}): {}", backend, status, message);
        return Err(ProviderError::from_status(status.as_u16(), message));
    }

    if !status.is_success() {
        error!("{} API error ({}): {}", backend, status, snippet(body));
        return Err(ProviderError::from_status(status.as_u16(), snippet(body)));
    }

    match envelope.first_content() {
        Some(content) => Ok(content.to_string()),
        None if envelope.choices.as_ref().is_none_or(|c| c.is_empty()) => Err(
            ProviderError::MissingContent(format!("missing choices array. Response: {}", snippet(body))),
        ),
        None => Err(ProviderError::MissingContent(format!(
            "empty response from {}: no message content",
            backend
        ))),
    }
}

/// Send a chat completions request and extract the assistant text
pub(crate) async fn send_chat_request(
    backend: &str,
    builder: RequestBuilder,
    request: &ChatCompletionRequest,
) -> Result<String, ProviderError> {
    let response = builder
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await
        .map_err(ProviderError::from_transport)?;

    let status = response.status();
    let body = response.text().await.map_err(ProviderError::from_transport)?;

    extract_chat_content(backend, status, &body)
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Chat completions URL for a configuration
    pub fn chat_url(config: &ProviderConfig) -> String {
        join_url(
            config.endpoint().unwrap_or(DEFAULT_OPENAI_ENDPOINT),
            "chat/completions",
        )
    }
}

#[async_trait]
impl Provider for OpenAI {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn send(
        &self,
        prompt: &Prompt,
        config: &ProviderConfig,
        options: &RequestOptions,
    ) -> Result<String, ProviderError> {
        // Reasoning models reject sampling overrides, so temperature is not forwarded
        let mut request = ChatCompletionRequest::from_prompt(&config.model, prompt);
        if options.json_mode {
            request = request.json_object();
        }

        let builder = self
            .client
            .post(Self::chat_url(config))
            .bearer_auth(&config.api_key);

        send_chat_request(self.name(), builder, &request).await
    }
}
