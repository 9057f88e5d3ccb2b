use async_trait::async_trait;
use log::error;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

use super::{join_url, snippet, Provider, RequestOptions};

/// Public Anthropic API base
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";

/// Anthropic client for interacting with Anthropic API
#[derive(Debug, Clone)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,
}

/// Error details in an Anthropic error envelope
#[derive(Debug, Deserialize)]
pub struct AnthropicErrorBody {
    /// Error category
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Error message
    #[serde(default)]
    pub message: String,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    #[serde(default)]
    pub content: Vec<AnthropicContent>,
    /// Error reported instead of content
    #[serde(default)]
    pub error: Option<AnthropicErrorBody>,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Messages URL for a configuration
    pub fn messages_url(config: &ProviderConfig) -> String {
        join_url(
            config.endpoint().unwrap_or(DEFAULT_ANTHROPIC_ENDPOINT),
            "v1/messages",
        )
    }

    /// Extract text from Anthropic response
    pub fn extract_text(response: &AnthropicResponse) -> String {
        response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect()
    }

    /// Extract the assistant text from a raw Messages response
    pub fn extract_content(status: StatusCode, body: &str) -> Result<String, ProviderError> {
        let envelope = match serde_json::from_str::<AnthropicResponse>(body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ProviderError::ParseError(format!(
                    "Anthropic returned a non-JSON body ({}): {}",
                    e,
                    snippet(body)
                )));
            }
            Err(_) => return Err(ProviderError::from_status(status.as_u16(), snippet(body))),
        };

        if let Some(api_error) = &envelope.error {
            error!("Anthropic API error ({}): {} {}", status, api_error.error_type, api_error.message);
            return Err(ProviderError::from_status(status.as_u16(), api_error.message.clone()));
        }

        if !status.is_success() {
            error!("Anthropic API error ({}): {}", status, snippet(body));
            return Err(ProviderError::from_status(status.as_u16(), snippet(body)));
        }

        let text = Self::extract_text(&envelope);
        if text.trim().is_empty() {
            return Err(ProviderError::MissingContent(format!(
                "no text content. Response: {}",
                snippet(body)
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn send(
        &self,
        prompt: &Prompt,
        config: &ProviderConfig,
        options: &RequestOptions,
    ) -> Result<String, ProviderError> {
        let mut request = AnthropicRequest::new(&config.model, options.max_tokens)
            .add_message("user", &prompt.user_message);
        if !prompt.system_message.is_empty() {
            request = request.system(&prompt.system_message);
        }
        if let Some(temperature) = options.temperature {
            request = request.temperature(temperature);
        }

        let response = self
            .client
            .post(Self::messages_url(config))
            .header("Content-Type", "application/json")
            .header("x-api-key", &config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_transport)?;
        Self::extract_content(status, &body)
    }
}
