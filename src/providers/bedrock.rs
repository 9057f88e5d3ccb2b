use async_trait::async_trait;
use log::error;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

use super::{snippet, Provider, RequestOptions};

/// Client for the AWS Bedrock Converse API, authenticated with a Bedrock API key
#[derive(Debug, Clone)]
pub struct Bedrock {
    /// HTTP client for API requests
    client: Client,
}

/// Text content block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    /// Block text; non-text blocks (tool use, images) have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }
}

/// Conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,
    /// Content blocks of the message
    pub content: Vec<ContentBlock>,
}

/// Inference parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

/// Converse request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    /// The messages for the conversation
    pub messages: Vec<ConverseMessage>,
    /// System prompt blocks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<ContentBlock>,
    /// Generation parameters
    pub inference_config: InferenceConfig,
}

impl ConverseRequest {
    /// Build a single-turn request from a prompt
    pub fn from_prompt(prompt: &Prompt, options: &RequestOptions) -> Self {
        let system = if prompt.system_message.is_empty() {
            Vec::new()
        } else {
            vec![ContentBlock::text(&prompt.system_message)]
        };

        Self {
            messages: vec![ConverseMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::text(&prompt.user_message)],
            }],
            system,
            inference_config: InferenceConfig {
                temperature: options.temperature,
                max_tokens: options.max_tokens,
            },
        }
    }
}

/// Output wrapper
#[derive(Debug, Deserialize)]
pub struct ConverseOutput {
    /// Assistant message
    #[serde(default)]
    pub message: Option<ConverseMessage>,
}

/// Converse response envelope
///
/// Failures carry a top-level `message` instead of `output`.
#[derive(Debug, Deserialize)]
pub struct ConverseResponse {
    /// Model output
    #[serde(default)]
    pub output: Option<ConverseOutput>,
    /// Error message reported by the service
    #[serde(default)]
    pub message: Option<String>,
    /// Why generation stopped
    #[serde(default, rename = "stopReason")]
    pub stop_reason: Option<String>,
}

impl ConverseResponse {
    /// Concatenated text of the assistant message
    pub fn text(&self) -> Option<String> {
        let message = self.output.as_ref()?.message.as_ref()?;
        let text: String = message
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Extract the assistant text from a Converse envelope
pub fn extract_converse_content(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    let envelope = match serde_json::from_str::<ConverseResponse>(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(ProviderError::ParseError(format!(
                "Bedrock returned a non-JSON body ({}): {}",
                e,
                snippet(body)
            )));
        }
        Err(_) => return Err(ProviderError::from_status(status.as_u16(), snippet(body))),
    };

    if let Some(message) = &envelope.message {
        error!("Bedrock API error ({}): {}", status, message);
        return Err(ProviderError::from_status(status.as_u16(), message.clone()));
    }

    if !status.is_success() {
        error!("Bedrock API error ({}): {}", status, snippet(body));
        return Err(ProviderError::from_status(status.as_u16(), snippet(body)));
    }

    envelope.text().ok_or_else(|| {
        ProviderError::MissingContent(format!("no output message text. Response: {}", snippet(body)))
    })
}

impl Bedrock {
    /// Create a new Bedrock client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Converse URL for a configuration
    ///
    /// The runtime host derives from the region unless an endpoint override is set.
    pub fn converse_url(config: &ProviderConfig) -> Result<Url, ProviderError> {
        let base = match config.endpoint() {
            Some(endpoint) => endpoint.to_string(),
            None => {
                let region = config.region().ok_or_else(|| {
                    ProviderError::Configuration("Bedrock requires a region".to_string())
                })?;
                format!("https://bedrock-runtime.{}.amazonaws.com", region)
            }
        };

        let mut url = Url::parse(base.trim_end_matches('/')).map_err(|e| {
            ProviderError::Configuration(format!("Invalid Bedrock endpoint '{}': {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Configuration(format!("Bedrock endpoint cannot be a base URL: {}", base)))?
            .pop_if_empty()
            .extend(["model", config.model.as_str(), "converse"]);

        Ok(url)
    }
}

#[async_trait]
impl Provider for Bedrock {
    fn name(&self) -> &str {
        "AWS Bedrock"
    }

    async fn send(
        &self,
        prompt: &Prompt,
        config: &ProviderConfig,
        options: &RequestOptions,
    ) -> Result<String, ProviderError> {
        let url = Self::converse_url(config)?;
        let request = ConverseRequest::from_prompt(prompt, options);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .bearer_auth(&config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_transport)?;
        extract_converse_content(status, &body)
    }
}
