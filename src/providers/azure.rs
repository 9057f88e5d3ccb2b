use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

use super::openai::{send_chat_request, ChatCompletionRequest};
use super::{Provider, RequestOptions};

/// API version pinned for deployment chat completions
pub const AZURE_API_VERSION: &str = "2025-01-01-preview";

/// Client for OpenAI models deployed on an Azure resource
#[derive(Debug, Clone)]
pub struct AzureOpenAI {
    /// HTTP client for API requests
    client: Client,
}

impl AzureOpenAI {
    /// Create a new Azure OpenAI client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the deployment chat completions URL
    ///
    /// Users often paste a full deployment URL; anything from `/openai/`
    /// onwards is discarded so only the resource base is kept.
    pub fn deployment_url(endpoint: &str, deployment: &str) -> Result<Url, ProviderError> {
        let mut base = endpoint.trim().trim_end_matches('/');
        if let Some(index) = base.find("/openai/") {
            base = &base[..index];
        }

        let mut url = Url::parse(base).map_err(|e| {
            ProviderError::Configuration(format!("Invalid Azure endpoint '{}': {}", endpoint, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| ProviderError::Configuration(format!("Azure endpoint cannot be a base URL: {}", endpoint)))?
            .pop_if_empty()
            .extend(["openai", "deployments", deployment, "chat", "completions"]);
        url.query_pairs_mut().append_pair("api-version", AZURE_API_VERSION);

        Ok(url)
    }
}

#[async_trait]
impl Provider for AzureOpenAI {
    fn name(&self) -> &str {
        "Azure OpenAI"
    }

    async fn send(
        &self,
        prompt: &Prompt,
        config: &ProviderConfig,
        options: &RequestOptions,
    ) -> Result<String, ProviderError> {
        let endpoint = config.endpoint().ok_or_else(|| {
            ProviderError::Configuration("Azure OpenAI requires an endpoint".to_string())
        })?;
        let url = Self::deployment_url(endpoint, &config.model)?;

        let mut request = ChatCompletionRequest::from_prompt(&config.model, prompt);
        if options.json_mode {
            request = request.json_object();
        }

        let builder = self.client.post(url).bearer_auth(&config.api_key);
        send_chat_request(self.name(), builder, &request).await
    }
}
