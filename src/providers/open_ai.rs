use crate::config::CompletionConfig;
use crate::error::{BoxError, RecommendError};
use crate::providers::{CompletionRequest, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Provider for any OpenAI-compatible chat-completions API (OpenAI, OpenRouter, ...)
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    referer: Option<String>,
    app_title: Option<String>,
}

impl OpenAIProvider {
    /// Create a new provider from configuration
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self, RecommendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(OpenAIProvider {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            referer: None,
            app_title: None,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<String, BoxError> {
        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key));

        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(&json!({
                "model": model,
                "messages": request.messages,
                "max_tokens": request.max_tokens,
                "temperature": request.temperature
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            return Err(message.into());
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);
        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or("Failed to extract content from response")?
            .to_string();

        Ok(content)
    }
}
