pub mod error;

pub use error::{CohereError, CohereResult};

use async_trait::async_trait;
use forecast_core::{ForecastResult, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";

/// Configuration for the Cohere generate API
#[derive(Debug, Clone)]
pub struct CohereConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl CohereConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: None,
            max_tokens: 300,
            temperature: 0.75,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
}

#[derive(Clone)]
pub struct CohereClient {
    client: reqwest::Client,
    config: CohereConfig,
}

impl CohereClient {
    pub fn new(config: CohereConfig) -> CohereResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Generate completions for a prompt
    pub async fn request_generations(&self, prompt: &str) -> CohereResult<GenerateResponse> {
        let request = GenerateRequest {
            prompt,
            model: self.config.model.as_deref(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/generate", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(CohereError::Unauthorized(body));
            }
            return Err(CohereError::ServiceUnavailable(format!(
                "Status: {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Text of the first generation
    pub async fn complete(&self, prompt: &str) -> CohereResult<String> {
        let response = self.request_generations(prompt).await?;
        response
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or(CohereError::EmptyGeneration)
    }
}

#[async_trait]
impl TextGenerator for CohereClient {
    async fn generate(&self, prompt: &str) -> ForecastResult<String> {
        let text = self.complete(prompt).await?;
        tracing::debug!("Cohere completion: {}", text);
        Ok(text)
    }

    fn backend_name(&self) -> &'static str {
        "cohere"
    }
}
