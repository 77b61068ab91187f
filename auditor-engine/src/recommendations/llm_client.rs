//! Chat-completions recommendation client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Requests are
//! rate limited per minute and bounded by total and connect timeouts.

use super::generator::{parse_generation_payload, GenerationError, RecommendationGenerator};
use async_trait::async_trait;
use auditor_common::config::{get_user_agent, resolve_ai_api_key, AiConfig, TomlConfig};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 5;

const SYSTEM_PROMPT: &str = "You are an experienced search and web quality consultant. \
You turn audit findings into concrete, prioritized actions. Respond with JSON only.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// AI collaborator backed by a chat-completions API
pub struct LlmRecommendationClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl LlmRecommendationClient {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, GenerationError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(get_user_agent())
            .build()?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            timeout,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            rate_limiter,
        })
    }

    /// Build from the TOML configuration, resolving the API key
    ///
    /// Returns `GenerationError::NotConfigured` when no key is available.
    pub fn from_config(config: &TomlConfig) -> Result<Self, GenerationError> {
        let api_key = resolve_ai_api_key(config).ok_or(GenerationError::NotConfigured)?;
        Self::new(&config.ai, api_key)
    }

    fn user_prompt(digest: &str) -> String {
        format!(
            "Audit findings by module:\n\n{digest}\n\n\
             Produce between 10 and 20 recommendations that address these findings. \
             Return a JSON object of the form {{\"recommendations\": [...]}} where each item has \
             exactly these fields:\n\
             - \"title\": short imperative action\n\
             - \"description\": what to do and why it matters\n\
             - \"category\": the module the action belongs to\n\
             - \"priority\": one of \"P1\", \"P2\", \"P3\"\n\
             - \"estimated_impact\": one of \"high\", \"medium\", \"low\"\n\
             - \"effort\": one of \"easy\", \"medium\", \"hard\"\n\
             - \"estimated_time\": rough time to implement, e.g. \"2 hours\""
        )
    }
}

#[async_trait]
impl RecommendationGenerator for LlmRecommendationClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, digest: &str) -> Result<Vec<Value>, GenerationError> {
        self.rate_limiter.until_ready().await;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_prompt(digest),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, digest_len = digest.len(), "Requesting recommendations");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    GenerationError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(format!("invalid completion body: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::Empty)?;

        let items = parse_generation_payload(&content)?;
        tracing::debug!(count = items.len(), "Received recommendation drafts");
        Ok(items)
    }
}
