use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Local,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Local => "local",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "openai" => Some(LlmProvider::OpenAi),
            "local" => Some(LlmProvider::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
    model: String,
    config: ProviderConfig,
}

#[derive(Clone)]
enum ProviderConfig {
    OpenAi(OpenAiConfig),
    Local,
}

#[derive(Clone)]
struct OpenAiConfig {
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Result<Self> {
        let config = match provider {
            LlmProvider::OpenAi => ProviderConfig::OpenAi(OpenAiConfig {
                api_key: read_api_key("OPENAI_API_KEY")?,
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            }),
            LlmProvider::Local => ProviderConfig::Local,
        };
        Ok(Self {
            http: build_http_client()?,
            provider,
            model: model.into(),
            config,
        })
    }

    pub fn openai_with(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            provider: LlmProvider::OpenAi,
            model: model.into(),
            config: ProviderConfig::OpenAi(OpenAiConfig {
                api_key: api_key.into(),
                base_url: base_url.into(),
            }),
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, req: &LlmRequest) -> Result<LlmResponse> {
        match &self.config {
            ProviderConfig::OpenAi(cfg) => self.chat_openai(cfg, req).await,
            ProviderConfig::Local => Ok(self.chat_local(req)),
        }
    }

    async fn chat_openai(&self, cfg: &OpenAiConfig, req: &LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", cfg.base_url.trim_end_matches('/'));
        let mut messages = Vec::new();
        if let Some(system) = &req.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": req.user }));
        let mut payload = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": req.max_tokens,
        });
        if let Some(temperature) = req.temperature {
            payload["temperature"] = json!(temperature);
        }
        let response = self
            .http
            .post(&url)
            .bearer_auth(&cfg.api_key)
            .json(&payload)
            .send()
            .await
            .context("openai request failed")?;
        let value = decode_openai_body(response).await?;
        let content = extract_openai_text(&value)
            .ok_or_else(|| anyhow!("missing text in OpenAI response"))?;
        let usage: OpenAiUsage = value
            .get("usage")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default();
        Ok(LlmResponse {
            content: content.trim().to_string(),
            prompt_tokens: usage.prompt_tokens.unwrap_or(0),
            completion_tokens: usage.completion_tokens.unwrap_or(0),
        })
    }

    fn chat_local(&self, req: &LlmRequest) -> LlmResponse {
        LlmResponse {
            content: synthesize_local_response(req),
            prompt_tokens: 0,
            completion_tokens: 0,
        }
    }
}

pub fn build_http_client() -> Result<Client> {
    let secs = env::var("FAGSVAR_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    Client::builder()
        .timeout(Duration::from_secs(secs.max(1)))
        .build()
        .context("failed to build http client")
}

fn synthesize_local_response(req: &LlmRequest) -> String {
    let user = req.user.as_str();
    if user.starts_with("Rewrite the following answer") {
        if let Some(quoted) = extract_quoted(user) {
            return quoted;
        }
    }
    if user.contains("expert on plumbing") {
        return "Follow the applicable plumbing code and the manufacturer's installation instructions.".to_string();
    }
    summarize_text(user, 24)
}

fn extract_quoted(text: &str) -> Option<String> {
    let start = text.find('"')?;
    let end = text.rfind('"')?;
    if end > start {
        Some(text[start + 1..end].to_string())
    } else {
        None
    }
}

async fn decode_openai_body(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(anyhow!(format!(
            "openai returned error (status {}): {}",
            status, body
        )));
    }
    serde_json::from_str(&body).context("failed to decode openai response")
}

fn summarize_text(text: &str, max_words: usize) -> String {
    if max_words == 0 {
        return String::new();
    }
    let cleaned = text
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");
    cleaned
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<&str>>()
        .join(" ")
}

fn read_api_key(var: &str) -> Result<String> {
    let value = env::var(var).map_err(|_| anyhow!(format!("{var} is not set")))?;
    if var.contains("OPENAI") && !value.starts_with("sk-") {
        return Err(anyhow!(format!(
            "{} must start with 'sk-' (see https://platform.openai.com/)",
            var
        )));
    }
    Ok(value)
}

fn extract_openai_text(value: &Value) -> Option<String> {
    let choices = value.get("choices").and_then(|v| v.as_array())?;
    let choice = choices.first()?;
    if let Some(message) = choice.get("message") {
        if let Some(content) = message.get("content") {
            if let Some(text) = content.as_str() {
                return Some(text.to_string());
            }
            if let Some(parts) = content.as_array() {
                for part in parts {
                    if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                        return Some(text.to_string());
                    }
                }
            }
        }
    }
    choice.get("text").and_then(|t| t.as_str()).map(str::to_string)
}

#[derive(Default, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}
