/// Perplexity chat-completions client for AI title insights
///
/// Optional: without an API key every call reports
/// [`InsightOutcome::NotConfigured`] instead of failing.
use crate::{
    error::{AppError, AppResult},
    services::providers::http,
};
use reqwest::{header::ACCEPT, Client as HttpClient, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

const PROVIDER: &str = "perplexity";
const SYSTEM_PROMPT: &str = "You are a friendly movie expert.";
const TEMPERATURE: f64 = 0.5;
const MAX_TOKENS: u32 = 512;

pub const NOT_CONFIGURED_MESSAGE: &str =
    "AI insights are not configured. Set PERPLEXITY_API_KEY to enable them.";

/// Result of an insight request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum InsightOutcome {
    Generated(String),
    NotConfigured(String),
}

impl InsightOutcome {
    pub fn not_configured() -> Self {
        InsightOutcome::NotConfigured(NOT_CONFIGURED_MESSAGE.to_string())
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, InsightOutcome::Generated(_))
    }

    pub fn text(&self) -> &str {
        match self {
            InsightOutcome::Generated(text) | InsightOutcome::NotConfigured(text) => text,
        }
    }
}

#[derive(Clone)]
pub struct PerplexityClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl PerplexityClient {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Short summary, trivia and recommendations for a title
    pub async fn insights(&self, title: &str, plot: &str) -> AppResult<InsightOutcome> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(InsightOutcome::not_configured());
        };

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(title, plot)},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "stream": false,
        });

        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message = http::json_error_message(&body, "/error/message")
                .unwrap_or_else(|| "Perplexity API error".to_string());
            tracing::warn!(status = status.as_u16(), message = %message, provider = PROVIDER, "Insight request failed");
            return Err(AppError::upstream(PROVIDER, status.as_u16(), message));
        }

        let data: Value = http::decode_json(response, PROVIDER).await?;
        let text = completion_text(&data)
            .ok_or_else(|| AppError::malformed(PROVIDER, "Unexpected API response"))?;

        tracing::info!(title = %title, chars = text.len(), provider = PROVIDER, "Insights generated");

        Ok(InsightOutcome::Generated(text))
    }
}

fn build_prompt(title: &str, plot: &str) -> String {
    format!(
        "Give a short, fun summary, some trivia, and 3 similar movie recommendations \
         for '{}'. Do not use markdown formatting. Here is the plot:\n\n{}\n\n\
         Format your answer as:\n- Short summary\n- Trivia bullets\n- Recommended movies",
        title, plot
    )
}

/// `choices[0].message.content` of a chat completion
fn completion_text(data: &Value) -> Option<String> {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}
