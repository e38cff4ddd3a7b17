use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model is not configured: {0}")]
    Config(String),

    #[error("model request failed: {0}")]
    Request(String),

    #[error("model returned an unusable response: {0}")]
    Response(String),
}

/// Sampling settings for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl DecodingParams {
    /// Question → SQL wants near-deterministic output.
    pub const SQL_GENERATION: Self = Self {
        temperature: 0.2,
        top_p: 0.95,
        max_tokens: 150,
    };

    /// Results → prose tolerates more sampling freedom.
    pub const NARRATION: Self = Self {
        temperature: 0.7,
        top_p: 0.95,
        max_tokens: 150,
    };
}

/// The text-generation capability behind the model fallback. Opaque to
/// the rest of the service: prompt and decoding parameters in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: DecodingParams) -> Result<String, LlmError>;
}

pub fn sql_generation_prompt(question: &str) -> String {
    format!(
        "You are an AI assistant that converts natural language questions into SQL queries.\n\
         \n\
         Database schema:\n\
         employees(id, name, department, salary, hire_date)\n\
         departments(id, name, manager)\n\
         \n\
         Convert the following question into a single SQL SELECT statement.\n\
         Question: {question}\n\
         \n\
         SQL Query:"
    )
}

pub fn narration_prompt(question: &str, results_json: &str) -> String {
    format!(
        "You are an AI assistant that converts SQL query results into natural language answers.\n\
         \n\
         User's Question: {question}\n\
         SQL Query Results: {results_json}\n\
         Provide a clear, concise natural language response:"
    )
}

/// Drop a leading/trailing markdown code fence from model output.
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```sql")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAiGenerator {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(config: &ModelConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Config("model.api_key is not set".to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, params: DecodingParams) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": params.temperature,
            "top_p": params.top_p,
            "max_tokens": params.max_tokens,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let truncated = error_text.get(..200).unwrap_or(error_text.as_str());
            return Err(LlmError::Request(format!("HTTP {status}: {truncated}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Response(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::Response("no message content in choices".to_string()))?;

        if content.trim().is_empty() {
            return Err(LlmError::Response("empty message content".to_string()));
        }

        Ok(content.to_string())
    }
}
