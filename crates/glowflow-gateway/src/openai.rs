//! OpenAI-compatible chat completions gateway.

use async_trait::async_trait;
use glowflow_core::{ModelGateway, ModelRequest, ProviderError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::presets::PresetFile;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum GatewayConfigError {
    #[error("API key is missing; set GLOWFLOW_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
    #[error("unknown provider preset: {0}")]
    UnknownPreset(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection parameters for [`OpenAiGateway`].
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Short name used in logs (e.g. "openai").
    pub provider: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GatewaySettings {
    /// Settings for a known preset; `model` overrides the preset default.
    pub fn from_preset(preset: &PresetFile, api_key: String, model: Option<String>) -> Self {
        Self {
            provider: preset.provider.name.clone(),
            base_url: preset.api.base_url.clone(),
            api_key,
            model: model.unwrap_or_else(|| preset.api.default_model.clone()),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Long-lived, shareable client for an OpenAI-compatible endpoint.
///
/// Each [`invoke`](ModelGateway::invoke) makes exactly one HTTP request.
pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    provider: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGateway {
    /// Build the HTTP client once. Fails fast on a blank API key.
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayConfigError> {
        if settings.api_key.trim().is_empty() {
            return Err(GatewayConfigError::MissingApiKey);
        }

        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));

        tracing::info!(
            provider = %settings.provider,
            endpoint = %endpoint,
            model = %settings.model,
            "model gateway configured"
        );

        Ok(Self {
            client,
            endpoint,
            provider: settings.provider,
            api_key: settings.api_key,
            model: settings.model,
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn invoke(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let body = build_request_body(&self.model, self.temperature, &request);
        tracing::debug!(
            endpoint = %self.endpoint,
            with_image = request.image_data_uri.is_some(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError(format!("request to {} failed: {e}", self.provider)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError(format!("{} returned {status}: {text}", self.provider)));
        }

        let payload: Value = response.json().await.map_err(|e| {
            ProviderError(format!("{} response body is not JSON: {e}", self.provider))
        })?;

        extract_content(&payload)
    }
}

/// Chat completions body: system message, user message (text plus optional
/// image part), JSON-object response format.
pub fn build_request_body(model: &str, temperature: f32, request: &ModelRequest) -> Value {
    let user_content = match &request.image_data_uri {
        Some(uri) => json!([
            { "type": "text", "text": request.user },
            { "type": "image_url", "image_url": { "url": uri } },
        ]),
        None => json!(request.user),
    };

    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": user_content },
        ],
        "response_format": { "type": "json_object" },
        "max_tokens": request.max_tokens,
        "temperature": temperature,
    })
}

/// Pull `choices[0].message.content` out of a chat completions response.
pub fn extract_content(payload: &Value) -> Result<String, ProviderError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError("response has no choices[0].message.content".into()))
}
