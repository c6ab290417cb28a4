//! Boundary to the external vision/language model.

use async_trait::async_trait;
use thiserror::Error;

use crate::prompt::Prompt;

/// The external call failed (network, auth, quota, malformed request...).
///
/// Providers distinguish these cases; this crate does not, so they collapse
/// into one kind carrying the provider's message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provider error: {0}")]
pub struct ProviderError(pub String);

/// One outbound model call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system: String,
    pub user: String,
    /// `data:<mime>;base64,...` when the call carries an image.
    pub image_data_uri: Option<String>,
    pub max_tokens: u32,
}

impl ModelRequest {
    pub fn new(prompt: Prompt, max_tokens: u32) -> Self {
        Self {
            system: prompt.system,
            user: prompt.user,
            image_data_uri: None,
            max_tokens,
        }
    }

    pub fn with_image(mut self, data_uri: String) -> Self {
        self.image_data_uri = Some(data_uri);
        self
    }
}

/// An external model that turns a prompt (and optional image) into raw text.
///
/// Implementations make at most one attempt per call. Retries and timeouts
/// belong to the implementation or its caller, never to the normalizer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    async fn invoke(&self, request: ModelRequest) -> Result<String, ProviderError>;
}
