use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::gateway::{ModelGateway, ModelRequest, ProviderError};
use crate::image::{self, ImageError, ImagePolicy};
use crate::normalize::{self, InvalidResponse};
use crate::prompt;
use crate::types::{BeautyProfile, MatchResult, ProductShade};

const ANALYSIS_MAX_TOKENS: u32 = 400;
const MATCH_MAX_TOKENS: u32 = 300;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    InvalidResponse(#[from] InvalidResponse),
    #[error("at least one product must be supplied")]
    EmptyProductList,
    #[error("product id '{0}' appears more than once")]
    DuplicateProductId(String),
    #[error("failed to serialize products: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Clone-safe entry point for analysis and shade matching.
///
/// Holds the long-lived gateway handle and the upload policy. Carries no
/// per-call state, so clones can be used concurrently.
#[derive(Clone)]
pub struct Advisor {
    gateway: Arc<dyn ModelGateway>,
    policy: ImagePolicy,
}

impl Advisor {
    pub fn new(gateway: Arc<dyn ModelGateway>, policy: ImagePolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &ImagePolicy {
        &self.policy
    }

    /// Classify the face in `image_bytes`.
    ///
    /// Only upload validation errors are returned; they are raised before the
    /// gateway is contacted. Provider failures and unusable responses degrade
    /// to [`BeautyProfile::fallback`] with a confidence of zero.
    pub async fn analyze_image(&self, image_bytes: &[u8]) -> Result<BeautyProfile, AdvisorError> {
        let mime = self.policy.validate(image_bytes)?;
        tracing::debug!(bytes = image_bytes.len(), %mime, "analyze: image accepted");

        let request = ModelRequest::new(prompt::build_analysis_prompt(), ANALYSIS_MAX_TOKENS)
            .with_image(image::to_data_uri(image_bytes, mime));

        let raw = match self.gateway.invoke(request).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(
                    provider = self.gateway.name(),
                    error = %err,
                    "analyze: gateway call failed"
                );
                return Ok(BeautyProfile::fallback(format!("Analysis error: {err}")));
            }
        };

        let profile = normalize::normalize_analysis(&raw);
        tracing::info!(
            tone = %profile.skin_tone,
            undertone = %profile.undertone,
            face_shape = %profile.face_shape,
            confidence = profile.confidence_score,
            "face analysis complete"
        );
        Ok(profile)
    }

    /// Pick the product from `products` that best suits `profile`.
    ///
    /// Unlike analysis, provider failures and unparseable responses are
    /// returned as errors rather than replaced by a made-up recommendation.
    pub async fn match_shade(
        &self,
        profile: &BeautyProfile,
        products: &[ProductShade],
    ) -> Result<MatchResult, AdvisorError> {
        check_products(products)?;

        let prompt = prompt::build_match_prompt(profile, products)?;
        let request = ModelRequest::new(prompt, MATCH_MAX_TOKENS);
        tracing::debug!(products = products.len(), "match: requesting recommendation");

        let raw = self.gateway.invoke(request).await.map_err(|err| {
            tracing::error!(
                provider = self.gateway.name(),
                error = %err,
                "match: gateway call failed"
            );
            err
        })?;

        let result = normalize::normalize_match(&raw, products).map_err(|err| {
            tracing::error!(error = %err, "match: response rejected");
            err
        })?;

        tracing::info!(
            id = %result.best_match_id,
            score = result.match_score,
            "shade recommendation complete"
        );
        Ok(result)
    }
}

fn check_products(products: &[ProductShade]) -> Result<(), AdvisorError> {
    if products.is_empty() {
        return Err(AdvisorError::EmptyProductList);
    }
    let mut seen = HashSet::with_capacity(products.len());
    for p in products {
        if !seen.insert(p.id.as_str()) {
            return Err(AdvisorError::DuplicateProductId(p.id.clone()));
        }
    }
    Ok(())
}
