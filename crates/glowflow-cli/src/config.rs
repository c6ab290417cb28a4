use glowflow_core::{ImagePolicy, MimeType};
use glowflow_gateway::{lookup_preset, GatewayConfigError, GatewaySettings};
use std::time::Duration;

const DEFAULT_PROVIDER: &str = "openai";
const DEFAULT_MAX_IMAGE_MB: usize = 5;
const DEFAULT_ALLOWED_TYPES: &str = "image/jpeg,image/png,image/webp";

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Provider preset name (default: openai).
    pub provider: String,
    /// Overrides the preset's base URL.
    pub base_url: Option<String>,
    /// May be empty here; the gateway rejects a blank key when it is built.
    pub api_key: String,
    /// Overrides the preset's default model.
    pub model: Option<String>,
    pub max_image_size_mb: usize,
    pub allowed_image_types: Vec<MimeType>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `GLOWFLOW_*` environment variables with defaults.
    ///
    /// `OPENAI_API_KEY` and `OPENAI_MODEL` are honoured when the `GLOWFLOW_`
    /// variants are unset.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let allowed = var("GLOWFLOW_ALLOWED_IMAGE_TYPES")
            .unwrap_or_else(|| DEFAULT_ALLOWED_TYPES.to_string());

        Self {
            provider: var("GLOWFLOW_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            base_url: var("GLOWFLOW_BASE_URL"),
            api_key: var("GLOWFLOW_API_KEY")
                .or_else(|| var("OPENAI_API_KEY"))
                .unwrap_or_default(),
            model: var("GLOWFLOW_MODEL").or_else(|| var("OPENAI_MODEL")),
            max_image_size_mb: parse_or(var("GLOWFLOW_MAX_IMAGE_SIZE_MB"), DEFAULT_MAX_IMAGE_MB),
            allowed_image_types: parse_mime_list(&allowed),
            temperature: parse_or(
                var("GLOWFLOW_TEMPERATURE"),
                glowflow_gateway::openai::DEFAULT_TEMPERATURE,
            ),
            request_timeout_secs: parse_or(
                var("GLOWFLOW_REQUEST_TIMEOUT_SECS"),
                glowflow_gateway::openai::DEFAULT_TIMEOUT_SECS,
            ),
        }
    }

    pub fn image_policy(&self) -> ImagePolicy {
        ImagePolicy::from_megabytes(self.max_image_size_mb, self.allowed_image_types.clone())
    }

    /// Resolve the provider preset and apply overrides.
    pub fn gateway_settings(&self) -> Result<GatewaySettings, GatewayConfigError> {
        let preset = lookup_preset(&self.provider)
            .ok_or_else(|| GatewayConfigError::UnknownPreset(self.provider.clone()))?;

        let mut settings =
            GatewaySettings::from_preset(preset, self.api_key.clone(), self.model.clone());
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        settings.temperature = self.temperature;
        settings.timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(settings)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parse a comma-separated MIME list. Unknown entries are skipped; an empty
/// result falls back to the default set.
fn parse_mime_list(list: &str) -> Vec<MimeType> {
    let mut types = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match MimeType::parse(entry) {
            Some(mime) if !types.contains(&mime) => types.push(mime),
            Some(_) => {}
            None => tracing::warn!(
                entry,
                "ignoring unsupported image type in GLOWFLOW_ALLOWED_IMAGE_TYPES"
            ),
        }
    }
    if types.is_empty() {
        return ImagePolicy::default().allowed;
    }
    types
}
