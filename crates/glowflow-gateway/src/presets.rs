//! Provider presets database.
//!
//! Maps a provider name to the endpoint and default model of an
//! OpenAI-compatible chat completions API. Preset files are embedded at
//! compile time from `contrib/providers/*.toml`.

use serde::Deserialize;
use std::sync::OnceLock;

const PRESET_OPENAI: &str = include_str!("../../../contrib/providers/openai.toml");
const PRESET_OPENROUTER: &str = include_str!("../../../contrib/providers/openrouter.toml");

static PRESET_DB: OnceLock<Vec<PresetFile>> = OnceLock::new();

/// Top-level preset file structure (one per `contrib/providers/*.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct PresetFile {
    pub provider: ProviderInfo,
    pub api: ApiInfo,
}

/// Identification fields from the `[provider]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub display_name: String,
}

/// Endpoint parameters from the `[api]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub default_model: String,
}

fn preset_db() -> &'static Vec<PresetFile> {
    PRESET_DB.get_or_init(|| {
        let mut db = Vec::new();
        for src in [PRESET_OPENAI, PRESET_OPENROUTER] {
            match toml::from_str::<PresetFile>(src) {
                Ok(p) => db.push(p),
                Err(e) => tracing::error!(error = %e, "bad provider preset TOML"),
            }
        }
        db
    })
}

/// Look up a preset by provider name (case-insensitive).
pub fn lookup_preset(name: &str) -> Option<&'static PresetFile> {
    let name = name.trim();
    preset_db()
        .iter()
        .find(|p| p.provider.name.eq_ignore_ascii_case(name))
}

/// List all known presets.
pub fn list_presets() -> &'static [PresetFile] {
    preset_db()
}
