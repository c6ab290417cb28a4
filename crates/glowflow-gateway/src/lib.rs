//! glowflow-gateway — External vision model access.
//!
//! Provides an OpenAI-compatible chat completions client implementing
//! [`glowflow_core::ModelGateway`], plus a compile-time provider presets
//! database.

pub mod openai;
pub mod presets;

pub use openai::{GatewayConfigError, GatewaySettings, OpenAiGateway};
pub use presets::{list_presets, lookup_preset, PresetFile};
