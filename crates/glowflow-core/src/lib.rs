//! glowflow-core — Face analysis and shade matching around an external vision model.
//!
//! Validates uploads, builds prompts, and turns the model's semi-structured
//! JSON into typed records with deterministic fallbacks. The model itself sits
//! behind the [`ModelGateway`] trait.

pub mod advisor;
pub mod gateway;
pub mod image;
pub mod normalize;
pub mod prompt;
pub mod types;

pub use advisor::{Advisor, AdvisorError};
pub use gateway::{ModelGateway, ModelRequest, ProviderError};
pub use image::{ImageError, ImagePolicy, MimeType};
pub use normalize::{normalize_analysis, normalize_match, InvalidResponse};
pub use types::{
    BeautyProfile, Category, FaceShape, HexColor, MatchResult, ProductShade, SkinTone, Undertone,
};
