use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A closed set of labels the external model is asked to choose from.
///
/// Model output is untrusted, so lookups never fail: [`resolve`](Self::resolve)
/// maps any string onto a member, substituting the documented default.
pub trait Category: Copy + Default + Sized + 'static {
    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// Canonical title-case label (e.g. "Medium").
    fn as_str(self) -> &'static str;

    /// Case-insensitive, whitespace-tolerant lookup.
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }

    /// Like [`parse`](Self::parse), falling back to `Self::default()`.
    fn resolve(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinTone {
    Fair,
    Light,
    #[default]
    Medium,
    Tan,
    Deep,
}

impl Category for SkinTone {
    const ALL: &'static [Self] = &[Self::Fair, Self::Light, Self::Medium, Self::Tan, Self::Deep];

    fn as_str(self) -> &'static str {
        match self {
            Self::Fair => "Fair",
            Self::Light => "Light",
            Self::Medium => "Medium",
            Self::Tan => "Tan",
            Self::Deep => "Deep",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Undertone {
    Cool,
    #[default]
    Neutral,
    Warm,
}

impl Category for Undertone {
    const ALL: &'static [Self] = &[Self::Cool, Self::Neutral, Self::Warm];

    fn as_str(self) -> &'static str {
        match self {
            Self::Cool => "Cool",
            Self::Neutral => "Neutral",
            Self::Warm => "Warm",
        }
    }
}

/// Face shape classification.
///
/// Declaration order doubles as the priority order when a shape has to be
/// inferred from free-text summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceShape {
    #[default]
    Oval,
    Round,
    Square,
    Heart,
    Diamond,
    Oblong,
}

impl Category for FaceShape {
    const ALL: &'static [Self] = &[
        Self::Oval,
        Self::Round,
        Self::Square,
        Self::Heart,
        Self::Diamond,
        Self::Oblong,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Oval => "Oval",
            Self::Round => "Round",
            Self::Square => "Square",
            Self::Heart => "Heart",
            Self::Diamond => "Diamond",
            Self::Oblong => "Oblong",
        }
    }
}

impl fmt::Display for SkinTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const UNKNOWN_EYE_COLOR: &str = "Unknown";

/// Normalized result of a face analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeautyProfile {
    pub skin_tone: SkinTone,
    pub undertone: Undertone,
    pub face_shape: FaceShape,
    pub eye_color: String,
    /// Model-reported confidence, clamped to [0, 100]. Zero means "do not trust".
    pub confidence_score: u8,
    pub summary: String,
}

impl BeautyProfile {
    /// The record handed back when analysis could not produce anything usable.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            skin_tone: SkinTone::default(),
            undertone: Undertone::default(),
            face_shape: FaceShape::default(),
            eye_color: UNKNOWN_EYE_COLOR.to_string(),
            confidence_score: 0,
            summary: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid hex colour code (e.g. #FFDAB9)")]
pub struct InvalidHexColor(pub String);

/// `#RGB` or `#RRGGBB`, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(value: &str) -> Result<Self, InvalidHexColor> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| InvalidHexColor(trimmed.to_string()))?;
        let valid_len = matches!(digits.len(), 3 | 6);
        if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidHexColor(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = InvalidHexColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A caller-supplied candidate for shade matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductShade {
    pub id: String,
    pub name: String,
    pub hex_code: HexColor,
    pub category: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Outcome of matching a profile against a product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Always one of the supplied product ids.
    pub best_match_id: String,
    pub match_score: u8,
    pub reasoning: String,
    pub matched_product: Option<ProductShade>,
}
