//! Model response normalization.
//!
//! Model output is untrusted, semi-structured JSON. Analysis normalization is
//! total: every input maps to a fully valid [`BeautyProfile`]. Match
//! normalization repairs what it can and only errors when the text is not
//! structured data at all, or when there is no product to fall back to.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{
    BeautyProfile, Category, FaceShape, MatchResult, ProductShade, SkinTone, Undertone,
    UNKNOWN_EYE_COLOR,
};

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid model response: {0}")]
pub struct InvalidResponse(pub String);

/// Normalize raw face-analysis output. Never fails.
pub fn normalize_analysis(raw: &str) -> BeautyProfile {
    match parse_object(raw) {
        Ok(map) => profile_from_map(&map),
        Err(reason) => {
            tracing::warn!(
                error = %reason,
                "analysis response unparseable; using fallback profile"
            );
            BeautyProfile::fallback(format!("Analysis error: {reason}"))
        }
    }
}

impl BeautyProfile {
    /// Build a profile from already-parsed JSON, repairing invalid fields.
    ///
    /// Returns `None` when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(profile_from_map)
    }
}

/// Normalize raw shade-matching output against the products that were offered.
///
/// An unknown or missing `best_match_id` is replaced by the first product's id.
pub fn normalize_match(
    raw: &str,
    products: &[ProductShade],
) -> Result<MatchResult, InvalidResponse> {
    let map = parse_object(raw).map_err(InvalidResponse)?;

    let requested = text(&map, "best_match_id");
    let matched = match requested.and_then(|id| products.iter().find(|p| p.id == id)) {
        Some(product) => product,
        None => {
            let first = products
                .first()
                .ok_or_else(|| InvalidResponse("no products to fall back to".into()))?;
            tracing::warn!(
                requested = ?map.get("best_match_id"),
                fallback = %first.id,
                "model returned unknown product id; defaulting to first product"
            );
            first
        }
    };

    Ok(MatchResult {
        best_match_id: matched.id.clone(),
        match_score: clamp_score(map.get("match_score")),
        reasoning: text(&map, "reasoning").unwrap_or_default().to_string(),
        matched_product: Some(matched.clone()),
    })
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn profile_from_map(map: &Map<String, Value>) -> BeautyProfile {
    let summary = text(map, "summary").unwrap_or_default();

    let eye_color = match text(map, "eye_color").map(str::trim) {
        Some(eyes) if !eyes.is_empty() => eyes.to_string(),
        _ => UNKNOWN_EYE_COLOR.to_string(),
    };

    BeautyProfile {
        skin_tone: text(map, "skin_tone").map(SkinTone::resolve).unwrap_or_default(),
        undertone: text(map, "undertone").map(Undertone::resolve).unwrap_or_default(),
        face_shape: resolve_face_shape(text(map, "face_shape"), summary),
        eye_color,
        confidence_score: clamp_score(map.get("confidence_score")),
        summary: summary.to_string(),
    }
}

/// Use the reported shape if valid, otherwise the first shape named in the
/// summary (in [`FaceShape::ALL`] order), otherwise the default.
fn resolve_face_shape(field: Option<&str>, summary: &str) -> FaceShape {
    if let Some(shape) = field.and_then(FaceShape::parse) {
        return shape;
    }

    let summary = summary.to_lowercase();
    FaceShape::ALL
        .iter()
        .copied()
        .find(|shape| summary.contains(&shape.as_str().to_lowercase()))
        .unwrap_or_default()
}

/// Numbers and numeric strings clamp to [0, 100], truncating fractions.
/// Anything else scores 0.
fn clamp_score(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => n.trunc().clamp(SCORE_MIN, SCORE_MAX) as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HexColor;
    use serde_json::json;

    fn product(id: &str) -> ProductShade {
        ProductShade {
            id: id.into(),
            name: format!("Shade {id}"),
            hex_code: HexColor::parse("#FDA").unwrap(),
            category: "Blush".into(),
            price: None,
            description: None,
        }
    }

    fn assert_fallback(p: &BeautyProfile) {
        assert_eq!(p.skin_tone, SkinTone::Medium);
        assert_eq!(p.undertone, Undertone::Neutral);
        assert_eq!(p.face_shape, FaceShape::Oval);
        assert_eq!(p.eye_color, "Unknown");
        assert_eq!(p.confidence_score, 0);
    }

    #[test]
    fn test_analysis_not_json_falls_back() {
        let p = normalize_analysis("not json");
        assert_fallback(&p);
        assert!(p.summary.starts_with("Analysis error:"));
    }

    #[test]
    fn test_analysis_total_on_garbage() {
        for raw in ["", "   ", "[]", "42", "\"text\"", "null", "{", "{\"skin_tone\": }"] {
            let p = normalize_analysis(raw);
            assert_fallback(&p);
        }
    }

    #[test]
    fn test_analysis_valid_response() {
        let raw = json!({
            "skin_tone": "tan",
            "undertone": "Warm",
            "face_shape": " HEART ",
            "eye_color": "Dark Brown",
            "confidence_score": 87,
            "summary": "Tan skin with warm undertones.",
            "extra": "ignored",
        })
        .to_string();

        let p = normalize_analysis(&raw);
        assert_eq!(p.skin_tone, SkinTone::Tan);
        assert_eq!(p.undertone, Undertone::Warm);
        assert_eq!(p.face_shape, FaceShape::Heart);
        assert_eq!(p.eye_color, "Dark Brown");
        assert_eq!(p.confidence_score, 87);
        assert_eq!(p.summary, "Tan skin with warm undertones.");
    }

    #[test]
    fn test_analysis_missing_fields_default() {
        let p = normalize_analysis("{}");
        assert_fallback(&p);
        assert_eq!(p.summary, "");
    }

    #[test]
    fn test_face_shape_inferred_from_summary() {
        let raw = json!({ "summary": "Her round face and warm tone..." }).to_string();
        assert_eq!(normalize_analysis(&raw).face_shape, FaceShape::Round);
    }

    #[test]
    fn test_face_shape_summary_priority_order() {
        let raw = json!({
            "face_shape": "triangular",
            "summary": "A diamond-like jaw on an otherwise oval face",
        })
        .to_string();
        assert_eq!(normalize_analysis(&raw).face_shape, FaceShape::Oval);

        let raw = json!({ "summary": "Strong SQUARE jaw, heart-shaped lips" }).to_string();
        assert_eq!(normalize_analysis(&raw).face_shape, FaceShape::Square);
    }

    #[test]
    fn test_face_shape_valid_field_wins_over_summary() {
        let raw = json!({ "face_shape": "Oblong", "summary": "round cheeks" }).to_string();
        assert_eq!(normalize_analysis(&raw).face_shape, FaceShape::Oblong);
    }

    #[test]
    fn test_tone_fields_do_not_scan_summary() {
        let raw = json!({
            "skin_tone": "olive",
            "undertone": null,
            "summary": "Deep skin with cool undertones",
        })
        .to_string();
        let p = normalize_analysis(&raw);
        assert_eq!(p.skin_tone, SkinTone::Medium);
        assert_eq!(p.undertone, Undertone::Neutral);
    }

    #[test]
    fn test_score_boundaries() {
        let cases = [
            (json!(-5), 0u8),
            (json!(0), 0),
            (json!(100), 100),
            (json!(150), 100),
            (json!("high"), 0),
            (json!(null), 0),
            (json!(true), 0),
            (json!(72.9), 72),
            (json!("64"), 64),
        ];
        for (input, expected) in cases {
            let raw = json!({ "confidence_score": input.clone() }).to_string();
            assert_eq!(normalize_analysis(&raw).confidence_score, expected, "confidence {input}");

            let raw = json!({ "best_match_id": "p1", "match_score": input.clone() }).to_string();
            let m = normalize_match(&raw, &[product("p1")]).unwrap();
            assert_eq!(m.match_score, expected, "match {input}");
        }
    }

    #[test]
    fn test_eye_color_blank_or_non_string_is_unknown() {
        for eyes in [json!(""), json!("   "), json!(3), json!(null)] {
            let raw = json!({ "eye_color": eyes }).to_string();
            assert_eq!(normalize_analysis(&raw).eye_color, "Unknown");
        }
    }

    #[test]
    fn test_analysis_idempotent() {
        let raw = json!({
            "skin_tone": "LIGHT",
            "undertone": "cool",
            "face_shape": "???",
            "eye_color": " Hazel ",
            "confidence_score": 250,
            "summary": "A heart shaped face.",
        })
        .to_string();

        let once = normalize_analysis(&raw);
        let twice = normalize_analysis(&serde_json::to_string(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(once.face_shape, FaceShape::Heart);

        let fallback = normalize_analysis("garbage");
        let again = normalize_analysis(&serde_json::to_string(&fallback).unwrap());
        assert_eq!(fallback, again);
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(BeautyProfile::from_value(&json!([1, 2])).is_none());
        let p = BeautyProfile::from_value(&json!({ "skin_tone": "Deep" })).unwrap();
        assert_eq!(p.skin_tone, SkinTone::Deep);
    }

    #[test]
    fn test_match_valid_id() {
        let products = [product("p1"), product("p2")];
        let raw = json!({ "best_match_id": "p2", "match_score": 91, "reasoning": "Warm peach." })
            .to_string();
        let m = normalize_match(&raw, &products).unwrap();
        assert_eq!(m.best_match_id, "p2");
        assert_eq!(m.match_score, 91);
        assert_eq!(m.reasoning, "Warm peach.");
        assert_eq!(m.matched_product, Some(products[1].clone()));
    }

    #[test]
    fn test_match_unknown_id_uses_first_product() {
        let products = [product("p1"), product("p2")];
        let raw = json!({ "best_match_id": "p9", "match_score": 80 }).to_string();
        let m = normalize_match(&raw, &products).unwrap();
        assert_eq!(m.best_match_id, "p1");
        assert_eq!(m.matched_product, Some(products[0].clone()));
        assert_eq!(m.reasoning, "");
    }

    #[test]
    fn test_match_non_string_or_missing_id_uses_first_product() {
        let products = [product("1"), product("2")];
        for raw in [json!({ "best_match_id": 2 }), json!({})] {
            let m = normalize_match(&raw.to_string(), &products).unwrap();
            assert_eq!(m.best_match_id, "1");
        }
    }

    #[test]
    fn test_match_unparseable_is_error() {
        let err = normalize_match("not json", &[product("p1")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid model response"));
        assert!(normalize_match("[\"p1\"]", &[product("p1")]).is_err());
    }

    #[test]
    fn test_match_empty_products_is_error() {
        let raw = json!({ "best_match_id": "p1" }).to_string();
        assert!(normalize_match(&raw, &[]).is_err());
    }
}
