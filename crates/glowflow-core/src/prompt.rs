//! Outbound prompts for the vision model.

use crate::types::{BeautyProfile, Category, FaceShape, ProductShade, SkinTone, Undertone};

const ANALYSIS_SYSTEM: &str = "You are a beauty AI analyst. Output JSON only.";
const MATCH_SYSTEM: &str = "You are a colour match expert. Output JSON only.";

/// A system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn allowed<C: Category>() -> String {
    C::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
}

/// Prompt for classifying the face in an attached image.
pub fn build_analysis_prompt() -> Prompt {
    let user = format!(
        "You are a professional beauty consultant with expertise in skin analysis.\n\n\
         Carefully analyse the face in this image and return ONLY a JSON object \
         with these exact keys:\n\
         \x20 skin_tone        : one of [{skin}]\n\
         \x20 undertone        : one of [{under}]\n\
         \x20 face_shape       : one of [{shape}]\n\
         \x20 eye_color        : descriptive string (e.g. 'Dark Brown', 'Hazel')\n\
         \x20 confidence_score : integer 0-100 representing your confidence\n\
         \x20 summary          : one sentence describing the person's key features\n\n\
         Rules:\n\
         - Return ONLY valid JSON, no markdown, no explanation.\n\
         - Never set any field to null; always choose the closest match.\n\
         - confidence_score must reflect how clearly the features are visible.",
        skin = allowed::<SkinTone>(),
        under = allowed::<Undertone>(),
        shape = allowed::<FaceShape>(),
    );

    Prompt {
        system: ANALYSIS_SYSTEM.to_string(),
        user,
    }
}

/// Prompt for picking one product from `products` for `profile`.
///
/// The product list is embedded as JSON so the model selects from exactly
/// that set.
pub fn build_match_prompt(
    profile: &BeautyProfile,
    products: &[ProductShade],
) -> Result<Prompt, serde_json::Error> {
    let catalog = serde_json::to_string_pretty(products)?;

    let user = format!(
        "You are a Professional Color Theorist and Makeup Artist.\n\n\
         User Beauty Profile:\n\
         \x20 Skin Tone : {tone}\n\
         \x20 Undertone : {under}\n\
         \x20 Eye Color : {eyes}\n\n\
         Available Products (JSON array):\n\
         {catalog}\n\n\
         Task:\n\
         Select the SINGLE product from the list that best complements the \
         user's skin tone and undertone based on colour theory.\n\n\
         Return ONLY a JSON object with these exact keys:\n\
         \x20 best_match_id : the 'id' string of the chosen product\n\
         \x20 match_score   : integer 0-100 (100 = perfect match)\n\
         \x20 reasoning     : 1-2 sentences explaining the colour-theory rationale\n\n\
         Rules:\n\
         - Return ONLY valid JSON, no markdown, no extra text.\n\
         - best_match_id MUST be one of the ids in the product list.",
        tone = profile.skin_tone,
        under = profile.undertone,
        eyes = profile.eye_color,
    );

    Ok(Prompt {
        system: MATCH_SYSTEM.to_string(),
        user,
    })
}
