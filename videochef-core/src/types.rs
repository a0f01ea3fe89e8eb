use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verified copy of the source video, stored by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    pub file_uri: String,
    pub mime_type: String,
}

/// One timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Persisted caption for a recipe's video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCaption {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub lang_code: String,
    pub segments: Vec<CaptionSegment>,
}

impl RecipeCaption {
    /// Caption text joined into one block, in segment order.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            unit: Some(unit.into()),
        }
    }
}

/// Everything the detail extractor pulls out of a video in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<String>,
    pub servings: u32,
    /// Minutes.
    pub cook_time: u32,
    /// Title suggested by the extractor, if it produced one.
    #[serde(default)]
    pub title: Option<String>,
}

impl RecipeDetail {
    /// The extractor's title, or `fallback` when it is missing or blank.
    pub fn title_or(&self, fallback: Option<&str>) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or(fallback.map(str::trim))
            .unwrap_or_default()
            .to_string()
    }
}

/// One cooking step, in video order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub step_order: u32,
    pub subtitle: String,
    pub details: Vec<String>,
    /// Offset into the video, in seconds.
    pub start: f64,
}
