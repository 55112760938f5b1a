use serde::{Deserialize, Serialize};

/// Estimated skill level needed to create a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [&'static str; 3] = ["Beginner", "Intermediate", "Advanced"];
}

/// An AI-generated product idea. Matched by its (title, description) pair;
/// the service assigns no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdea {
    pub title: String,
    pub description: String,
    pub target_audience: String,
    pub price_range: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub format: String, // e.g. "GoodNotes PDF", "Editable Canva Link"
}

impl ProductIdea {
    pub fn matches(&self, title: &str, description: &str) -> bool {
        self.title == title && self.description == description
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchVolume {
    High,
    Medium,
    Rising,
}

impl SearchVolume {
    pub const ALL: [&'static str; 3] = ["High", "Medium", "Rising"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub trend_name: String,
    pub description: String,
    pub search_volume_level: SearchVolume,
    /// Citation links shared by every trend of the same batch (at most 3).
    #[serde(default)]
    pub grounding_urls: Vec<String>,
}

/// A product idea the user chose to keep. Persisted across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    #[serde(flatten)]
    pub idea: ProductIdea,
    pub id: String,
    pub created_at: i64, // Unix timestamp in ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Inline image returned by the mockup generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupImage {
    pub mime_type: String,
    /// Base64-encoded bitmap.
    pub data: String,
}

impl MockupImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.decode(&self.data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppView {
    #[default]
    Ideator,
    Trends,
    Visualizer,
    Saved,
}
