use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{AppConfig, ConfigError};
use crate::prompts;
use crate::types::{MockupImage, ProductIdea, TrendResult};

/// Most grounding sources attached to a trend batch.
pub const MAX_GROUNDING_URLS: usize = 3;

const FALLBACK_MIME_TYPE: &str = "image/png";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("no image data returned from API")]
    NoImage,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The generative-AI service the assistant delegates to.
/// One request per call: no retry, no timeout, no deduplication.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Brainstorm product ideas for a niche.
    async fn generate_ideas(&self, niche: &str) -> Result<Vec<ProductIdea>, GatewayError>;

    /// Look up current trends for a category, with web-search citations.
    async fn find_trends(&self, category: &str) -> Result<Vec<TrendResult>, GatewayError>;

    /// Render a listing mockup for a product description.
    async fn generate_mockup(&self, description: &str) -> Result<MockupImage, GatewayError>;
}

/// Gemini `generateContent` REST client.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    text_model: String,
    image_model: String,
}

impl GeminiGateway {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let api_key = config.require_api_key()?.to_string();
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    async fn generate_content(&self, model: &str, body: &Value) -> Result<GenerateContentResponse, GatewayError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, model);
        tracing::debug!(%model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Shape(format!("invalid response envelope: {e}")))?;
        if let Some(error) = &envelope.error {
            return Err(GatewayError::Status {
                status: error.code.unwrap_or(status.as_u16()),
                body: error.message.clone().unwrap_or_default(),
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn generate_ideas(&self, niche: &str) -> Result<Vec<ProductIdea>, GatewayError> {
        let body = structured_request(
            &prompts::idea_prompt(niche),
            prompts::ideas_schema(),
            Some(prompts::SYSTEM_INSTRUCTION),
            false,
        );
        let envelope = self.generate_content(&self.text_model, &body).await?;
        decode_ideas(&envelope)
    }

    async fn find_trends(&self, category: &str) -> Result<Vec<TrendResult>, GatewayError> {
        let body = structured_request(&prompts::trend_prompt(category), prompts::trends_schema(), None, true);
        let envelope = self.generate_content(&self.text_model, &body).await?;
        decode_trends(&envelope)
    }

    async fn generate_mockup(&self, description: &str) -> Result<MockupImage, GatewayError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompts::mockup_prompt(description) }] }],
        });
        let envelope = self.generate_content(&self.image_model, &body).await?;
        decode_mockup(&envelope)
    }
}

/// Request body asking for JSON output constrained by `schema`.
pub fn structured_request(prompt: &str, schema: Value, system: Option<&str>, search: bool) -> Value {
    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        },
    });
    if let Some(system) = system {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    if search {
        body["tools"] = json!([{ "googleSearch": {} }]);
    }
    body
}

// ─── Response envelope ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    message: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated non-thought text of the first candidate; None when empty.
    fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Web citations of the first candidate, deduplicated in first-seen order.
    fn grounding_urls(&self) -> Vec<String> {
        let chunks = self
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.as_slice())
            .unwrap_or_default();

        let mut urls: Vec<String> = Vec::new();
        for uri in chunks
            .iter()
            .filter_map(|c| c.web.as_ref())
            .filter_map(|w| w.uri.as_deref())
            .filter(|u| !u.is_empty())
        {
            if !urls.iter().any(|seen| seen == uri) {
                urls.push(uri.to_string());
            }
        }
        urls
    }
}

#[derive(Deserialize)]
struct IdeasPayload {
    ideas: Vec<ProductIdea>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendPayload {
    trend_name: String,
    description: String,
    search_volume_level: crate::types::SearchVolume,
}

#[derive(Deserialize)]
struct TrendsPayload {
    trends: Vec<TrendPayload>,
}

pub fn decode_ideas(envelope: &GenerateContentResponse) -> Result<Vec<ProductIdea>, GatewayError> {
    let text = envelope.text().unwrap_or_else(|| r#"{"ideas": []}"#.to_string());
    let payload: IdeasPayload = serde_json::from_str(&text)
        .map_err(|e| GatewayError::Shape(format!("ideas payload: {e}")))?;
    Ok(payload.ideas)
}

/// Every trend of the batch gets the same (up to 3) grounding URLs.
pub fn decode_trends(envelope: &GenerateContentResponse) -> Result<Vec<TrendResult>, GatewayError> {
    let mut urls = envelope.grounding_urls();
    urls.truncate(MAX_GROUNDING_URLS);

    let text = envelope.text().unwrap_or_else(|| r#"{"trends": []}"#.to_string());
    let payload: TrendsPayload = serde_json::from_str(&text)
        .map_err(|e| GatewayError::Shape(format!("trends payload: {e}")))?;

    Ok(payload
        .trends
        .into_iter()
        .map(|t| TrendResult {
            trend_name: t.trend_name,
            description: t.description,
            search_volume_level: t.search_volume_level,
            grounding_urls: urls.clone(),
        })
        .collect())
}

/// First inline image of the first candidate.
pub fn decode_mockup(envelope: &GenerateContentResponse) -> Result<MockupImage, GatewayError> {
    let inline = envelope
        .first_parts()
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|d| d.data.as_deref().is_some_and(|data| !data.is_empty()))
        .ok_or(GatewayError::NoImage)?;

    let image = MockupImage {
        mime_type: inline
            .mime_type
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string()),
        data: inline.data.clone().unwrap_or_default(),
    };
    image
        .bytes()
        .map_err(|e| GatewayError::Shape(format!("image data is not base64: {e}")))?;
    Ok(image)
}
