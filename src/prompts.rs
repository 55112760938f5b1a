//! Prompt text and response schemas sent to the generative model.

use serde_json::{json, Value};

use crate::types::{Difficulty, ProductIdea, SearchVolume};

/// Number of ideas requested per niche.
pub const IDEA_COUNT: usize = 5;

/// Number of trends requested per category.
pub const TREND_COUNT: usize = 3;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert Etsy shop consultant specializing in \
digital downloads and passive income streams.";

pub fn idea_prompt(niche: &str) -> String {
    format!(
        "Generate {IDEA_COUNT} unique, profitable digital product ideas for Etsy in the niche: \"{niche}\".\n\
         Focus on high-quality, in-demand items.\n\
         For 'format', suggest specific file types (e.g., 'Editable Canva Link', 'GoodNotes PDF', 'High-Res SVG').\n\
         For 'difficulty', estimate the creation skill level."
    )
}

pub fn trend_prompt(category: &str) -> String {
    format!(
        "What are the top trending digital product themes or keywords on Etsy right now related to \"{category}\"?\n\
         Identify {TREND_COUNT} distinct specific trends.\n\
         Provide a concise description of why it's trending.\n\
         Classify search volume as High, Medium, or Rising."
    )
}

pub fn mockup_prompt(description: &str) -> String {
    format!(
        "Create a professional, aesthetic product mockup for an Etsy listing image.\n\
         Product description: {description}.\n\
         Style: Minimalist, bright, high-resolution, Pinterest-worthy, soft lighting.\n\
         If it's a planner, show it on an iPad or open book. If it's wall art, show it in a frame in a living room."
    )
}

/// Short product summary fed to the mockup generator.
pub fn mockup_description(idea: &ProductIdea) -> String {
    format!(
        "{}. {}. Format: {}. Target Audience: {}",
        idea.title, idea.description, idea.format, idea.target_audience
    )
}

pub fn ideas_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ideas": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "targetAudience": { "type": "STRING" },
                        "priceRange": { "type": "STRING" },
                        "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "difficulty": { "type": "STRING", "enum": Difficulty::ALL },
                        "format": { "type": "STRING" }
                    },
                    "required": [
                        "title", "description", "targetAudience", "priceRange",
                        "tags", "difficulty", "format"
                    ]
                }
            }
        },
        "required": ["ideas"]
    })
}

pub fn trends_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "trends": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "trendName": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "searchVolumeLevel": { "type": "STRING", "enum": SearchVolume::ALL }
                    },
                    "required": ["trendName", "description", "searchVolumeLevel"]
                }
            }
        }
    })
}
