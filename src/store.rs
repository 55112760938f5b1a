use anyhow::Result;
use std::collections::HashSet;

use crate::db::KeyValueStore;
use crate::types::{ProductIdea, SavedItem};

/// Storage slot holding the JSON array of saved ideas.
pub const SAVED_IDEAS_KEY: &str = "etsyFlowSaved";

/// The user's saved ideas, kept in insertion order and written through to
/// storage on every mutation.
pub struct IdeaStore {
    items: Vec<SavedItem>,
    storage: Box<dyn KeyValueStore>,
}

impl IdeaStore {
    /// Read the persisted collection. Missing, unreadable or malformed data
    /// yields an empty store; nothing is surfaced to the caller.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let items = match storage.get_item(SAVED_IDEAS_KEY) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read saved ideas, starting empty: {e}");
                Vec::new()
            }
        };
        tracing::debug!(count = items.len(), "Loaded saved ideas");
        Self { items, storage }
    }

    /// Serialize the whole collection and overwrite the storage slot.
    pub fn save(&mut self) -> Result<()> {
        let json = encode(&self.items)?;
        self.storage.set_item(SAVED_IDEAS_KEY, &json)
    }

    /// Promote an idea into the saved list. Saving the same idea twice
    /// produces two distinct entries.
    pub fn add(&mut self, idea: ProductIdea) -> Result<SavedItem> {
        let item = SavedItem {
            idea,
            id: new_id(),
            created_at: chrono::Utc::now().timestamp_millis(),
            image_url: None,
        };
        self.items.push(item.clone());
        self.save()?;
        Ok(item)
    }

    /// Delete the entry with `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Ok(());
        }
        self.save()
    }

    /// Set the image on the first entry matching (title, description).
    /// Returns false when nothing matched.
    pub fn attach_image(
        &mut self,
        title: &str,
        description: &str,
        image_url: impl Into<String>,
    ) -> Result<bool> {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.idea.matches(title, description))
        else {
            return Ok(false);
        };
        item.image_url = Some(image_url.into());
        self.save()?;
        Ok(true)
    }

    pub fn is_saved(&self, title: &str, description: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.idea.matches(title, description))
    }

    pub fn get(&self, id: &str) -> Option<&SavedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[SavedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn encode(items: &[SavedItem]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

/// Parse a persisted collection. Anything that is not an array of valid
/// records decodes as empty; repeated ids keep their first occurrence.
pub fn decode(raw: &str) -> Vec<SavedItem> {
    let parsed: Vec<SavedItem> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Discarding malformed saved ideas: {e}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let total = parsed.len();
    let items: Vec<SavedItem> = parsed
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    if items.len() != total {
        tracing::warn!(dropped = total - items.len(), "Dropped saved ideas with repeated ids");
    }
    items
}
