use crate::gateway::AiGateway;
use crate::prompts;
use crate::session::SessionView;
use crate::types::{AppView, ProductIdea, SavedItem, TrendResult};
use crate::AppMutex;

// User-facing failure messages. The cause is only logged.
pub const IDEAS_FAILED: &str = "Failed to generate ideas. Please try again.";
pub const TRENDS_FAILED: &str = "Failed to find trends. Please try again.";
pub const MOCKUP_FAILED: &str = "Could not generate image. Please try again.";

// ─── Gateway-backed commands ───────────────────────────────────────────────────

/// Brainstorm ideas for `niche` and make them the current idea list.
/// Returns `Ok(None)` when a newer idea query superseded this one, whether
/// this one succeeded or failed.
pub async fn generate_ideas(
    state: &AppMutex,
    gateway: &dyn AiGateway,
    niche: &str,
) -> Result<Option<Vec<ProductIdea>>, String> {
    if niche.trim().is_empty() {
        return Err("empty_query".to_string());
    }

    let token = state.lock().await.session.begin_ideas();
    // Lock released while the request is in flight.
    let result = gateway.generate_ideas(niche).await;

    let mut s = state.lock().await;
    match result {
        Ok(ideas) => {
            if !s.session.finish_ideas(token, ideas.clone()) {
                tracing::debug!("Discarding superseded idea response");
                return Ok(None);
            }
            tracing::info!(count = ideas.len(), "Generated ideas");
            Ok(Some(ideas))
        }
        Err(e) => {
            if !s.session.fail(token) {
                tracing::debug!("Discarding superseded idea failure: {e}");
                return Ok(None);
            }
            tracing::error!("Error generating ideas: {e}");
            Err(IDEAS_FAILED.to_string())
        }
    }
}

/// Look up trends for `category` and make them the current trend list.
pub async fn find_trends(
    state: &AppMutex,
    gateway: &dyn AiGateway,
    category: &str,
) -> Result<Option<Vec<TrendResult>>, String> {
    if category.trim().is_empty() {
        return Err("empty_query".to_string());
    }

    let token = state.lock().await.session.begin_trends();
    let result = gateway.find_trends(category).await;

    let mut s = state.lock().await;
    match result {
        Ok(trends) => {
            if !s.session.finish_trends(token, trends.clone()) {
                tracing::debug!("Discarding superseded trend response");
                return Ok(None);
            }
            tracing::info!(count = trends.len(), "Found trends");
            Ok(Some(trends))
        }
        Err(e) => {
            if !s.session.fail(token) {
                tracing::debug!("Discarding superseded trend failure: {e}");
                return Ok(None);
            }
            tracing::error!("Error finding trends: {e}");
            Err(TRENDS_FAILED.to_string())
        }
    }
}

/// Render a mockup for `idea`, show it in the visualizer and attach it to the
/// first saved entry with the same (title, description).
///
/// The visualizer only shows the latest mockup request. The saved entry takes
/// the image unless a newer request for the same idea was issued, so an older
/// render never overwrites a newer one. Returns `Ok(None)` when the
/// visualizer has moved on.
pub async fn visualize(
    state: &AppMutex,
    gateway: &dyn AiGateway,
    idea: ProductIdea,
) -> Result<Option<String>, String> {
    let description = prompts::mockup_description(&idea);
    let token = state.lock().await.session.begin_mockup(idea.clone());
    let result = gateway.generate_mockup(&description).await;

    let mut s = state.lock().await;
    match result {
        Ok(image) => {
            let url = image.data_url();
            let shown = s.session.finish_mockup(token, url.clone());
            if !s.session.is_latest_for_idea(token, &idea.title, &idea.description) {
                tracing::debug!("Discarding mockup replaced by a newer render of the same idea");
                return Ok(None);
            }
            let attached = s
                .store
                .attach_image(&idea.title, &idea.description, url.clone())
                .map_err(|e| e.to_string())?;
            if attached {
                tracing::info!("Attached mockup to saved idea");
            }
            if !shown {
                tracing::debug!("Visualizer moved on, mockup kept only on the saved idea");
                return Ok(None);
            }
            Ok(Some(url))
        }
        Err(e) => {
            if !s.session.fail(token) {
                tracing::debug!("Discarding superseded mockup failure: {e}");
                return Ok(None);
            }
            tracing::error!("Error generating image: {e}");
            Err(MOCKUP_FAILED.to_string())
        }
    }
}

// ─── Saved collection ──────────────────────────────────────────────────────────

pub async fn save_idea(state: &AppMutex, idea: ProductIdea) -> Result<SavedItem, String> {
    state.lock().await.store.add(idea).map_err(|e| e.to_string())
}

pub async fn remove_saved(state: &AppMutex, id: &str) -> Result<(), String> {
    state.lock().await.store.remove(id).map_err(|e| e.to_string())
}

pub async fn list_saved(state: &AppMutex) -> Vec<SavedItem> {
    state.lock().await.store.items().to_vec()
}

pub async fn is_saved(state: &AppMutex, title: &str, description: &str) -> bool {
    state.lock().await.store.is_saved(title, description)
}

// ─── Session ───────────────────────────────────────────────────────────────────

pub async fn current_session(state: &AppMutex) -> SessionView {
    state.lock().await.session.snapshot()
}

pub async fn set_view(state: &AppMutex, view: AppView) {
    state.lock().await.session.view = view;
}

/// Only plain web links (grounding citations) may be handed to the OS.
pub fn is_external_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")) && !lower.contains(char::is_whitespace)
}

/// Open a citation link in the default browser.
pub fn open_external_url(url: &str) -> Result<(), String> {
    if !is_external_url(url) {
        return Err("invalid_url".to_string());
    }
    open::that_detached(url.trim()).map_err(|e| e.to_string())
}
