//! Tauri shell: managed state, command bindings and startup.

use std::sync::Arc;

use tauri::Manager;

use crate::config::AppConfig;
use crate::db::{self, KeyValueStore, MemoryStore, SqliteStore};
use crate::gateway::{AiGateway, GeminiGateway};
use crate::session::SessionView;
use crate::store::IdeaStore;
use crate::types::{AppView, ProductIdea, SavedItem, TrendResult};
use crate::{commands, AppMutex, AppState};

/// The configured AI gateway. None when no API key was available at startup.
pub struct GatewayHandle(pub Option<Arc<dyn AiGateway>>);

impl GatewayHandle {
    fn get(&self) -> Result<Arc<dyn AiGateway>, String> {
        self.0.clone().ok_or_else(|| "gateway_not_configured".to_string())
    }
}

// ─── Tauri commands ────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn generate_ideas(
    niche: String,
    state: tauri::State<'_, AppMutex>,
    gateway: tauri::State<'_, GatewayHandle>,
) -> Result<Option<Vec<ProductIdea>>, String> {
    let gateway = gateway.get()?;
    commands::generate_ideas(state.inner(), gateway.as_ref(), &niche).await
}

#[tauri::command]
pub async fn find_trends(
    category: String,
    state: tauri::State<'_, AppMutex>,
    gateway: tauri::State<'_, GatewayHandle>,
) -> Result<Option<Vec<TrendResult>>, String> {
    let gateway = gateway.get()?;
    commands::find_trends(state.inner(), gateway.as_ref(), &category).await
}

/// Generate a mockup. Resolves to the image data URL.
#[tauri::command]
pub async fn visualize_idea(
    idea: ProductIdea,
    state: tauri::State<'_, AppMutex>,
    gateway: tauri::State<'_, GatewayHandle>,
) -> Result<Option<String>, String> {
    let gateway = gateway.get()?;
    commands::visualize(state.inner(), gateway.as_ref(), idea).await
}

#[tauri::command]
pub async fn save_idea(
    idea: ProductIdea,
    state: tauri::State<'_, AppMutex>,
) -> Result<SavedItem, String> {
    commands::save_idea(state.inner(), idea).await
}

#[tauri::command]
pub async fn remove_saved(id: String, state: tauri::State<'_, AppMutex>) -> Result<(), String> {
    commands::remove_saved(state.inner(), &id).await
}

#[tauri::command]
pub async fn list_saved(state: tauri::State<'_, AppMutex>) -> Result<Vec<SavedItem>, String> {
    Ok(commands::list_saved(state.inner()).await)
}

#[tauri::command]
pub async fn is_saved(
    title: String,
    description: String,
    state: tauri::State<'_, AppMutex>,
) -> Result<bool, String> {
    Ok(commands::is_saved(state.inner(), &title, &description).await)
}

#[tauri::command]
pub async fn get_session(state: tauri::State<'_, AppMutex>) -> Result<SessionView, String> {
    Ok(commands::current_session(state.inner()).await)
}

#[tauri::command]
pub async fn set_view(view: AppView, state: tauri::State<'_, AppMutex>) -> Result<(), String> {
    commands::set_view(state.inner(), view).await;
    Ok(())
}

#[tauri::command]
pub async fn open_external_url(url: String) -> Result<(), String> {
    commands::open_external_url(&url)
}

// ─── Startup ───────────────────────────────────────────────────────────────────

/// Open the on-disk storage and load the saved ideas. Falls back to an
/// in-memory store when the data dir is unusable.
fn open_store(app: &tauri::AppHandle, config: &AppConfig) -> IdeaStore {
    let data_dir = config
        .data_dir
        .clone()
        .or_else(|| app.path().app_data_dir().ok());

    let storage: Box<dyn KeyValueStore> = match db::storage_path(data_dir.as_deref()) {
        Some(path) => match SqliteStore::open(&path) {
            Ok(store) => {
                tracing::info!(path = %path.display(), "Opened storage");
                Box::new(store)
            }
            Err(e) => {
                tracing::error!("Failed to open storage at {}: {e}", path.display());
                Box::new(MemoryStore::new())
            }
        },
        None => {
            tracing::error!("No data directory available, saved ideas will not persist");
            Box::new(MemoryStore::new())
        }
    };
    IdeaStore::load(storage)
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    crate::init_tracing();

    let config = AppConfig::from_env();
    let gateway: Option<Arc<dyn AiGateway>> = match GeminiGateway::new(&config) {
        Ok(g) => Some(Arc::new(g)),
        Err(e) => {
            tracing::error!("AI gateway unavailable: {e}");
            None
        }
    };

    tauri::Builder::default()
        .manage(GatewayHandle(gateway))
        .invoke_handler(tauri::generate_handler![
            generate_ideas,
            find_trends,
            visualize_idea,
            save_idea,
            remove_saved,
            list_saved,
            is_saved,
            get_session,
            set_view,
            open_external_url,
        ])
        .setup(move |app| {
            let store = open_store(app.handle(), &config);
            app.manage(AppMutex::new(AppState::new(store)));
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
