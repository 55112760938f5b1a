pub mod commands;
pub mod config;
pub mod db;
#[cfg(feature = "desktop")]
pub mod desktop;
pub mod gateway;
pub mod prompts;
pub mod session;
pub mod store;
pub mod types;

use tokio::sync::Mutex;

use crate::session::Session;
use crate::store::IdeaStore;

/// All runtime state shared across commands.
pub struct AppState {
    /// Saved ideas, persisted on every change.
    pub store: IdeaStore,
    /// Latest query results and in-flight request generations.
    /// Never persisted.
    pub session: Session,
}

impl AppState {
    pub fn new(store: IdeaStore) -> Self {
        Self {
            store,
            session: Session::new(),
        }
    }
}

/// Type alias used in command signatures.
pub type AppMutex = Mutex<AppState>;

/// Install the global tracing subscriber.
pub fn init_tracing() {
    // Only log WARN and above in production to avoid leaking user queries
    #[cfg(debug_assertions)]
    let _ = tracing_subscriber::fmt().try_init();
    #[cfg(not(debug_assertions))]
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

#[cfg(feature = "desktop")]
pub use desktop::run;
