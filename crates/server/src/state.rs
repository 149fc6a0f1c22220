//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the
//! assistant pipeline and both chat rooms, making them accessible to all
//! request handlers.

use askpti::{
    config::{present, AppConfig},
    history::InMemoryHistoryStore,
    providers::factory::build_history_store,
    Assistant, ChatRoom, RoomKind,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The question-answering pipeline shared by both rooms.
    pub assistant: Arc<Assistant>,
    /// Anonymous chat keyed by session id. History lives only in memory.
    pub public_room: Arc<ChatRoom>,
    /// The bounded store behind `public_room`, used to recognise issued session ids.
    pub public_sessions: InMemoryHistoryStore,
    /// Authenticated chat keyed by the token's user id, backed by the configured store.
    pub private_room: Arc<ChatRoom>,
}

/// Builds the shared application state from the configuration.
///
/// This function initializes all necessary services:
/// - It loads the corpus and instantiates the model and retrieval clients.
/// - It connects the private room to the configured history store.
/// - It gives the public room a bounded process-local store.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let assistant = Assistant::from_config(&config)?;
    let private_store = build_history_store(&config.history)?;

    let public_limits = config.rooms.public;
    let public_sessions = InMemoryHistoryStore::bounded(
        public_limits.max_sessions,
        public_limits.max_turns.saturating_mul(2),
    );
    let public_room = ChatRoom::new(
        RoomKind::Public,
        public_limits.variant,
        Arc::new(public_sessions.clone()),
    );
    let private_room = ChatRoom::new(RoomKind::Private, config.rooms.private.variant, private_store);
    info!(
        public_variant = %public_room.variant,
        max_sessions = public_limits.max_sessions,
        private_variant = %private_room.variant,
        "Initialized chat rooms."
    );

    if present(&config.jwt_secret).is_none() {
        info!("No jwt_secret configured; private chat endpoints are disabled.");
    }

    Ok(AppState {
        config: Arc::new(config),
        assistant: Arc::new(assistant),
        public_room: Arc::new(public_room),
        public_sessions,
        private_room: Arc::new(private_room),
    })
}
