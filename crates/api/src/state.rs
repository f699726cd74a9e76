use std::sync::Arc;

use tally_link::LinkServices;
use tally_store::Stores;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-memory linkage stores (sessions, accounts, cursors, cache).
    pub stores: Stores,
    /// Orchestration services composed over the stores.
    pub services: LinkServices,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let stores = Stores::default();
        Self {
            config: Arc::new(config),
            services: LinkServices::new(stores.clone()),
            stores,
        }
    }
}
