//! Shared application state for all routes.

use crate::store::StorekeeperStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorekeeperStore>,
}

impl AppState {
    pub fn new(store: impl StorekeeperStore + 'static) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}
