//! Router aggregator: per-resource routers merged into one HTTP surface.

pub mod common;
pub mod storekeeper;

pub use common::common_routes;
pub use storekeeper::storekeeper_routes;

use crate::state::AppState;
use axum::Router;
use std::path::Path;
use tower_http::trace::TraceLayer;

pub fn app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(storekeeper_routes(state, static_dir))
        .layer(TraceLayer::new_for_http())
}
