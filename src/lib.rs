//! Storekeeper: inventory backend serving stock, sales, buyer and order views over PostgreSQL.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{DbSettings, Settings, StoreKind};
pub use db::{ensure_schema, Database, Session};
pub use error::{AppError, ConfigError};
pub use model::{FieldUpdate, ProductData};
pub use routes::{app, common_routes, storekeeper_routes};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, StorekeeperStore};
