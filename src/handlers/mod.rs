//! HTTP handlers for the storekeeper pages and JSON endpoints.

pub mod pages;
pub mod storekeeper;
