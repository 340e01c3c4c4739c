//! Storekeeper routes: pages, JSON projections, product patch, static assets.

use crate::handlers::pages::{dashboard, edit_form};
use crate::handlers::storekeeper::{
    buyers_info, order_form, orders_info, product_form, products_info, sale_form, sales_info,
    update_product,
};
use crate::state::AppState;
use axum::{routing::get, routing::patch, Router};
use std::path::Path;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub fn storekeeper_routes(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/storekeeper", get(dashboard))
        .route("/storekeeper/", get(dashboard))
        .route("/storekeeper/edit-form", get(edit_form))
        .route("/storekeeper/products-info", get(products_info))
        .route("/storekeeper/sales-info", get(sales_info))
        .route("/storekeeper/buyers-info", get(buyers_info))
        .route("/storekeeper/orders-info", get(orders_info))
        .route("/storekeeper/order-form", get(order_form))
        .route("/storekeeper/product-form", get(product_form))
        .route("/storekeeper/sale-form", get(sale_form))
        .route("/storekeeper/products", patch(update_product))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .nest_service("/storekeeper/static", ServeDir::new(static_dir))
        .with_state(state)
}
