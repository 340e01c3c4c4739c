//! Storekeeper JSON handlers: four read projections and the product patch.

use crate::error::AppError;
use crate::extractors::AppJson;
use crate::model::{BuyerInfo, OrderInfo, ProductData, ProductInfo, SaleInfo};
use crate::state::AppState;
use axum::{extract::State, Json};

/// GET /storekeeper/products-info
pub async fn products_info(State(state): State<AppState>) -> Result<Json<Vec<ProductInfo>>, AppError> {
    Ok(Json(state.store.products_info().await?))
}

/// GET /storekeeper/sales-info
pub async fn sales_info(State(state): State<AppState>) -> Result<Json<Vec<SaleInfo>>, AppError> {
    Ok(Json(state.store.sales_info().await?))
}

/// GET /storekeeper/buyers-info
pub async fn buyers_info(State(state): State<AppState>) -> Result<Json<Vec<BuyerInfo>>, AppError> {
    Ok(Json(state.store.buyers_info().await?))
}

/// GET /storekeeper/orders-info
pub async fn orders_info(State(state): State<AppState>) -> Result<Json<Vec<OrderInfo>>, AppError> {
    Ok(Json(state.store.orders_info().await?))
}

/// PATCH /storekeeper/products: partial update; body is the JSON string "200" on success.
pub async fn update_product(
    State(state): State<AppState>,
    AppJson(body): AppJson<ProductData>,
) -> Result<Json<&'static str>, AppError> {
    state.store.update_product(&body).await?;
    Ok(Json("200"))
}

/// GET /storekeeper/order-form
pub async fn order_form() -> AppError {
    AppError::NotImplemented("/storekeeper/order-form")
}

/// GET /storekeeper/product-form
pub async fn product_form() -> AppError {
    AppError::NotImplemented("/storekeeper/product-form")
}

/// GET /storekeeper/sale-form
pub async fn sale_form() -> AppError {
    AppError::NotImplemented("/storekeeper/sale-form")
}
