//! Query/update layer behind the storekeeper endpoints.
//!
//! Reads are fixed inner-join projections with no filtering or ordering; the single write is a
//! partial update of one product. Implementations: [`PgStore`] (PostgreSQL) and [`MemoryStore`]
//! (in-process tables for tests and database-less runs).

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::{BuyerInfo, OrderInfo, Product, ProductData, ProductInfo, SaleInfo};
use async_trait::async_trait;

#[async_trait]
pub trait StorekeeperStore: Send + Sync {
    /// Product joined with Description on `description_id`.
    async fn products_info(&self) -> Result<Vec<ProductInfo>, AppError>;

    /// Product joined with SalesAccounting on `product_id`; one row per sale.
    async fn sales_info(&self) -> Result<Vec<SaleInfo>, AppError>;

    /// Buyer joined with SalesAccounting on `buyer_id`; one row per purchase.
    async fn buyers_info(&self) -> Result<Vec<BuyerInfo>, AppError>;

    /// Order joined with Provider on `provider_id` and with Product on `order_id`.
    async fn orders_info(&self) -> Result<Vec<OrderInfo>, AppError>;

    /// Load the product by id, apply the present fields, persist. Returns the stored row.
    ///
    /// Unknown id: [`AppError::ProductNotFound`] and nothing is written.
    async fn update_product(&self, data: &ProductData) -> Result<Product, AppError>;

    /// Readiness check.
    async fn ping(&self) -> Result<(), AppError>;
}
