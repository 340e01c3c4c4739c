//! PostgreSQL store. Every call runs in its own session from [`Database`].

use super::StorekeeperStore;
use crate::db::{Database, Session};
use crate::error::AppError;
use crate::model::{BuyerInfo, FieldUpdate, OrderInfo, Product, ProductData, ProductInfo, SaleInfo};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

const PRODUCTS_INFO_SQL: &str = r#"
    SELECT p.price, p.count, d.dimensions, d.weight, d.furniture_type, d.material
    FROM product p
    JOIN description d ON p.description_id = d.id
"#;

const SALES_INFO_SQL: &str = r#"
    SELECT p.price, p.count, p.order_id, s.date
    FROM product p
    JOIN sales_accounting s ON p.id = s.product_id
"#;

const BUYERS_INFO_SQL: &str = r#"
    SELECT b.full_name, b.organization_name, b.phone_number, b.address, s.date, s.product_id
    FROM buyer b
    JOIN sales_accounting s ON b.id = s.buyer_id
"#;

const ORDERS_INFO_SQL: &str = r#"
    SELECT o.product_quantity, o.total_cost, p.price, p.count,
           v.product_name, v.email, v.phone_number, v.full_name
    FROM "order" o
    JOIN provider v ON v.id = o.provider_id
    JOIN product p ON p.order_id = o.id
"#;

const SELECT_PRODUCT_FOR_UPDATE_SQL: &str =
    "SELECT id, price, count, order_id, description_id FROM product WHERE id = $1 FOR UPDATE";

const LOCK_ORDER_SQL: &str = r#"SELECT id FROM "order" WHERE id = $1 FOR KEY SHARE"#;

const LOCK_DESCRIPTION_SQL: &str = "SELECT id FROM description WHERE id = $1 FOR KEY SHARE";

const UPDATE_PRODUCT_SQL: &str = r#"
    UPDATE product
    SET price = $2, count = $3, order_id = $4, description_id = $5
    WHERE id = $1
    RETURNING id, price, count, order_id, description_id
"#;

#[derive(Clone, Debug)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        PgStore { db }
    }

    async fn fetch_projection<T>(&self, sql: &'static str) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut session = self.db.session().await?;
        let rows: Vec<T> = sqlx::query_as(sql).fetch_all(session.conn()).await?;
        session.commit().await?;
        Ok(rows)
    }
}

/// Lock a referenced row against deletion until commit; `false` when it does not exist.
async fn reference_exists(session: &mut Session, sql: &'static str, id: i32) -> Result<bool, AppError> {
    let row: Option<(i32,)> = sqlx::query_as(sql)
        .bind(id)
        .fetch_optional(session.conn())
        .await
        .map_err(AppError::UpdateFailed)?;
    Ok(row.is_some())
}

/// Every reference the payload sets must point at an existing row.
async fn check_references(session: &mut Session, data: &ProductData) -> Result<(), AppError> {
    let references = [
        ("order_id", data.order_id, LOCK_ORDER_SQL),
        ("description_id", data.description_id, LOCK_DESCRIPTION_SQL),
    ];
    for (field, update, sql) in references {
        if let FieldUpdate::Set(id) = update {
            if !reference_exists(session, sql, id).await? {
                return Err(AppError::InvalidReference { field, id });
            }
        }
    }
    Ok(())
}

/// A foreign-key violation that slips past `check_references` is attributed to the reference the
/// payload sets; anything else during the write is `UpdateFailed`.
fn write_error(data: &ProductData, err: sqlx::Error) -> AppError {
    let is_fk_violation = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation());
    let set_reference = match (data.order_id, data.description_id) {
        (FieldUpdate::Set(id), _) => Some(("order_id", id)),
        (_, FieldUpdate::Set(id)) => Some(("description_id", id)),
        _ => None,
    };
    match (is_fk_violation, set_reference) {
        (true, Some((field, id))) => AppError::InvalidReference { field, id },
        _ => AppError::UpdateFailed(err),
    }
}

#[async_trait]
impl StorekeeperStore for PgStore {
    async fn products_info(&self) -> Result<Vec<ProductInfo>, AppError> {
        self.fetch_projection(PRODUCTS_INFO_SQL).await
    }

    async fn sales_info(&self) -> Result<Vec<SaleInfo>, AppError> {
        self.fetch_projection(SALES_INFO_SQL).await
    }

    async fn buyers_info(&self) -> Result<Vec<BuyerInfo>, AppError> {
        self.fetch_projection(BUYERS_INFO_SQL).await
    }

    async fn orders_info(&self) -> Result<Vec<OrderInfo>, AppError> {
        self.fetch_projection(ORDERS_INFO_SQL).await
    }

    async fn update_product(&self, data: &ProductData) -> Result<Product, AppError> {
        let mut session = self.db.session().await.map_err(AppError::UpdateFailed)?;
        // Row lock: a concurrent patch of the same id waits, then sees this one's committed values.
        let current: Option<Product> = sqlx::query_as(SELECT_PRODUCT_FOR_UPDATE_SQL)
            .bind(data.id)
            .fetch_optional(session.conn())
            .await
            .map_err(AppError::UpdateFailed)?;
        let Some(mut product) = current else {
            session.rollback().await.map_err(AppError::UpdateFailed)?;
            return Err(AppError::ProductNotFound(data.id));
        };
        if data.is_noop() {
            session.commit().await.map_err(AppError::UpdateFailed)?;
            return Ok(product);
        }

        check_references(&mut session, data).await?;
        data.apply(&mut product);
        let updated: Product = sqlx::query_as(UPDATE_PRODUCT_SQL)
            .bind(product.id)
            .bind(product.price)
            .bind(product.count)
            .bind(product.order_id)
            .bind(product.description_id)
            .fetch_one(session.conn())
            .await
            .map_err(|e| write_error(data, e))?;
        session.commit().await.map_err(|e| write_error(data, e))?;
        tracing::info!(product_id = updated.id, "product updated");
        Ok(updated)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.ping().await.map_err(AppError::from)
    }
}
