//! Session provider: connection pool lifecycle, per-request units of work, and table bootstrap.

use crate::config::DbSettings;
use crate::error::AppError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgConnection, PgPool, Postgres, Transaction};
use std::str::FromStr;

/// Owns the pool. Built once at startup, cloned into request state, closed at shutdown.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool. Connections are opened on demand, up to `pool_size + max_overflow`.
    pub async fn connect(settings: &DbSettings) -> Result<Self, sqlx::Error> {
        let mut connect_opts = PgConnectOptions::from_str(&settings.url)?;
        if !settings.echo {
            connect_opts = connect_opts.disable_statement_logging();
        }

        let mut pool_opts = PgPoolOptions::new()
            .max_connections(settings.max_connections())
            .acquire_timeout(settings.acquire_timeout);
        if settings.echo_pool {
            pool_opts = pool_opts
                .after_connect(|_conn, meta| {
                    Box::pin(async move {
                        tracing::info!(age = ?meta.age, "pool connection opened");
                        Ok(())
                    })
                })
                .before_acquire(|_conn, meta| {
                    Box::pin(async move {
                        tracing::info!(age = ?meta.age, idle_for = ?meta.idle_for, "pool checkout");
                        Ok(true)
                    })
                })
                .after_release(|_conn, meta| {
                    Box::pin(async move {
                        tracing::info!(age = ?meta.age, "pool checkin");
                        Ok(true)
                    })
                });
        }

        let pool = pool_opts.connect_with(connect_opts).await?;
        Ok(Database { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    /// Lend a fresh unit of work. Fails if no connection can be acquired.
    pub async fn session(&self) -> Result<Session, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(Session { tx })
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Wait for checked-out connections to return, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

/// One request's unit of work. Dropping without `commit` rolls back.
pub struct Session {
    tx: Transaction<'static, Postgres>,
}

impl Session {
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

const TABLES_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS description (
        id SERIAL PRIMARY KEY,
        dimensions TEXT NOT NULL,
        weight DOUBLE PRECISION NOT NULL,
        furniture_type TEXT NOT NULL,
        material TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS provider (
        id SERIAL PRIMARY KEY,
        product_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        full_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS buyer (
        id SERIAL PRIMARY KEY,
        full_name TEXT NOT NULL,
        organization_name TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        address TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "order" (
        id SERIAL PRIMARY KEY,
        product_quantity INTEGER NOT NULL,
        total_cost INTEGER NOT NULL,
        provider_id INTEGER NOT NULL REFERENCES provider (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product (
        id SERIAL PRIMARY KEY,
        price INTEGER NOT NULL,
        count INTEGER NOT NULL,
        order_id INTEGER REFERENCES "order" (id),
        description_id INTEGER NOT NULL REFERENCES description (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales_accounting (
        id SERIAL PRIMARY KEY,
        date DATE NOT NULL,
        product_id INTEGER NOT NULL REFERENCES product (id),
        buyer_id INTEGER NOT NULL REFERENCES buyer (id)
    )
    "#,
];

/// Create any missing tables, referenced tables first. Existing tables are left untouched.
pub async fn ensure_schema(db: &Database) -> Result<(), AppError> {
    let mut session = db.session().await?;
    for ddl in TABLES_DDL {
        sqlx::query(*ddl).execute(session.conn()).await?;
    }
    session.commit().await?;
    tracing::info!(tables = TABLES_DDL.len(), "schema ensured");
    Ok(())
}
