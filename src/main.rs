//! Storekeeper server: reads settings, opens the session provider, serves until Ctrl-C or SIGTERM.

use storekeeper::{app, ensure_schema, AppState, Database, MemoryStore, PgStore, Settings, StoreKind};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("storekeeper=info,tower_http=info"));
    if settings.db.echo {
        filter = filter.add_directive("sqlx::query=debug".parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let database = match settings.store {
        StoreKind::Postgres => {
            let db = Database::connect(&settings.db).await?;
            if settings.bootstrap {
                ensure_schema(&db).await?;
            }
            Some(db)
        }
        StoreKind::Memory => None,
    };
    let state = match &database {
        Some(db) => AppState::new(PgStore::new(db.clone())),
        None => {
            tracing::warn!("running on the in-memory store; data is lost on exit");
            AppState::new(MemoryStore::new())
        }
    };

    let router = app(state, &settings.static_dir);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
