use axum_helpers::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, PostgresConfig};
use domain_users::{InMemoryUserStore, PgUserStore};
use migration::Migrator;
use std::sync::Arc;
use tracing::info;

mod config;
mod routes;
mod state;

use config::Config;
use state::{AppState, Backend};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let backend = match config.database.clone() {
        Some(database) => connect_postgres(database, config.web.run_migrations).await?,
        None => {
            info!("DATABASE_URL not set, keeping users in memory");
            Backend::Memory(InMemoryUserStore::new())
        }
    };

    let templates = routes::template_engine()
        .map_err(|e| eyre::eyre!("Failed to load templates: {}", e))?;

    let state = AppState {
        config,
        backend,
        templates: Arc::new(templates),
    };

    // create_router adds method override, the 404 fallback, tracing and security headers
    let app = create_router(routes::routes(&state));

    info!(
        "Starting {} with graceful shutdown ({:?} timeout)",
        state.config.app.name, state.config.web.shutdown_timeout
    );

    let server = state.config.server.clone();
    let shutdown_timeout = state.config.web.shutdown_timeout;

    create_production_app(app, &server, shutdown_timeout, async move {
        if let Backend::Postgres { db, .. } = state.backend {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Shutdown complete");
    Ok(())
}

async fn connect_postgres(database: PostgresConfig, run_migrations: bool) -> eyre::Result<Backend> {
    let db = postgres::connect_from_config_with_retry(database, None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if run_migrations {
        postgres::run_migrations::<Migrator>(&db, env!("CARGO_PKG_NAME"))
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    Ok(Backend::Postgres {
        store: PgUserStore::new(db.clone()),
        db,
    })
}
