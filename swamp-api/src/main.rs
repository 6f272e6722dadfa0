//! # SwampScheduler API Server
//!
//! Serves the SwampScheduler REST API under `/api`. Accounts live in the
//! hosted auth service; everything else lives in PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p swamp-api
//! ```

use std::sync::Arc;
use swamp_api::{
    app::{build_router, AppState},
    config::Config,
};
use swamp_shared::{
    auth::provider::HostedAuthClient,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "swamp_api=debug,swamp_shared=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before the log filter is read
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "SwampScheduler API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let auth = HostedAuthClient::new(&config.auth.url, &config.auth.anon_key)?;
    let bind_address = config.bind_address();
    let production = config.api.production;

    let state = AppState::new(pool.clone(), config, Arc::new(auth));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(
        address = %bind_address,
        environment = if production { "production" } else { "development" },
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}
