use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool};
use users::{
    config::AppConfig,
    photos::PhotoStore,
    repositories::{PgUserRepository, run_migrations},
    routes,
    service::UserService,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting users service");

    let config = AppConfig::load()?;
    info!(?config, "Configuration loaded");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let photo_store = PhotoStore::new(&config.photos.root_dir);
    info!(root = %photo_store.root().display(), "Photo storage configured");

    let user_service = UserService::new(Arc::new(PgUserRepository::new(pool)), photo_store);

    let app_state = AppState::new(
        user_service,
        config.auth.clone(),
        config.photos.max_upload_bytes,
    );

    // Start the web server
    let app = routes::create_router(app_state);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Users service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Users service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down users service");
}
