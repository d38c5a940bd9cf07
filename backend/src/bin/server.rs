//! Person service HTTP server binary.
//!
//! Loads configuration, opens the store once, wires the logic layer and
//! router, and serves until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! # SQLite store at ./Person.db (default)
//! cargo run --bin person-server
//!
//! # In-memory store on another port
//! REPOSITORY_TYPE=local PORT=8000 cargo run --bin person-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: localhost)
//! - `PORT`: Server port (default: 9080)
//! - `DATABASE_PATH`: SQLite file, or `:memory:` (default: Person.db)
//! - `REPOSITORY_TYPE`: `sqlite` or `local` (default: sqlite)
//! - `REQUEST_TIMEOUT_SECS`: Per-operation deadline (default: 20)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use person_service::db::{RepositoryFactory, ServiceConfig};
use person_service::http::{create_router, AppState};
use person_service::services::PersonService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the library are forwarded too
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting person service");

    let config = ServiceConfig::load()?;
    info!(
        repository = %config.repository.repo_type,
        timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    // Open the store once and share it across every request
    let repository = RepositoryFactory::from_config(&config)?;
    info!("Repository initialized successfully");

    let service = PersonService::new(repository, config.request_timeout());
    let app = create_router(AppState::new(Arc::new(service)));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
