//! beacond - broadcast message and image generation service
//!
//! Serves a single admin-controlled broadcast message and proxies image
//! generation prompts to an external API.

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod db;
pub mod imagegen;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use api::AppState;
use auth::{Authorizer, SharedSecret};
use db::Database;
use imagegen::ImageClient;

pub use config::Config;

/// The beacond server instance
pub struct Server {
    config: Config,
    db: Arc<Database>,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(Database::new(config.db_path.as_deref()).await?);
        let authorizer: Arc<dyn Authorizer> = Arc::new(SharedSecret::new(config.admin_key.clone()));
        let images = ImageClient::new(
            config.image_api_url.clone(),
            config.image_api_key.clone(),
            config.image_timeout(),
        )?;

        if !images.is_configured() {
            info!("Image generation endpoint not configured; /generate-image will return 503");
        }

        let state = AppState::new(db.clone(), authorizer, images);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            db,
            state,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("beacond listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("beacond shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
