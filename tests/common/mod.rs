//! Common test utilities - BeaconTest harness for end-to-end testing

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use beacond::broadcast::BroadcastStore;
use beacond::{Config, Server};
use reqwest::{Client, Method};
use tokio::task::JoinHandle;

/// Admin key every test server is started with
pub const ADMIN_KEY: &str = "integration-admin-key";

/// Test harness that spawns a real beacond server on a random port
pub struct BeaconTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl BeaconTest {
    /// Start a new test server instance with an in-memory database
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    /// Start a test server after letting the caller adjust the config
    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Result<Self> {
        let addr = free_addr()?;

        let mut config = Config {
            bind_addr: addr,
            admin_key: ADMIN_KEY.to_string(),
            db_path: None,
            ..Config::default()
        };
        configure(&mut config);

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body and no credentials
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request carrying an admin key
    pub async fn post_admin<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        key: &str,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .header("X-Admin-Key", key)
            .json(body)
            .send()
            .await?)
    }

    /// Send a bodiless request with an arbitrary method
    pub async fn request(&self, method: Method, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .request(method, format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Direct store access for assertions
    pub fn store(&self) -> BroadcastStore {
        BroadcastStore::new(self.server.db().pool().clone())
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}

impl Drop for BeaconTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

/// Find a random available local port
pub fn free_addr() -> Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Serve a stub image API on a random port; returns its endpoint URL
///
/// The stub answers with `{"url": "http://img.test/<prompt>.png"}`.
pub async fn stub_image_api() -> Result<String> {
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    let app = Router::new().route(
        "/generate",
        post(|Json(req): Json<Value>| async move {
            let prompt = req["prompt"].as_str().unwrap_or_default().to_string();
            Json(json!({ "url": format!("http://img.test/{}.png", prompt) }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}/generate", addr))
}
