//! Relay HTTP server

use std::net::SocketAddr;

use tracing::info;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::local_ip;

pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bind and serve until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let state = ServerState::from_config(&self.config)?;
        if state.delivery.is_empty() {
            tracing::warn!("no delivery strategy configured, print requests will fail");
        }

        let app = api::build_app(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("==================================================");
        info!("POS print relay");
        info!(upstream = %self.config.upstream_url, "order source");
        info!(url = %format!("http://{}:{}", local_ip(), self.config.http_port), "discovery endpoint");
        info!("==================================================");

        axum::serve(listener, app).await?;
        Ok(())
    }
}
