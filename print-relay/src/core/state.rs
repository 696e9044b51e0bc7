//! Shared server state
//!
//! Built once at startup and cloned into every handler. Rendering is
//! synchronous and CPU-bound; the only awaited operations are the
//! snapshot fetch and the delivery submission.

use std::sync::Arc;
use std::time::Duration;

use shared::{OrderSnapshot, RenderConfig};
use tokio::sync::Mutex;
use tracing::warn;

use super::Config;
use crate::settings::SettingsStore;
use crate::upstream::UpstreamClient;
use pos_printer::FallbackPrinter;

#[derive(Clone)]
pub struct ServerState {
    pub upstream: UpstreamClient,
    pub delivery: Arc<FallbackPrinter>,
    pub render: Arc<RenderConfig>,
    pub http_port: u16,
    device_name: Option<Arc<str>>,
    settings: Arc<Mutex<SettingsStore>>,
}

impl ServerState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(
            config.upstream_url.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )?;

        let device_name = config
            .printer_device
            .as_deref()
            .or(config.printer_queue.as_deref())
            .or(config.printer_addr.as_deref())
            .map(Arc::from);

        Ok(Self {
            upstream,
            delivery: Arc::new(config.delivery_chain()),
            render: Arc::new(config.render.clone()),
            http_port: config.http_port,
            device_name,
            settings: Arc::new(Mutex::new(SettingsStore::open(&config.work_dir))),
        })
    }

    /// Append a successful print to the local history and save it.
    ///
    /// This is the explicit-save point for the persisted relay state;
    /// persistence problems are logged, never surfaced to the caller.
    pub async fn record_print(&self, snapshot: &OrderSnapshot) {
        let mut store = self.settings.lock().await;
        store.set_last_endpoint(self.upstream.base_url());
        if let Some(device) = &self.device_name {
            store.set_last_device(device.as_ref());
        }
        store.record_print(&snapshot.name, snapshot.amount_total);
        if let Err(e) = store.save() {
            warn!(error = %e, "failed to persist relay settings");
        }
    }
}
