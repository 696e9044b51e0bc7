//! Relay configuration
//!
//! All configuration comes from environment variables with defaults, so
//! a bare `print-relay` starts against a local business system and a
//! CUPS queue named POS80.
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/pos-relay | settings file location |
//! | HTTP_PORT | 8766 | relay HTTP port |
//! | UPSTREAM_URL | http://localhost:8069 | order snapshot source |
//! | UPSTREAM_TIMEOUT_SECS | 10 | snapshot fetch timeout |
//! | PRINTER_DEVICE | (unset) | device node, tried first |
//! | PRINTER_QUEUE | POS80 | CUPS queue, tried second |
//! | PRINTER_ADDR | (unset) | host:port, tried last |
//! | RECEIPT_WIDTH | 42 | paper width in characters |
//! | RECEIPT_ENCODING | windows-1252 | codepage label |
//! | PRINT_LOGO / PRINT_BARCODE / SHOW_LOYALTY | true | feature toggles |
//! | FOOTER_MESSAGE / GOODBYE_MESSAGE | French defaults | footer text |

use pos_printer::{FallbackPrinter, PrintStrategy};
use shared::RenderConfig;
use tracing::warn;

/// Relay configuration, assembled once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the persisted relay settings
    pub work_dir: String,
    /// Relay HTTP port (discovery + print dispatch)
    pub http_port: u16,
    /// Base URL of the order snapshot source
    pub upstream_url: String,
    /// Snapshot fetch timeout in seconds
    pub upstream_timeout_secs: u64,
    /// Printer device node (tried first when set)
    pub printer_device: Option<String>,
    /// CUPS queue name (tried second when set)
    pub printer_queue: Option<String>,
    /// Network printer address (tried last when set)
    pub printer_addr: Option<String>,
    /// Per-device rendering options
    pub render: RenderConfig,
}

impl Config {
    /// Load from environment variables, using defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = RenderConfig::default();

        Self {
            work_dir: env_or("WORK_DIR", "/var/lib/pos-relay"),
            http_port: env_parse("HTTP_PORT", 8766),
            upstream_url: env_or("UPSTREAM_URL", "http://localhost:8069"),
            upstream_timeout_secs: env_parse("UPSTREAM_TIMEOUT_SECS", 10),
            printer_device: std::env::var("PRINTER_DEVICE").ok().filter(|s| !s.is_empty()),
            printer_queue: Some(env_or("PRINTER_QUEUE", "POS80")).filter(|s| !s.is_empty()),
            printer_addr: std::env::var("PRINTER_ADDR").ok().filter(|s| !s.is_empty()),
            render: RenderConfig {
                width: env_parse("RECEIPT_WIDTH", defaults.width),
                encoding: env_or("RECEIPT_ENCODING", &defaults.encoding),
                print_logo: env_parse("PRINT_LOGO", defaults.print_logo),
                print_barcode: env_parse("PRINT_BARCODE", defaults.print_barcode),
                show_loyalty: env_parse("SHOW_LOYALTY", defaults.show_loyalty),
                footer_message: env_or("FOOTER_MESSAGE", &defaults.footer_message),
                goodbye_message: env_or("GOODBYE_MESSAGE", &defaults.goodbye_message),
            },
        }
    }

    /// Build the delivery chain in fixed fallback order:
    /// device node, then spooler, then network port.
    pub fn delivery_chain(&self) -> FallbackPrinter {
        let mut strategies = Vec::new();

        if let Some(device) = &self.printer_device {
            strategies.push(PrintStrategy::device(device));
        }
        if let Some(queue) = &self.printer_queue {
            strategies.push(PrintStrategy::spooler(queue.clone()));
        }
        if let Some(addr) = &self.printer_addr {
            match PrintStrategy::network(addr) {
                Ok(strategy) => strategies.push(strategy),
                Err(e) => warn!(addr = %addr, error = %e, "ignoring invalid printer address"),
            }
        }

        FallbackPrinter::new(strategies)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
