//! Delivery strategies for sending finished ESC/POS buffers
//!
//! Everything here treats the buffer as opaque binary. No re-encoding,
//! no newline translation: a single text-mode transformation after
//! rendering corrupts control bytes, so the chain only ever moves
//! `&[u8]` around.
//!
//! Strategies:
//! - [`NetworkPrinter`]: raw TCP (port 9100)
//! - [`DevicePrinter`]: direct write to a device node (`/dev/usb/lp0`)
//! - [`SpoolerPrinter`]: CUPS `lp -o raw`
//! - [`FallbackPrinter`]: ordered chain, first success wins

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::escpos::DrawerPin;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is reachable
    async fn is_online(&self) -> bool;
}

/// Raw TCP printer (JetDirect port 9100)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(5),
        }
    }

    /// Parse a `host:port` string; the port defaults to 9100 when absent.
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => {
                let port = port
                    .parse()
                    .map_err(|_| PrintError::InvalidConfig(format!("Invalid port in: {addr}")))?;
                Ok(Self::new(host, port))
            }
            None if !addr.is_empty() => Ok(Self::new(addr, 9100)),
            _ => Err(PrintError::InvalidConfig(format!(
                "Invalid printer address: {addr}"
            ))),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.target(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let mut stream = tokio::time::timeout(self.timeout, connect)
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.target())))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.target(), e)))?;

        stream.write_all(data).await?;
        stream.flush().await?;
        stream.shutdown().await?;

        info!(bytes = data.len(), "print job sent");
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.target()))]
    async fn is_online(&self) -> bool {
        let probe = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(Duration::from_millis(500), probe).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "printer offline");
                false
            }
            Err(_) => {
                warn!("printer probe timeout");
                false
            }
        }
    }
}

/// Direct write to a printer device node
#[derive(Debug, Clone)]
pub struct DevicePrinter {
    path: PathBuf,
}

impl DevicePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Printer for DevicePrinter {
    #[instrument(skip(self, data), fields(path = %self.path.display(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let mut device = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .await
            .map_err(|e| PrintError::Offline(format!("{}: {}", self.path.display(), e)))?;

        device.write_all(data).await?;
        device.flush().await?;

        info!(bytes = data.len(), "print job written to device");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }
}

/// CUPS spooler printing via `lp`
///
/// The buffer is spooled to a temp file and submitted with `-o raw`,
/// which stops the filter chain from touching the bytes.
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    queue: String,
}

impl SpoolerPrinter {
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

impl Printer for SpoolerPrinter {
    #[instrument(skip(self, data), fields(queue = %self.queue, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        use std::io::Write;

        let mut spool = tempfile::NamedTempFile::new()?;
        spool.write_all(data)?;
        spool.flush()?;

        let output = tokio::process::Command::new("lp")
            .args(["-d", &self.queue, "-o", "raw"])
            .arg(spool.path())
            .output()
            .await?;

        if !output.status.success() {
            return Err(PrintError::Spooler(format!(
                "lp -d {} failed: {}",
                self.queue,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!(bytes = data.len(), "print job spooled");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        match tokio::process::Command::new("lpstat")
            .args(["-p", &self.queue])
            .output()
            .await
        {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}

/// One configured delivery strategy
#[derive(Debug, Clone)]
pub enum PrintStrategy {
    Network(NetworkPrinter),
    Device(DevicePrinter),
    Spooler(SpoolerPrinter),
}

impl PrintStrategy {
    pub fn network(addr: &str) -> PrintResult<Self> {
        Ok(Self::Network(NetworkPrinter::from_addr(addr)?))
    }

    pub fn device(path: impl Into<PathBuf>) -> Self {
        Self::Device(DevicePrinter::new(path))
    }

    pub fn spooler(queue: impl Into<String>) -> Self {
        Self::Spooler(SpoolerPrinter::new(queue))
    }

    fn describe(&self) -> String {
        match self {
            Self::Network(p) => format!("network {}", p.target()),
            Self::Device(p) => format!("device {}", p.path.display()),
            Self::Spooler(p) => format!("spooler {}", p.queue),
        }
    }
}

impl Printer for PrintStrategy {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        match self {
            Self::Network(p) => p.print(data).await,
            Self::Device(p) => p.print(data).await,
            Self::Spooler(p) => p.print(data).await,
        }
    }

    async fn is_online(&self) -> bool {
        match self {
            Self::Network(p) => p.is_online().await,
            Self::Device(p) => p.is_online().await,
            Self::Spooler(p) => p.is_online().await,
        }
    }
}

/// Ordered delivery chain
///
/// Strategies are tried in configuration order; the first success
/// short-circuits the rest. Exhausting the chain is a failure reported
/// to the caller, never retried here - the caller still owns the buffer
/// and may re-submit it without re-rendering.
#[derive(Debug, Clone, Default)]
pub struct FallbackPrinter {
    strategies: Vec<PrintStrategy>,
}

impl FallbackPrinter {
    pub fn new(strategies: Vec<PrintStrategy>) -> Self {
        Self { strategies }
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Submit a finished buffer through the chain
    #[instrument(skip(self, data), fields(strategies = self.strategies.len(), data_len = data.len()))]
    pub async fn submit(&self, data: &[u8]) -> PrintResult<()> {
        if self.strategies.is_empty() {
            return Err(PrintError::InvalidConfig(
                "no delivery strategy configured".to_string(),
            ));
        }

        let mut last_error = None;
        for strategy in &self.strategies {
            match strategy.print(data).await {
                Ok(()) => {
                    info!(strategy = %strategy.describe(), "delivered");
                    return Ok(());
                }
                Err(e) => {
                    warn!(strategy = %strategy.describe(), error = %e, "strategy failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(PrintError::Exhausted {
            attempts: self.strategies.len(),
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Pulse the cash drawer
    ///
    /// Tries the primary pin first, then the alternate pin. Failure of
    /// both is reported but callers treat it as non-fatal.
    pub async fn open_drawer(&self) -> PrintResult<()> {
        if self.submit(&DrawerPin::Primary.pulse()).await.is_ok() {
            return Ok(());
        }
        warn!("cash drawer primary pin failed, trying alternate");
        self.submit(&DrawerPin::Alternate.pulse()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_from_addr_parses_host_and_port() {
        let printer = NetworkPrinter::from_addr("192.168.1.100:9100").unwrap();
        assert_eq!(printer.target(), "192.168.1.100:9100");
    }

    #[test]
    fn network_from_addr_defaults_port() {
        let printer = NetworkPrinter::from_addr("printer.local").unwrap();
        assert_eq!(printer.target(), "printer.local:9100");
    }

    #[test]
    fn network_from_addr_rejects_garbage() {
        assert!(NetworkPrinter::from_addr(":9100").is_err());
        assert!(NetworkPrinter::from_addr("host:not-a-port").is_err());
        assert!(NetworkPrinter::from_addr("").is_err());
    }

    #[tokio::test]
    async fn fallback_skips_failed_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("device");
        std::fs::write(&good, b"").unwrap();

        let chain = FallbackPrinter::new(vec![
            PrintStrategy::device(dir.path().join("missing/device")),
            PrintStrategy::device(&good),
        ]);

        chain.submit(b"\x1B\x40receipt").await.unwrap();
        assert_eq!(std::fs::read(&good).unwrap(), b"\x1B\x40receipt");
    }

    #[tokio::test]
    async fn fallback_reports_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let chain = FallbackPrinter::new(vec![
            PrintStrategy::device(dir.path().join("no/such/device")),
            PrintStrategy::device(dir.path().join("also/missing")),
        ]);

        let err = chain.submit(b"data").await.unwrap_err();
        assert!(matches!(err, PrintError::Exhausted { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn empty_chain_is_a_config_error() {
        let chain = FallbackPrinter::default();
        assert!(matches!(
            chain.submit(b"data").await.unwrap_err(),
            PrintError::InvalidConfig(_)
        ));
    }

    #[tokio::test]
    async fn open_drawer_writes_primary_pulse() {
        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join("drawer");
        std::fs::write(&device, b"").unwrap();

        let chain = FallbackPrinter::new(vec![PrintStrategy::device(&device)]);
        chain.open_drawer().await.unwrap();

        assert_eq!(std::fs::read(&device).unwrap(), DrawerPin::Primary.pulse());
    }
}
