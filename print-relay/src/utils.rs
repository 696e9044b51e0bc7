//! Small relay utilities: logging setup, LAN address detection

use std::net::{IpAddr, Ipv4Addr};

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber
///
/// Level comes from `RUST_LOG`, defaulting to info. Output stays terse:
/// no targets, no file/line noise.
pub fn init_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Detect this machine's LAN address
///
/// Opens a connectionless UDP socket toward a public address; no packet
/// is sent, the OS just picks the outbound interface. Falls back to
/// loopback when the machine has no route at all.
pub fn local_ip() -> IpAddr {
    fn detect() -> std::io::Result<IpAddr> {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip())
    }

    detect().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
