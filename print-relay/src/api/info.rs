//! Discovery and liveness handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::local_ip;

#[derive(Serialize)]
pub struct InfoResponse {
    ip: String,
    port: u16,
    url: String,
}

/// GET /info
///
/// Zero-argument discovery: clients on the LAN probe candidate hosts
/// and use the advertised URL for their print calls.
pub async fn info(State(state): State<ServerState>) -> Json<InfoResponse> {
    let ip = local_ip().to_string();
    let url = format!("http://{ip}:{}", state.http_port);
    Json(InfoResponse {
        ip,
        port: state.http_port,
        url,
    })
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    module: &'static str,
    version: &'static str,
}

/// GET /status
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
