//! Print dispatch handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::core::{Result, ServerState};
use crate::printing::ReceiptRenderer;

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    /// Order reference; when absent the most recent order is printed
    pub order_ref: Option<String>,
    /// Scope for the "most recent" lookup
    pub register_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Reprint: annotate the ticket, never pulse the drawer
    #[serde(default)]
    pub reprint: bool,
}

#[derive(Serialize)]
pub struct PrintResponse {
    pub order_name: String,
    pub total: f64,
    pub bytes_sent: usize,
}

/// POST /print
///
/// Fetch the snapshot, render it, hand the buffer to the delivery
/// chain. Rendering runs to completion synchronously; only the fetch
/// and the delivery are awaited.
#[instrument(skip(state, request), fields(order_ref = ?request.order_ref, reprint = request.reprint))]
pub async fn print(
    State(state): State<ServerState>,
    Json(request): Json<PrintRequest>,
) -> Result<Json<PrintResponse>> {
    let snapshot = match &request.order_ref {
        Some(order_ref) => state.upstream.fetch_order(order_ref).await?,
        None => {
            state
                .upstream
                .fetch_last_order(request.register_id, request.user_id)
                .await?
        }
    };

    let bytes = ReceiptRenderer::new(&snapshot, &state.render)
        .reprint(request.reprint)
        .render()?;

    state.delivery.submit(&bytes).await?;
    state.record_print(&snapshot).await;

    info!(order = %snapshot.name, bytes = bytes.len(), "receipt printed");
    Ok(Json(PrintResponse {
        order_name: snapshot.name,
        total: snapshot.amount_total,
        bytes_sent: bytes.len(),
    }))
}
