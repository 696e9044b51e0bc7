//! Finished-receipt handler
//!
//! Serves the rendered buffer as an opaque octet stream so a thin print
//! agent can fetch bytes without rendering locally. Anything that would
//! re-encode this body corrupts the control bytes, hence the explicit
//! binary content type.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use tracing::instrument;

use crate::core::{Result, ServerState};
use crate::printing::ReceiptRenderer;

/// GET /receipt/{order_ref}
#[instrument(skip(state))]
pub async fn receipt(
    State(state): State<ServerState>,
    Path(order_ref): Path<String>,
) -> Result<(HeaderMap, Vec<u8>)> {
    let snapshot = state.upstream.fetch_order(&order_ref).await?;
    let bytes = ReceiptRenderer::new(&snapshot, &state.render).render()?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(value) = HeaderValue::from_str(&snapshot.name) {
        headers.insert("X-Order-Name", value);
    }
    if let Ok(value) = HeaderValue::from_str(&snapshot.amount_total.to_string()) {
        headers.insert("X-Order-Total", value);
    }
    if let Ok(value) = HeaderValue::from_str(&snapshot.date_order.to_rfc3339()) {
        headers.insert("X-Order-Date", value);
    }

    Ok((headers, bytes))
}
