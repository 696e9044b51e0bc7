//! Relay HTTP surface
//!
//! - `GET /info` - discovery: the relay's reachable address
//! - `GET /status` - liveness probe
//! - `POST /print` - fetch, render and deliver one receipt
//! - `GET /receipt/{ref}` - finished receipt bytes for thin agents

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

mod info;
mod print;
mod receipt;

/// All routes, without middleware or state
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/info", get(info::info))
        .route("/status", get(info::status))
        .route("/print", post(print::print))
        .route("/receipt/{*order_ref}", get(receipt::receipt))
}

/// Fully configured application
///
/// CORS stays permissive: the point-of-sale frontend calls the relay
/// from another origin during discovery.
pub fn build_app(state: ServerState) -> Router {
    router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use shared::RenderConfig;
    use tower::ServiceExt;

    fn test_state(upstream_url: &str) -> ServerState {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            work_dir: dir.path().to_string_lossy().into_owned(),
            http_port: 8766,
            upstream_url: upstream_url.to_string(),
            upstream_timeout_secs: 1,
            printer_device: None,
            printer_queue: None,
            printer_addr: None,
            render: RenderConfig::default(),
        };
        ServerState::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn status_reports_module_and_version() {
        let app = build_app(test_state("http://127.0.0.1:9"));
        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["module"], "print-relay");
    }

    #[tokio::test]
    async fn info_advertises_a_reachable_url() {
        let app = build_app(test_state("http://127.0.0.1:9"));
        let response = app
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["port"], 8766);
        let url = json["url"].as_str().unwrap();
        assert!(url.starts_with("http://"));
        assert!(url.ends_with(":8766"));
    }

    #[tokio::test]
    async fn receipt_maps_unreachable_upstream_to_bad_gateway() {
        // Nothing listens on port 9: one attempt, clean structured error
        let app = build_app(test_state("http://127.0.0.1:9"));
        let response = app
            .oneshot(
                Request::get("/receipt/Shop/0042")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "upstream_unavailable");
    }

    #[tokio::test]
    async fn print_without_target_is_accepted_as_latest_query() {
        // An empty body still resolves to the "most recent order" query;
        // with a dead upstream that surfaces as a gateway error, not a 400
        let app = build_app(test_state("http://127.0.0.1:9"));
        let response = app
            .oneshot(
                Request::post("/print")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
