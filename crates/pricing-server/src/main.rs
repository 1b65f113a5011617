//! Pricing site server
//!
//! Axum server that hosts the WASM pricing site and the plan listing
//! function it calls.

mod config;
mod error;
mod handlers;
mod polar;
mod state;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::handlers::{get_plans, health_check};
use crate::polar::PolarClient;
use crate::state::AppState;

/// Route of the plan listing function
const GET_PLANS_PATH: &str = "/functions/v1/supabase-functions-get-plans";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env();

    let polar = match config.polar() {
        Ok(polar) => {
            tracing::info!(server = %polar.base_url, "✓ Polar configured");
            Ok(Arc::new(PolarClient::new(polar)))
        }
        Err(e) => {
            tracing::warn!("⚠ {e} - get-plans will answer with an error");
            tracing::warn!("  Set POLAR_ACCESS_TOKEN and POLAR_ORGANIZATION_ID in .env");
            Err(e.to_string())
        }
    };

    let app = router(AppState { polar }, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 pricing server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health - Health check");
    tracing::info!("  POST {GET_PLANS_PATH} - List plans");
    tracing::info!("  GET  /* - Static site from {}", config.static_dir);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
///
/// Unknown paths fall back to `index.html` so client-side routes survive a
/// reload.
fn router(state: AppState, static_dir: &str) -> Router {
    // Same CORS contract as the hosted function
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let index = Path::new(static_dir).join("index.html");

    Router::new()
        .route("/health", get(health_check))
        .route(GET_PLANS_PATH, get(get_plans).post(get_plans))
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::PolarConfig;

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn unconfigured() -> AppState {
        AppState {
            polar: Err("POLAR_ACCESS_TOKEN is not set".into()),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(router(unconfigured(), "static"), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["polar_configured"], false);
    }

    #[tokio::test]
    async fn test_get_plans_without_config() {
        let (status, body) = call(router(unconfigured(), "static"), "POST", GET_PLANS_PATH).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "POLAR_ACCESS_TOKEN is not set");
    }

    /// Local stand-in for the Polar API
    async fn fake_polar() -> String {
        let upstream = Router::new().route(
            "/v1/products/",
            get(move |headers: axum::http::HeaderMap| async move {
                let authorized = headers
                    .get(header::AUTHORIZATION)
                    .is_some_and(|v| v == "Bearer polar_oat_test");
                if !authorized {
                    let body = serde_json::json!({ "detail": "Unauthorized" });
                    return (StatusCode::UNAUTHORIZED, axum::Json(body));
                }
                (StatusCode::OK, axum::Json(crate::polar::tests::sample_page()))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn configured(base_url: String, token: &str) -> AppState {
        AppState {
            polar: Ok(Arc::new(PolarClient::new(PolarConfig {
                access_token: token.into(),
                organization_id: "org_1".into(),
                base_url,
            }))),
        }
    }

    #[tokio::test]
    async fn test_get_plans_proxies_polar() {
        let base = fake_polar().await;
        let app = router(configured(base, "polar_oat_test"), "static");
        let (status, body) = call(app, "POST", GET_PLANS_PATH).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["items"][0]["name"], "Growth");
        assert_eq!(body["items"][0]["prices"][0]["priceCurrency"], "usd");
    }

    #[tokio::test]
    async fn test_get_plans_reports_upstream_failure() {
        let base = fake_polar().await;
        let app = router(configured(base, "wrong"), "static");
        let (status, body) = call(app, "GET", GET_PLANS_PATH).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Polar API error (401)");
        assert!(body["details"].as_str().unwrap().contains("Unauthorized"));
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_client_routes_serve_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>pricing-web</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "mount()").unwrap();
        let static_dir = dir.path().to_str().unwrap();

        for uri in ["/", "/pricing"] {
            let (status, body) = get_text(router(unconfigured(), static_dir), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, "<html>pricing-web</html>", "{uri}");
        }

        let (status, body) = get_text(router(unconfigured(), static_dir), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "mount()");
    }
}
