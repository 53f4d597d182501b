//! HTTP gateway for pagekit.
//!
//! Renders every configured page on request. Each request gets its own
//! `WebAssets` from the shared `AssetEnvironment`, so concurrent requests
//! never observe each other's registrations.
//!
//! Endpoints:
//!
//! - `GET /health`             — Liveness check
//! - `GET /pages`              — Names of the configured pages
//! - `GET /pages/{name}`       — Rendered HTML document
//! - `GET /static/loader.js`   — Development module loader
//! - `GET /static/base.css`    — Base stylesheet

pub mod frontend;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use pagekit_config::AppConfig;
use pagekit_core::AssetEnvironment;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub environment: AssetEnvironment,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn from_config(config: AppConfig) -> Result<Self, pagekit_config::ConfigError> {
        let environment = config.environment()?;
        Ok(Self {
            config,
            environment,
        })
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/pages", get(list_pages_handler))
        .route("/pages/{name}", get(page_handler))
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState::from_config(config)?);

    info!(
        addr = %addr,
        mode = %state.environment.mode(),
        pages = state.config.pages.len(),
        "Gateway starting"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    mode: String,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.environment.mode().to_string(),
    })
}

#[derive(Serialize)]
struct PagesResponse {
    pages: Vec<String>,
}

async fn list_pages_handler(State(state): State<SharedState>) -> Json<PagesResponse> {
    Json(PagesResponse {
        pages: state.config.pages.iter().map(|p| p.name.clone()).collect(),
    })
}

async fn page_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Html<String>, (StatusCode, String)> {
    let page = state
        .config
        .page(&name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Page '{name}' not found")))?;

    let mut assets = state.environment.page();
    let rendered = page
        .apply_to(&mut assets)
        .and_then(|()| assets.render())
        .map_err(|e| {
            error!(page = %name, error = %e, "Page assets failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render page '{name}'"),
            )
        })?;

    Ok(Html(rendered.document(page.body.as_deref().unwrap_or_default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pagekit_core::InMemoryManifests;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
[title]
base = "Acme"

[[pages]]
name = "checkout"
title = ["Checkout"]
keywords = ["shop"]
css = [{ source = "Shop.Checkout" }]
css_lists = [{ source = "Shop.Common", push = true }]
js = [{ module = "Shop.Cart", function = "init", args = [2] }]
body = "<main id=\"app\"></main>"

[[pages]]
name = "broken"
css_lists = [{ source = "Missing" }]
"#;

    fn test_state() -> SharedState {
        let config: AppConfig = toml::from_str(CONFIG).unwrap();
        let environment = config
            .environment()
            .unwrap()
            .with_manifests(Arc::new(
                InMemoryManifests::new().with("/Shop/Common.txt", "Shop.Base\n"),
            ));
        Arc::new(GatewayState {
            config,
            environment,
        })
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let app = build_router(test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"mode\":\"development\""));
    }

    #[tokio::test]
    async fn lists_pages() {
        let (status, body) = get("/pages").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"pages":["checkout","broken"]}"#);
    }

    #[tokio::test]
    async fn renders_page_document() {
        let (status, html) = get("/pages/checkout").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Acme - Checkout</title>"));
        assert!(html.contains(r#"<meta name="keywords" content="shop">"#));
        let base = html.find("/css/Shop/Base.css").unwrap();
        let checkout = html.find("/css/Shop/Checkout.css").unwrap();
        assert!(base < checkout);
        assert!(html.contains(r#"<script src="/static/loader.js" data-global="pagekit"></script>"#));
        assert!(html.contains("<main id=\"app\"></main>"));
    }

    #[tokio::test]
    async fn requests_are_isolated() {
        let state = test_state();
        for _ in 0..2 {
            let app = build_router(state.clone());
            let req = Request::builder()
                .uri("/pages/checkout")
                .body(Body::empty())
                .unwrap();
            let response = app.oneshot(req).await.unwrap();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let html = String::from_utf8_lossy(&body);
            assert_eq!(html.matches("Shop/Checkout.css").count(), 1);
            assert!(html.contains("<title>Acme - Checkout</title>"));
        }
    }

    #[tokio::test]
    async fn custom_loader_global_reaches_page_and_loader() {
        let config: AppConfig = toml::from_str(
            r#"
[js]
loader_global = "app"

[[pages]]
name = "home"
js = [{ module = "Site.Home", function = "init" }]
"#,
        )
        .unwrap();
        let state = Arc::new(GatewayState::from_config(config).unwrap());

        let req = Request::builder().uri("/pages/home").body(Body::empty()).unwrap();
        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains(r#"<script src="/static/loader.js" data-global="app"></script>"#));
        assert!(html.contains(r#"app.call("/js/Site/Home.js", "init", []);"#));
        assert!(!html.contains("pagekit.call"));

        // The served loader installs itself under whatever name the tag announces.
        let req = Request::builder()
            .uri("/static/loader.js")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(req).await.unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let loader = String::from_utf8_lossy(&body);
        assert!(loader.contains("script.dataset.global"));
        assert!(!loader.contains("global.pagekit ="));
    }

    #[tokio::test]
    async fn unknown_page_is_404() {
        let (status, _) = get("/pages/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn asset_failure_is_500() {
        let (status, body) = get("/pages/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("broken"));
    }
}
