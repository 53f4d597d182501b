//! Embedded static frontend assets.
//!
//! The development module loader and the base stylesheet from `frontend/`
//! are compiled into the binary using `include_str!`, enabling
//! single-binary deployment.

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

/// The embedded frontend files.
const LOADER_JS: &str = include_str!("../../../frontend/loader.js");
const BASE_CSS: &str = include_str!("../../../frontend/base.css");

/// Build a router that serves the embedded frontend.
pub fn frontend_router() -> Router {
    Router::new()
        .route("/static/loader.js", get(loader_handler))
        .route("/static/base.css", get(css_handler))
}

async fn loader_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        LOADER_JS,
    )
        .into_response()
}

async fn css_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        BASE_CSS,
    )
        .into_response()
}
