//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::form: The transaction draft form (JSON API + HTMX)
//! - routes::context: Reference data (known accounts and payees)
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use beanform_config::Config;
use beanform_core::{FormSession, ReferenceCell};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<FormSession>>,
    pub reference: Arc<ReferenceCell>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::context::{api_form_context, api_form_context_reload};
    use routes::form::{
        api_form_add_meta, api_form_add_posting, api_form_preview, api_form_remove_meta,
        api_form_remove_posting, api_form_set_date, api_form_set_narration, api_form_set_payee,
        api_form_state, api_form_submit, api_form_update_meta, api_form_update_posting,
        htmx_form_preview, htmx_form_store, page_form,
    };
    use routes::settings::api_settings;

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/form", get(api_form_state))
        .route("/api/form/date", put(api_form_set_date))
        .route("/api/form/payee", put(api_form_set_payee))
        .route("/api/form/narration", put(api_form_set_narration))
        .route("/api/form/postings", post(api_form_add_posting))
        .route("/api/form/postings/:index", put(api_form_update_posting))
        .route("/api/form/postings/:index", delete(api_form_remove_posting))
        .route("/api/form/metas", post(api_form_add_meta))
        .route("/api/form/metas/:index", put(api_form_update_meta))
        .route("/api/form/metas/:index", delete(api_form_remove_meta))
        .route("/api/form/preview", get(api_form_preview))
        .route("/api/form/submit", post(api_form_submit))
        .route("/api/form/context", get(api_form_context))
        .route("/api/form/context/reload", post(api_form_context_reload))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_form))
        .route("/form/preview", get(htmx_form_preview))
        .route("/form", post(htmx_form_store))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
pub async fn start_server(config: Config, session: Arc<RwLock<FormSession>>, reference: Arc<ReferenceCell>) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        session,
        reference,
        config,
    };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.expect("cannot bind server address");
    eprintln!("[INFO] Starting Beanform server on http://{}", addr);
    eprintln!("[INFO] Available routes:");
    eprintln!("[INFO]   - / (Entry form)");
    eprintln!("[INFO]   - /api/form (Draft state)");
    eprintln!("[INFO]   - /api/form/context (Known accounts and payees)");
    eprintln!("[INFO]   - /api/* (JSON API endpoints)");

    match axum::serve(listener, router).await {
        Ok(_) => eprintln!("[INFO] Server stopped gracefully"),
        Err(e) => eprintln!("[ERROR] Server error: {}", e),
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Beanform</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}
