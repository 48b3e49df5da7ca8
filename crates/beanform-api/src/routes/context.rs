//! Reference data endpoints - known accounts and payees
//!
//! The form consumes this as a snapshot with loading / failed / ready
//! states; the reload endpoint refreshes it from the provider.

use crate::AppState;

/// Get the current reference snapshot (JSON API)
pub async fn api_form_context(state: axum::extract::State<AppState>) -> String {
    let snapshot = state.reference.state();
    serde_json::to_string(&snapshot).unwrap_or_default()
}

/// Reload reference data from the provider (JSON API)
pub async fn api_form_context_reload(state: axum::extract::State<AppState>) -> String {
    state.reference.refresh().await;
    let snapshot = state.reference.state();
    serde_json::to_string(&snapshot).unwrap_or_default()
}
