//! Form API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_form_state: Current draft with preview and validity (JSON)
//! - api_form_set_date / set_payee / set_narration: Scalar updates
//! - api_form_add_posting / update / remove: Posting row edits
//! - api_form_add_meta / update / remove: Metadata row edits
//! - api_form_preview: Entry text block (plain text)
//! - api_form_submit: Hand the draft to the mutation sink
//! - htmx_form_preview: Preview pane (HTML fragment)
//! - htmx_form_store: Store a whole posted form (HTMX)

use crate::{ApiError, AppState};
use axum::extract::Path;
use beanform_core::{
    preview_with_style, validate, FormSession, MetaEntry, MetaField, Posting, PostingField,
    TransactionDraft, ValidationIssue,
};
use beanform_utils::{escape_html, is_blank};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Draft state plus everything derived from it
#[derive(Debug, Serialize)]
pub struct FormStateResponse {
    pub draft: TransactionDraft,
    pub preview: String,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Body for scalar field updates
#[derive(Debug, Deserialize)]
pub struct ValueBody {
    pub value: Option<String>,
}

/// Body for posting row updates
#[derive(Debug, Deserialize)]
pub struct PostingUpdateBody {
    pub field: PostingField,
    pub value: String,
}

/// Body for metadata row updates
#[derive(Debug, Deserialize)]
pub struct MetaUpdateBody {
    pub field: MetaField,
    pub value: String,
}

fn state_json(session: &FormSession, state: &AppState) -> String {
    let draft = session.draft();
    let response = FormStateResponse {
        draft: draft.clone(),
        preview: preview_with_style(draft, state.config.form.date_style),
        valid: session.is_valid(),
        issues: validate::issues(draft),
    };
    serde_json::to_string(&response).unwrap_or_default()
}

fn error_json(error: &beanform_core::CoreError) -> String {
    serde_json::to_string(&serde_json::json!({ "error": error.to_details() }))
        .unwrap_or_default()
}

/// Parse a date value in either datetime or date-only form
fn parse_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Get the current draft state (JSON API)
pub async fn api_form_state(state: axum::extract::State<AppState>) -> String {
    let session = state.session.read().await;
    state_json(&session, &state)
}

/// Set the entry date; a missing or blank value clears it (JSON API)
pub async fn api_form_set_date(
    state: axum::extract::State<AppState>,
    body: axum::Json<ValueBody>,
) -> String {
    let value = body.0.value.unwrap_or_default();
    let date = if is_blank(&value) {
        None
    } else {
        match parse_date(&value) {
            Some(dt) => Some(dt),
            None => {
                let err = ApiError::BadRequest {
                    message: format!("invalid date: {}", value),
                };
                return format!(r#"{{"error": "{}"}}"#, escape_html(&err.to_string()));
            }
        }
    };
    let mut session = state.session.write().await;
    session.set_date(date);
    state_json(&session, &state)
}

/// Set the payee (JSON API)
pub async fn api_form_set_payee(
    state: axum::extract::State<AppState>,
    body: axum::Json<ValueBody>,
) -> String {
    let mut session = state.session.write().await;
    session.set_payee(&body.0.value.unwrap_or_default());
    state_json(&session, &state)
}

/// Set the narration (JSON API)
pub async fn api_form_set_narration(
    state: axum::extract::State<AppState>,
    body: axum::Json<ValueBody>,
) -> String {
    let mut session = state.session.write().await;
    session.set_narration(&body.0.value.unwrap_or_default());
    state_json(&session, &state)
}

/// Append an empty posting row (JSON API)
pub async fn api_form_add_posting(state: axum::extract::State<AppState>) -> String {
    let mut session = state.session.write().await;
    session.add_posting();
    state_json(&session, &state)
}

/// Update one field of a posting row (JSON API)
pub async fn api_form_update_posting(
    state: axum::extract::State<AppState>,
    path: Path<usize>,
    body: axum::Json<PostingUpdateBody>,
) -> String {
    let mut session = state.session.write().await;
    match session.update_posting(path.0, body.0.field, &body.0.value) {
        Ok(()) => state_json(&session, &state),
        Err(e) => error_json(&e),
    }
}

/// Remove a posting row (JSON API)
///
/// The minimum posting count is enforced here, not in the draft state:
/// the form always keeps `form.min_postings` rows around.
pub async fn api_form_remove_posting(
    state: axum::extract::State<AppState>,
    path: Path<usize>,
) -> String {
    let mut session = state.session.write().await;
    let min = state.config.form.min_postings;
    if session.draft().postings.len() <= min {
        let err = ApiError::Conflict {
            message: format!("the form keeps at least {} posting rows", min),
        };
        return format!(r#"{{"error": "{}"}}"#, escape_html(&err.to_string()));
    }
    match session.remove_posting(path.0) {
        Ok(()) => state_json(&session, &state),
        Err(e) => error_json(&e),
    }
}

/// Append an empty metadata row (JSON API)
pub async fn api_form_add_meta(state: axum::extract::State<AppState>) -> String {
    let mut session = state.session.write().await;
    session.add_meta();
    state_json(&session, &state)
}

/// Update one field of a metadata row (JSON API)
pub async fn api_form_update_meta(
    state: axum::extract::State<AppState>,
    path: Path<usize>,
    body: axum::Json<MetaUpdateBody>,
) -> String {
    let mut session = state.session.write().await;
    match session.update_meta(path.0, body.0.field, &body.0.value) {
        Ok(()) => state_json(&session, &state),
        Err(e) => error_json(&e),
    }
}

/// Remove a metadata row (JSON API)
pub async fn api_form_remove_meta(
    state: axum::extract::State<AppState>,
    path: Path<usize>,
) -> String {
    let mut session = state.session.write().await;
    match session.remove_meta(path.0) {
        Ok(()) => state_json(&session, &state),
        Err(e) => error_json(&e),
    }
}

/// Get the entry text block (plain text)
pub async fn api_form_preview(state: axum::extract::State<AppState>) -> String {
    let session = state.session.read().await;
    preview_with_style(session.draft(), state.config.form.date_style)
}

/// Submit the draft through the completion strategy (JSON API)
pub async fn api_form_submit(state: axum::extract::State<AppState>) -> String {
    let mut session = state.session.write().await;
    match session.submit().await {
        Ok(()) => state_json(&session, &state),
        Err(e) => error_json(&e),
    }
}

// ==================== HTMX endpoints ====================

/// HTMX: Preview pane with a validity badge
pub async fn htmx_form_preview(state: axum::extract::State<AppState>) -> String {
    let session = state.session.read().await;
    let text = preview_with_style(session.draft(), state.config.form.date_style);
    let badge = if session.is_valid() {
        "<span class='px-2 py-1 text-xs rounded bg-green-100 text-green-800'>Ready</span>"
    } else {
        "<span class='px-2 py-1 text-xs rounded bg-yellow-100 text-yellow-800'>Incomplete</span>"
    };
    format!(
        "<div class='flex items-center justify-between mb-2'><span class='text-sm font-medium text-gray-700'>Preview</span>{}</div><pre class='bg-gray-900 text-green-400 p-4 rounded-lg text-sm font-mono overflow-x-auto'>{}</pre>",
        badge,
        escape_html(&text)
    )
}

/// Decode an application/x-www-form-urlencoded body into key/value pairs
pub(crate) fn parse_form_params(body: &str) -> HashMap<String, String> {
    let mut params: HashMap<String, String> = HashMap::new();
    for pair in body.split('&') {
        let parts: Vec<&str> = pair.split('=').collect();
        if parts.len() == 2 {
            let key = urlencoding::decode(parts[0]).unwrap_or_default().into_owned();
            let value = urlencoding::decode(parts[1]).unwrap_or_default().into_owned();
            params.insert(key, value);
        }
    }
    params
}

/// Assemble a draft from posted form fields
///
/// Posting rows are `posting_N_account` / `posting_N_amount` and meta
/// rows `meta_N_key` / `meta_N_value`, numbered from 0 with no gaps.
pub(crate) fn draft_from_params(params: &HashMap<String, String>) -> TransactionDraft {
    let date = params
        .get("date")
        .and_then(|v| parse_date(v))
        .or_else(|| Some(chrono::Local::now().naive_local()));
    let payee = params
        .get("payee")
        .filter(|v| !is_blank(v))
        .map(|v| v.clone());
    let narration = params.get("narration").cloned().unwrap_or_default();

    let mut postings = vec![];
    let mut index = 0;
    loop {
        let account_key = format!("posting_{}_account", index);
        let amount_key = format!("posting_{}_amount", index);
        if !params.contains_key(&account_key) && !params.contains_key(&amount_key) {
            break;
        }
        let account = params
            .get(&account_key)
            .filter(|v| !is_blank(v))
            .map(|v| v.clone());
        let amount = params.get(&amount_key).cloned().unwrap_or_default();
        postings.push(Posting { account, amount });
        index += 1;
    }

    let mut metas = vec![];
    let mut index = 0;
    loop {
        let key_key = format!("meta_{}_key", index);
        let value_key = format!("meta_{}_value", index);
        if !params.contains_key(&key_key) && !params.contains_key(&value_key) {
            break;
        }
        metas.push(MetaEntry {
            key: params.get(&key_key).cloned().unwrap_or_default(),
            value: params.get(&value_key).cloned().unwrap_or_default(),
        });
        index += 1;
    }

    TransactionDraft {
        date,
        payee,
        narration,
        postings,
        metas,
    }
}

/// HTMX: Store a whole posted form
pub async fn htmx_form_store(state: axum::extract::State<AppState>, body: String) -> String {
    let params = parse_form_params(&body);
    let draft = draft_from_params(&params);

    let mut session = state.session.write().await;
    session.load(draft);
    match session.submit().await {
        Ok(()) => {
            r#"<div class='bg-green-50 border border-green-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-green-600'>✓</span><span class='font-medium text-green-800'>Entry submitted</span></div><p class='text-sm text-green-600 mt-1'>The form has been reset.</p><script>htmx.ajax('GET', '/form/preview', {target: '#preview-pane'});</script></div>"#.to_string()
        }
        Err(e) => {
            format!(
                r#"<div class='bg-red-50 border border-red-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>Submit failed</span></div><p class='text-sm text-red-600 mt-1'>{}</p></div>"#,
                escape_html(&e.to_string())
            )
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_params_decodes() {
        let params = parse_form_params("payee=Trader%20Joe%27s&narration=weekly");
        assert_eq!(params.get("payee").map(|s| s.as_str()), Some("Trader Joe's"));
        assert_eq!(params.get("narration").map(|s| s.as_str()), Some("weekly"));
    }

    #[test]
    fn test_draft_from_params_rows_in_order() {
        let body = "date=2023-01-05&payee=Costco&narration=\
                    &posting_0_account=Assets%3ABank&posting_0_amount=-10%20USD\
                    &posting_1_account=Expenses%3AFood&posting_1_amount=\
                    &meta_0_key=category&meta_0_value=food";
        let draft = draft_from_params(&parse_form_params(body));

        assert_eq!(draft.payee.as_deref(), Some("Costco"));
        assert_eq!(draft.postings.len(), 2);
        assert_eq!(draft.postings[0].account.as_deref(), Some("Assets:Bank"));
        assert_eq!(draft.postings[0].amount, "-10 USD");
        assert_eq!(draft.postings[1].account.as_deref(), Some("Expenses:Food"));
        assert_eq!(draft.postings[1].amount, "");
        assert_eq!(draft.metas.len(), 1);
        assert_eq!(draft.metas[0].key, "category");
        assert_eq!(
            draft.date.unwrap().format("%Y-%m-%d").to_string(),
            "2023-01-05"
        );
    }

    #[test]
    fn test_draft_from_params_blank_account_unset() {
        let body = "posting_0_account=&posting_0_amount=5%20USD";
        let draft = draft_from_params(&parse_form_params(body));
        assert_eq!(draft.postings.len(), 1);
        assert_eq!(draft.postings[0].account, None);
    }

    #[test]
    fn test_parse_date_forms() {
        assert!(parse_date("2023-01-05").is_some());
        assert!(parse_date("2023-01-05T09:30:00").is_some());
        assert!(parse_date("Jan 5").is_none());
    }
}
