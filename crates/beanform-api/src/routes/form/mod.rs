//! Form routes - the transaction draft editor
//!
//! Features:
//! - Draft state with derived preview and validity on every read
//! - Scalar field and posting/meta row updates
//! - Submit through the configured completion strategy
//! - HTMX form page, preview fragment and urlencoded store endpoint
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{
    api_form_add_meta,
    api_form_add_posting,
    api_form_preview,
    api_form_remove_meta,
    api_form_remove_posting,
    api_form_set_date,
    api_form_set_narration,
    api_form_set_payee,
    api_form_state,
    api_form_submit,
    api_form_update_meta,
    api_form_update_posting,
    htmx_form_preview,
    htmx_form_store,
};

pub use page::page_form;
