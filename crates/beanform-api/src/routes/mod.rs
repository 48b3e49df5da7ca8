//! API route modules

pub mod context;
pub mod form;
pub mod settings;
