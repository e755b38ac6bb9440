//! HTTP middleware module.
//!
//! - Security headers on every response
//! - `_method` override so HTML forms can issue PUT, PATCH and DELETE

pub mod method_override;
pub mod security;

pub use method_override::{method_override, with_method_override};
pub use security::security_headers;
