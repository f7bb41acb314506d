//! HTTP middleware module.
//!
//! This module provides HTTP-level middleware for:
//! - Security headers
//! - HTML form method override (`_method`)
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{security_headers, with_method_override};
//!
//! let app = with_method_override(routes)
//!     .layer(axum::middleware::from_fn(security_headers));
//! ```

pub mod method_override;
pub mod security;

pub use method_override::{method_override, with_method_override};
pub use security::security_headers;
