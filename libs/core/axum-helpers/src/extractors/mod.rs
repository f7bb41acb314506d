//! Custom extractors for Axum handlers.

pub mod payload;

pub use payload::{BindError, Payload};
