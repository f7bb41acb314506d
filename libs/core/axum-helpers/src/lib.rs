//! # Axum Helpers
//!
//! Shared plumbing for the server-rendered Axum applications in this
//! workspace.
//!
//! ## Modules
//!
//! - **[`errors`]**: `AppError` boundary with structured error responses
//! - **[`extractors`]**: [`Payload`], a request body bound on demand
//! - **[`flash`]**: single-read notices carried across a redirect
//! - **[`render`]**: Handlebars pages, content negotiation, redirects
//! - **[`http`]**: security headers and form method override
//! - **[`server`]**: middleware stack, health checks, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let routes = Router::new().merge(health_router(app_info!()));
//!     let config = ServerConfig::default();
//!     let timeout = Duration::from_secs(30);
//!     create_production_app(create_router(routes), &config, timeout, async {}).await
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod flash;
pub mod http;
pub mod render;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{BindError, Payload};
pub use flash::{Flash, Level};
pub use http::{security_headers, with_method_override};
pub use render::{Format, TemplateEngine, TemplateError, negotiate, redirect};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};
