//! HTML rendering and response shaping.
//!
//! - [`TemplateEngine`]: Handlebars pages wrapped in a shared layout
//! - [`negotiate`]: pick HTML or JSON from the `Accept` header
//! - [`redirect`]: redirects with an exact status code

pub mod negotiate;
pub mod redirect;
pub mod templates;

pub use negotiate::{Format, negotiate};
pub use redirect::redirect;
pub use templates::{TemplateEngine, TemplateError, page_context};
