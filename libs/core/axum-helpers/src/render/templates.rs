use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::flash::Flash;

const LAYOUT: &str = include_str!("templates/layout.hbs");
const FLASH: &str = include_str!("templates/flash.hbs");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to register template '{name}': {source}")]
    Register {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("template '{0}' is not registered")]
    Missing(String),

    #[error("failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("failed to build template context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Handlebars registry with the shared `layout` and `flash` partials.
///
/// Pages wrap themselves in the layout with a partial block:
///
/// ```handlebars
/// {{#> layout title="Users"}}
///   <h1>Users</h1>
/// {{/layout}}
/// ```
///
/// Output is HTML-escaped. Missing fields render as empty strings.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        let mut engine = Self { registry };
        engine.register_partial("layout", LAYOUT)?;
        engine.register_partial("flash", FLASH)?;
        Ok(engine)
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Register {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    pub fn register_partial(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_partial(name, source)
            .map_err(|e| TemplateError::Register {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, TemplateError> {
        if !self.has_template(name) {
            return Err(TemplateError::Missing(name.to_string()));
        }
        Ok(self.registry.render(name, data)?)
    }

    /// Render `name` with the fields of `view` plus the pending notices
    /// under `flash`.
    pub fn render_page<T: Serialize>(
        &self,
        name: &str,
        view: &T,
        flash: &Flash,
    ) -> Result<String, TemplateError> {
        let context = page_context(view, flash)?;
        self.render(name, &context)
    }
}

/// The context a page template sees: the view model's own fields with
/// `flash` added alongside. A view that is not a struct lands under `data`.
pub fn page_context<T: Serialize>(view: &T, flash: &Flash) -> Result<Value, TemplateError> {
    let mut context = match serde_json::to_value(view)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    context.insert("flash".to_string(), serde_json::to_value(flash)?);
    Ok(Value::Object(context))
}
