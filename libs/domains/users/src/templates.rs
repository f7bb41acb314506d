use axum_helpers::{TemplateEngine, TemplateError};

const PAGES: &[(&str, &str)] = &[
    ("users/index", include_str!("../templates/index.hbs")),
    ("users/new", include_str!("../templates/new.hbs")),
    ("users/edit", include_str!("../templates/edit.hbs")),
    ("users/show", include_str!("../templates/show.hbs")),
    ("users/destroyed", include_str!("../templates/destroyed.hbs")),
];

/// Register the user pages (and the shared form partial) on `engine`.
pub fn register(engine: &mut TemplateEngine) -> Result<(), TemplateError> {
    engine.register_partial("user_form", include_str!("../templates/form.hbs"))?;
    for (name, source) in PAGES {
        engine.register(name, source)?;
    }
    Ok(())
}

/// A fresh engine with the shared layout and the user pages.
pub fn engine() -> Result<TemplateEngine, TemplateError> {
    let mut engine = TemplateEngine::new()?;
    register(&mut engine)?;
    Ok(engine)
}
