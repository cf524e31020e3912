//! Template rendering: the engine contract plus the tera implementation.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tera::Tera;

use crate::context::RenderContext;
use crate::error::{Error, Result};

/// What the converters need from a template engine.
///
/// Implementations resolve a template path, evaluate it against a context,
/// and report on their cache so callers can force a reload between renders.
pub trait TemplateRenderer {
    /// Render the template at `template_path` with `context`.
    fn render(&self, template_path: &str, context: &RenderContext) -> Result<String>;

    /// Whether the engine has loaded its template set and is ready to
    /// render. Cache clearing is only attempted on initialized engines.
    fn is_initialized(&self) -> bool;

    /// Drop every cached template so the next render re-reads sources.
    fn clear_cache(&self) -> Result<()>;
}

/// Tera-backed renderer.
///
/// Templates are either loaded from a directory glob (reloadable) or
/// registered from in-memory strings (fixed for the life of the instance).
/// Cloning is cheap; clones share one template cache.
#[derive(Clone)]
pub struct TeraRenderer {
    tera: Arc<RwLock<Tera>>,
    suffix: String,
    reloadable: bool,
}

impl TeraRenderer {
    /// Load every `.html` template under `dir`, recursively. Template
    /// names are paths relative to `dir`, and lookups get a `.html`
    /// suffix appended when missing.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let pattern = format!("{}/**/*.html", dir.display());
        let tera = Tera::new(&pattern).map_err(|source| Error::TemplateLoad {
            from: dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            tera: Arc::new(RwLock::new(tera)),
            suffix: ".html".to_string(),
            reloadable: true,
        })
    }

    /// Register in-memory `(name, content)` templates. Names are used
    /// exactly as given; no suffix is appended unless one is set with
    /// [`TeraRenderer::with_suffix`].
    pub fn from_templates(templates: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.to_vec())
            .map_err(|source| Error::TemplateLoad {
                from: "inline templates".to_string(),
                source,
            })?;
        Ok(Self {
            tera: Arc::new(RwLock::new(tera)),
            suffix: String::new(),
            reloadable: false,
        })
    }

    /// Suffix appended to template lookups that do not already carry it.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    fn qualified(&self, name: &str) -> String {
        if self.suffix.is_empty() || name.ends_with(self.suffix.as_str()) {
            name.to_string()
        } else {
            format!("{}{}", name, self.suffix)
        }
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, template_path: &str, context: &RenderContext) -> Result<String> {
        let name = self.qualified(template_path);
        let tera_context =
            tera::Context::from_serialize(context.vars()).map_err(|source| Error::Template {
                template: name.clone(),
                source,
            })?;
        let tera = self.tera.read().unwrap_or_else(|e| e.into_inner());
        tera.render(&name, &tera_context)
            .map_err(|source| Error::Template {
                template: name.clone(),
                source,
            })
    }

    fn is_initialized(&self) -> bool {
        // Construction loads the template set, so an instance is always
        // ready once it exists.
        true
    }

    fn clear_cache(&self) -> Result<()> {
        if !self.reloadable {
            // In-memory templates have no backing files to re-read.
            return Ok(());
        }
        let mut tera = self.tera.write().unwrap_or_else(|e| e.into_inner());
        tera.full_reload().map_err(Error::Reload)
    }
}
