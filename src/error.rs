//! Error taxonomy for the converter pipeline.
//!
//! Every fallible stage funnels into [`Error`]: template resolution and
//! evaluation, merge structure checks, the PDF engine, and response I/O.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A template set could not be loaded into the engine.
    #[error("failed to load templates from {from}: {source}")]
    TemplateLoad {
        from: String,
        #[source]
        source: tera::Error,
    },

    /// A template identifier did not resolve, or evaluation failed.
    #[error("template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// The template cache could not be cleared and reloaded.
    #[error("template cache reload failed: {0}")]
    Reload(#[source] tera::Error),

    /// A document taking part in a merge has no `body` element.
    #[error("no 'body' element in output of template '{template}'")]
    MissingBody { template: String },

    /// A merged document with no parts cannot produce output.
    #[error("cannot merge an empty document sequence")]
    EmptyMerge,

    /// Merging is single-level; a merged document cannot contain another.
    #[error("merged document '{output_name}' contains a nested merged part")]
    NestedMerge { output_name: String },

    /// The PDF engine rejected the document.
    #[error("pdf engine error: {0}")]
    Pdf(String),

    /// Writing the response body failed.
    #[error("response write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Template failure carrying a plain message, for renderer
    /// implementations that are not tera-backed.
    pub fn template(template: impl Into<String>, message: impl ToString) -> Self {
        Error::Template {
            template: template.into(),
            source: tera::Error::msg(message),
        }
    }
}
