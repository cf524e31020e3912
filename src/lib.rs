//! # pdf-press: templated documents to HTML or PDF responses
//!
//! This crate renders typed documents through server-side templates and
//! writes the result as an HTML or PDF response. The pipeline stages are:
//!
//! 1. **Model**: typed single and merged documents ([`doc`])
//! 2. **Render**: template evaluation via tera ([`template`], [`context`])
//! 3. **Merge**: body splicing for multi-part documents ([`merge`], [`dom`])
//! 4. **Write**: HTML or PDF output over a response sink ([`html`], [`pdf`],
//!    [`engine`], [`response`])
//!
//! [`Converters`] bundles the two writers behind one entry point keyed by
//! the negotiated response format.

pub mod context;
pub mod convert;
pub mod doc;
pub mod dom;
pub mod engine;
pub mod error;
pub mod html;
pub mod merge;
pub mod pdf;
pub mod response;
pub mod template;
pub mod templates;

// Re-exports for convenience
pub use convert::{Converters, DocumentRenderer, RenderConfig};
pub use doc::{ContextHook, MergedDoc, OutputDoc, SingleDoc};
pub use engine::{PdfEngine, PrintPdfEngine};
pub use error::{Error, Result};
pub use html::HtmlConverter;
pub use pdf::PdfConverter;
pub use response::{Headers, MemoryResponse, ResponseFormat, ResponseSink};
pub use template::{TemplateRenderer, TeraRenderer};
