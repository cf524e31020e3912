//! Converter core: turns documents into markup and dispatches them to an
//! output writer.
//!
//! [`DocumentRenderer`] owns the template engine plus the shared render
//! settings and produces markup for single and merged documents.
//! [`Converters`] bundles the HTML and PDF writers behind one entry point
//! keyed by the negotiated response format.

use crate::context::RenderContext;
use crate::doc::{MergedDoc, OutputDoc, SingleDoc};
use crate::dom::HtmlDocument;
use crate::engine::{PdfEngine, PrintPdfEngine};
use crate::error::{Error, Result};
use crate::html::HtmlConverter;
use crate::merge::{merge_fragments, RenderedFragment};
use crate::pdf::PdfConverter;
use crate::response::{ResponseFormat, ResponseSink};
use crate::template::TemplateRenderer;

/// Settings shared by both output writers.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Prepended to every template name before lookup.
    pub path_prefix: String,
    /// Clear the engine's template cache before each render. Development
    /// setting; lets template edits show up without a restart.
    pub always_reload: bool,
}

/// Renders documents to markup through a [`TemplateRenderer`].
pub struct DocumentRenderer<R: TemplateRenderer> {
    renderer: R,
    config: RenderConfig,
}

impl<R: TemplateRenderer> DocumentRenderer<R> {
    pub fn new(renderer: R, config: RenderConfig) -> Self {
        Self { renderer, config }
    }

    /// Render one document: seed the context with its record, run its
    /// context hook, then evaluate the prefixed template.
    pub fn render_single(&self, doc: &SingleDoc) -> Result<String> {
        let mut context = RenderContext::for_record(doc.record_value().clone());
        if let Some(hook) = doc.context_hook() {
            hook(&mut context);
        }
        if self.renderer.is_initialized() && self.config.always_reload {
            self.renderer.clear_cache()?;
        }
        let path = format!("{}{}", self.config.path_prefix, doc.template_name());
        self.renderer.render(&path, &context)
    }

    /// Render every part of a merged document and splice the results into
    /// one tree. Parts must be single documents; nesting is rejected.
    pub fn render_merged(&self, doc: &MergedDoc) -> Result<HtmlDocument> {
        if doc.parts().is_empty() {
            return Err(Error::EmptyMerge);
        }
        let mut fragments = Vec::with_capacity(doc.parts().len());
        for part in doc.parts() {
            match part {
                OutputDoc::Single(single) => {
                    let html = self.render_single(single)?;
                    fragments.push(RenderedFragment::new(html, single.template_name()));
                }
                OutputDoc::Merged(nested) => {
                    return Err(Error::NestedMerge {
                        output_name: nested.output_name().to_string(),
                    });
                }
            }
        }
        merge_fragments(fragments)
    }
}

/// The HTML and PDF writers over one template engine, dispatched by
/// negotiated response format.
pub struct Converters<R: TemplateRenderer, E: PdfEngine + Default> {
    html: HtmlConverter<R>,
    pdf: PdfConverter<R, E>,
}

impl<R: TemplateRenderer + Clone> Converters<R, PrintPdfEngine> {
    /// Both writers over clones of `renderer`, backed by the printpdf
    /// engine.
    pub fn from_renderer(renderer: R, config: RenderConfig) -> Self {
        Self {
            html: HtmlConverter::new(renderer.clone(), config.clone()),
            pdf: PdfConverter::new(renderer, config),
        }
    }
}

impl<R: TemplateRenderer, E: PdfEngine + Default> Converters<R, E> {
    pub fn new(html: HtmlConverter<R>, pdf: PdfConverter<R, E>) -> Self {
        Self { html, pdf }
    }

    pub fn html(&self) -> &HtmlConverter<R> {
        &self.html
    }

    pub fn pdf(&self) -> &PdfConverter<R, E> {
        &self.pdf
    }

    /// Write `doc` to `sink` in the requested format.
    pub fn write_response(
        &self,
        doc: &OutputDoc,
        format: ResponseFormat,
        sink: &mut dyn ResponseSink,
    ) -> Result<()> {
        match format {
            ResponseFormat::Html => self.html.write(doc, sink),
            ResponseFormat::Pdf => self.pdf.write(doc, sink),
        }
    }
}
