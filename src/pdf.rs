//! PDF output writer.

use std::io::Write;
use std::marker::PhantomData;

use crate::convert::{DocumentRenderer, RenderConfig};
use crate::doc::OutputDoc;
use crate::engine::{PdfEngine, PrintPdfEngine};
use crate::error::Result;
use crate::response::{ResponseFormat, ResponseSink, CONTENT_DISPOSITION};
use crate::template::TemplateRenderer;

/// Post-processing hook applied to rendered markup before PDF layout.
pub type ContentFormatter = Box<dyn Fn(String) -> String + Send + Sync>;

/// Writes a rendered document as an `application/pdf` response body,
/// driving a fresh engine per response.
pub struct PdfConverter<R: TemplateRenderer, E: PdfEngine + Default = PrintPdfEngine> {
    core: DocumentRenderer<R>,
    download: bool,
    content_formatter: Option<ContentFormatter>,
    engine: PhantomData<E>,
}

impl<R: TemplateRenderer> PdfConverter<R, PrintPdfEngine> {
    /// Converter backed by the printpdf engine.
    pub fn new(renderer: R, config: RenderConfig) -> Self {
        Self::with_engine(renderer, config)
    }
}

impl<R: TemplateRenderer, E: PdfEngine + Default> PdfConverter<R, E> {
    /// Converter backed by a caller-chosen engine type.
    pub fn with_engine(renderer: R, config: RenderConfig) -> Self {
        Self {
            core: DocumentRenderer::new(renderer, config),
            download: false,
            content_formatter: None,
            engine: PhantomData,
        }
    }

    /// Serve the PDF as an attachment named after the document's output
    /// name. Off by default; responses then render inline.
    pub fn with_download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    /// Post-process rendered markup before it reaches the engine. Applies
    /// to single documents only; merged documents are handed to the
    /// engine as a tree and bypass the formatter.
    pub fn with_content_formatter(
        mut self,
        formatter: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.content_formatter = Some(Box::new(formatter));
        self
    }

    /// Render `doc` and write it to `sink` as PDF bytes.
    pub fn write(&self, doc: &OutputDoc, sink: &mut dyn ResponseSink) -> Result<()> {
        log::info!("rendering pdf content: {}", doc.output_name());
        match doc {
            OutputDoc::Single(single) => {
                let content = self.format(self.core.render_single(single)?);
                self.write_pdf(sink, doc.output_name(), |engine| {
                    engine.set_document_from_string(&content)
                })
            }
            OutputDoc::Merged(merged) => {
                let document = self.core.render_merged(merged)?;
                self.write_pdf(sink, doc.output_name(), |engine| {
                    engine.set_document(&document, None)
                })
            }
        }
    }

    fn format(&self, content: String) -> String {
        match &self.content_formatter {
            Some(formatter) => formatter(content),
            None => content,
        }
    }

    fn write_pdf(
        &self,
        sink: &mut dyn ResponseSink,
        output_name: &str,
        set_document: impl FnOnce(&mut E) -> Result<()>,
    ) -> Result<()> {
        let headers = sink.headers_mut();
        headers.set_content_type(ResponseFormat::Pdf.content_type());
        if self.download && !output_name.is_empty() {
            headers.set(CONTENT_DISPOSITION, attachment_header(output_name));
        }
        let mut engine = E::default();
        if let Err(err) = run_engine(&mut engine, set_document, sink.body()) {
            log::error!("pdf document error: {err}");
            return Err(err);
        }
        Ok(())
    }
}

/// `attachment; filename="<name>.pdf"`, with embedded double quotes
/// replaced so the header value stays parseable.
fn attachment_header(output_name: &str) -> String {
    format!(
        "attachment; filename=\"{}.pdf\"",
        output_name.replace('"', "_")
    )
}

fn run_engine<E: PdfEngine>(
    engine: &mut E,
    set_document: impl FnOnce(&mut E) -> Result<()>,
    out: &mut dyn Write,
) -> Result<()> {
    set_document(engine)?;
    engine.layout()?;
    engine.create_pdf(out)?;
    engine.finish_pdf()
}
