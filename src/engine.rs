//! PDF engine seam: the rendering contract plus the printpdf backend.

use std::collections::BTreeMap;
use std::io::Write;

use printpdf::{GeneratePdfOptions, PdfDocument, PdfSaveOptions};

use crate::dom::HtmlDocument;
use crate::error::{Error, Result};

/// Contract the PDF writer drives, always in the same order: one
/// `set_document*` call, then [`PdfEngine::layout`],
/// [`PdfEngine::create_pdf`], [`PdfEngine::finish_pdf`].
pub trait PdfEngine {
    /// Load the document to render from a markup string.
    fn set_document_from_string(&mut self, html: &str) -> Result<()>;

    /// Load the document to render from an already-parsed tree.
    /// `base_url` is the resolution root for relative resources; engines
    /// without resource loading may ignore it.
    fn set_document(&mut self, document: &HtmlDocument, base_url: Option<&str>) -> Result<()>;

    /// Compute page layout for the loaded document.
    fn layout(&mut self) -> Result<()>;

    /// Write the laid-out pages to `out`.
    fn create_pdf(&mut self, out: &mut dyn Write) -> Result<()>;

    /// Finalize the output. No pages may be written afterwards.
    fn finish_pdf(&mut self) -> Result<()>;
}

/// printpdf-backed engine using its built-in HTML pipeline.
#[derive(Default)]
pub struct PrintPdfEngine {
    html: Option<String>,
    doc: Option<PdfDocument>,
    options: GeneratePdfOptions,
}

impl PrintPdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the page generation options used at layout time.
    pub fn with_options(mut self, options: GeneratePdfOptions) -> Self {
        self.options = options;
        self
    }
}

impl PdfEngine for PrintPdfEngine {
    fn set_document_from_string(&mut self, html: &str) -> Result<()> {
        self.html = Some(html.to_string());
        Ok(())
    }

    fn set_document(&mut self, document: &HtmlDocument, _base_url: Option<&str>) -> Result<()> {
        self.html = Some(document.to_html());
        Ok(())
    }

    fn layout(&mut self) -> Result<()> {
        let html = self
            .html
            .take()
            .ok_or_else(|| Error::Pdf("no document loaded before layout".to_string()))?;
        let mut warnings = Vec::new();
        // No extra images or fonts are embedded; templates carry their
        // styling inline.
        let doc = PdfDocument::from_html(
            &html,
            &BTreeMap::new(),
            &BTreeMap::new(),
            &self.options,
            &mut warnings,
        )
        .map_err(|e| Error::Pdf(e.to_string()))?;
        if !warnings.is_empty() {
            log::warn!("pdf layout produced {} warning(s)", warnings.len());
        }
        self.doc = Some(doc);
        Ok(())
    }

    fn create_pdf(&mut self, out: &mut dyn Write) -> Result<()> {
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| Error::Pdf("layout has not produced a document".to_string()))?;
        let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
        out.write_all(&bytes)?;
        Ok(())
    }

    fn finish_pdf(&mut self) -> Result<()> {
        self.html = None;
        self.doc = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pdf_bytes() {
        let mut engine = PrintPdfEngine::new();
        engine
            .set_document_from_string("<html><body><p>hello</p></body></html>")
            .unwrap();
        engine.layout().unwrap();
        let mut out = Vec::new();
        engine.create_pdf(&mut out).unwrap();
        engine.finish_pdf().unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn renders_parsed_tree() {
        let tree = HtmlDocument::parse("<html><body><h1>Title</h1></body></html>");
        let mut engine = PrintPdfEngine::new();
        engine.set_document(&tree, None).unwrap();
        engine.layout().unwrap();
        let mut out = Vec::new();
        engine.create_pdf(&mut out).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn renders_with_explicit_options() {
        let mut engine = PrintPdfEngine::new().with_options(GeneratePdfOptions::default());
        engine
            .set_document_from_string("<html><body><p>sized</p></body></html>")
            .unwrap();
        engine.layout().unwrap();
        let mut out = Vec::new();
        engine.create_pdf(&mut out).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn layout_without_document_fails() {
        let mut engine = PrintPdfEngine::new();
        assert!(matches!(engine.layout(), Err(Error::Pdf(_))));
    }

    #[test]
    fn create_pdf_without_layout_fails() {
        let mut engine = PrintPdfEngine::new();
        let mut out = Vec::new();
        assert!(matches!(
            engine.create_pdf(&mut out),
            Err(Error::Pdf(_))
        ));
    }
}
