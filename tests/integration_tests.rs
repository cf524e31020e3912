//! Integration tests for the response converter pipeline.
//!
//! These tests validate:
//! - Single documents render end to end as HTML and PDF responses
//! - Merged documents splice their parts in input order
//! - Cache reloads, download headers, and content formatting behave
//! - Structural errors fail the response without writing a body

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use pdf_press::context::RenderContext;
use pdf_press::dom::HtmlDocument;
use pdf_press::templates::{demo_invoice, demo_renderer, demo_report, ReportSection};
use pdf_press::{
    Converters, Error, HtmlConverter, MemoryResponse, MergedDoc, OutputDoc, PdfConverter,
    PdfEngine, RenderConfig, ResponseFormat, SingleDoc, TemplateRenderer, TeraRenderer,
};

// =====================================================================
// Helpers
// =====================================================================

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0usize;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(pos) => from += pos + needle.len(),
            None => panic!("'{needle}' missing or out of order in:\n{haystack}"),
        }
    }
}

/// Engine that emits the markup it was given, so tests can assert on what
/// actually reached the PDF stage.
#[derive(Default)]
struct HtmlEchoEngine {
    content: Option<String>,
}

impl PdfEngine for HtmlEchoEngine {
    fn set_document_from_string(&mut self, html: &str) -> pdf_press::Result<()> {
        self.content = Some(html.to_string());
        Ok(())
    }

    fn set_document(
        &mut self,
        document: &HtmlDocument,
        _base_url: Option<&str>,
    ) -> pdf_press::Result<()> {
        self.content = Some(document.to_html());
        Ok(())
    }

    fn layout(&mut self) -> pdf_press::Result<()> {
        Ok(())
    }

    fn create_pdf(&mut self, out: &mut dyn Write) -> pdf_press::Result<()> {
        let content = self.content.take().unwrap_or_default();
        out.write_all(content.as_bytes())?;
        Ok(())
    }

    fn finish_pdf(&mut self) -> pdf_press::Result<()> {
        Ok(())
    }
}

/// Engine whose layout step always fails.
#[derive(Default)]
struct FailingEngine;

impl PdfEngine for FailingEngine {
    fn set_document_from_string(&mut self, _html: &str) -> pdf_press::Result<()> {
        Ok(())
    }

    fn set_document(
        &mut self,
        _document: &HtmlDocument,
        _base_url: Option<&str>,
    ) -> pdf_press::Result<()> {
        Ok(())
    }

    fn layout(&mut self) -> pdf_press::Result<()> {
        Err(Error::Pdf("layout failure".to_string()))
    }

    fn create_pdf(&mut self, _out: &mut dyn Write) -> pdf_press::Result<()> {
        Ok(())
    }

    fn finish_pdf(&mut self) -> pdf_press::Result<()> {
        Ok(())
    }
}

/// Renderer that counts collaborator calls. Clones share the counters.
#[derive(Clone)]
struct CountingRenderer {
    initialized: bool,
    renders: Arc<AtomicUsize>,
    clears: Arc<AtomicUsize>,
}

impl CountingRenderer {
    fn new(initialized: bool) -> Self {
        Self {
            initialized,
            renders: Arc::new(AtomicUsize::new(0)),
            clears: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TemplateRenderer for CountingRenderer {
    fn render(&self, template_path: &str, _context: &RenderContext) -> pdf_press::Result<String> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(format!("<html><body><p>{template_path}</p></body></html>"))
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn clear_cache(&self) -> pdf_press::Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Renderer serving canned markup per template path.
#[derive(Clone, Default)]
struct StaticRenderer {
    templates: HashMap<String, String>,
}

impl StaticRenderer {
    fn with(mut self, name: &str, html: &str) -> Self {
        self.templates.insert(name.to_string(), html.to_string());
        self
    }
}

impl TemplateRenderer for StaticRenderer {
    fn render(&self, template_path: &str, _context: &RenderContext) -> pdf_press::Result<String> {
        self.templates
            .get(template_path)
            .cloned()
            .ok_or_else(|| Error::template(template_path, "template not found"))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn clear_cache(&self) -> pdf_press::Result<()> {
        Ok(())
    }
}

// =====================================================================
// Single documents: HTML responses
// =====================================================================

#[test]
fn invoice_renders_as_html_response() {
    let converter = HtmlConverter::new(demo_renderer().unwrap(), RenderConfig::default());
    let doc: OutputDoc = demo_invoice().into_doc().into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(sink.headers.content_type(), Some("text/html"));
    let text = HtmlDocument::parse(&sink.body_text()).text();
    for needle in [
        "INVOICE",
        "INV-2025-001",
        "Acme Corporation",
        "Web Development Services",
        "UI/UX Design",
        "Cloud Hosting (Monthly)",
        "8900.00",
    ] {
        assert!(text.contains(needle), "missing '{needle}' in:\n{text}");
    }
}

#[test]
fn rendered_body_matches_template_content() {
    let renderer = TeraRenderer::from_templates(&[(
        "hello",
        "<html><body><p>Hello {{ record.name }}!</p></body></html>",
    )])
    .unwrap();
    let converter = HtmlConverter::new(renderer, RenderConfig::default());
    let doc: OutputDoc = SingleDoc::new("hello", "hi")
        .record(json!({"name": "World"}))
        .into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    let rendered = HtmlDocument::parse(&sink.body_text());
    assert_eq!(rendered.body().unwrap().text(), "Hello World!");
}

#[test]
fn template_errors_fail_the_response() {
    let converter = HtmlConverter::new(demo_renderer().unwrap(), RenderConfig::default());
    let doc: OutputDoc = SingleDoc::new("missing", "x").into();
    let mut sink = MemoryResponse::new();
    let err = converter.write(&doc, &mut sink).unwrap_err();

    assert!(matches!(err, Error::Template { template, .. } if template == "missing.html"));
    assert!(sink.body.is_empty(), "failed render must not write a body");
    assert!(sink.headers.is_empty(), "failed render must not set headers");
}

// =====================================================================
// Single documents: PDF responses
// =====================================================================

#[test]
fn invoice_renders_as_pdf_response() {
    let converter = PdfConverter::new(demo_renderer().unwrap(), RenderConfig::default());
    let doc: OutputDoc = demo_invoice().into_doc().into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(sink.headers.content_type(), Some("application/pdf"));
    assert_valid_pdf(&sink.body);
}

#[test]
fn pdf_stage_receives_rendered_content() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        demo_renderer().unwrap(),
        RenderConfig::default(),
    );
    let doc: OutputDoc = demo_invoice().into_doc().into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(sink.headers.content_type(), Some("application/pdf"));
    let text = HtmlDocument::parse(&sink.body_text()).text();
    assert!(text.contains("8900.00"));
    assert!(text.contains("Acme Corporation"));
}

#[test]
fn engine_failure_propagates() {
    let converter = PdfConverter::<_, FailingEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    );
    let doc: OutputDoc = SingleDoc::new("page", "page-1").into();
    let mut sink = MemoryResponse::new();
    let err = converter.write(&doc, &mut sink).unwrap_err();

    assert!(matches!(err, Error::Pdf(message) if message.contains("layout failure")));
    assert!(sink.body.is_empty());
}

// =====================================================================
// Merged documents
// =====================================================================

#[test]
fn report_sections_merge_in_order_as_html() {
    let converter = HtmlConverter::new(demo_renderer().unwrap(), RenderConfig::default());
    let doc: OutputDoc = demo_report().into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    let html = sink.body_text();
    let merged = HtmlDocument::parse(&html);
    let body = merged.body().unwrap();
    // Each section contributes a heading and a paragraph.
    assert_eq!(body.children.len(), 8);
    assert_in_order(
        &body.text(),
        &[
            "Section 1",
            "Introduction",
            "Section 2",
            "Methodology",
            "Section 3",
            "Results",
            "Section 4",
            "Conclusion",
        ],
    );
    // Only the first part's head survives.
    assert!(html.contains("<title>Section 1</title>"));
    assert!(!html.contains("<title>Section 2</title>"));
}

#[test]
fn report_sections_merge_in_order_as_pdf_content() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        demo_renderer().unwrap(),
        RenderConfig::default(),
    );
    let doc: OutputDoc = demo_report().into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    let text = HtmlDocument::parse(&sink.body_text()).text();
    assert_in_order(
        &text,
        &["Introduction", "Methodology", "Results", "Conclusion"],
    );
}

#[test]
fn merged_report_renders_as_pdf() {
    let converter = PdfConverter::new(demo_renderer().unwrap(), RenderConfig::default());
    let doc: OutputDoc = demo_report().into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(sink.headers.content_type(), Some("application/pdf"));
    assert_valid_pdf(&sink.body);
}

#[test]
fn single_part_merge_is_a_noop() {
    let converter = HtmlConverter::new(demo_renderer().unwrap(), RenderConfig::default());
    let section = || ReportSection::new(9, "Solo", "The only part.");

    let mut single_sink = MemoryResponse::new();
    converter
        .write(&section().into_doc().into(), &mut single_sink)
        .unwrap();

    let merged: OutputDoc =
        MergedDoc::new("solo", vec![section().into_doc().into()]).into();
    let mut merged_sink = MemoryResponse::new();
    converter.write(&merged, &mut merged_sink).unwrap();

    let single_body = HtmlDocument::parse(&single_sink.body_text());
    let merged_body = HtmlDocument::parse(&merged_sink.body_text());
    assert_eq!(
        single_body.body().unwrap(),
        merged_body.body().unwrap()
    );
}

#[test]
fn merged_part_without_body_fails_and_writes_nothing() {
    let renderer = StaticRenderer::default()
        .with("good", "<html><body><p>fine</p></body></html>")
        .with("broken", "<html><div>not wrapped</div></html>");
    let converter = HtmlConverter::new(renderer, RenderConfig::default());
    let doc: OutputDoc = MergedDoc::new(
        "mix",
        vec![
            SingleDoc::new("good", "g").into(),
            SingleDoc::new("broken", "b").into(),
        ],
    )
    .into();

    let mut sink = MemoryResponse::new();
    let err = converter.write(&doc, &mut sink).unwrap_err();
    assert!(matches!(err, Error::MissingBody { template } if template == "broken"));
    assert!(sink.body.is_empty());
}

#[test]
fn base_without_body_names_the_first_template() {
    let renderer = StaticRenderer::default()
        .with("good", "<html><body><p>fine</p></body></html>")
        .with("broken", "<html><div>not wrapped</div></html>");
    let converter = HtmlConverter::new(renderer, RenderConfig::default());
    let doc: OutputDoc = MergedDoc::new(
        "mix",
        vec![
            SingleDoc::new("broken", "b").into(),
            SingleDoc::new("good", "g").into(),
        ],
    )
    .into();

    let mut sink = MemoryResponse::new();
    let err = converter.write(&doc, &mut sink).unwrap_err();
    assert!(matches!(err, Error::MissingBody { template } if template == "broken"));
}

#[test]
fn empty_merge_is_rejected() {
    let converter = HtmlConverter::new(CountingRenderer::new(true), RenderConfig::default());
    let doc: OutputDoc = MergedDoc::new("none", Vec::new()).into();
    let mut sink = MemoryResponse::new();
    assert!(matches!(
        converter.write(&doc, &mut sink).unwrap_err(),
        Error::EmptyMerge
    ));
}

#[test]
fn nested_merge_is_rejected() {
    let converter = HtmlConverter::new(CountingRenderer::new(true), RenderConfig::default());
    let inner = MergedDoc::new("inner", vec![SingleDoc::new("a", "a").into()]);
    let doc: OutputDoc = MergedDoc::new("outer", vec![inner.into()]).into();
    let mut sink = MemoryResponse::new();
    let err = converter.write(&doc, &mut sink).unwrap_err();
    assert!(matches!(err, Error::NestedMerge { output_name } if output_name == "inner"));
}

// =====================================================================
// Cache reload behaviour
// =====================================================================

#[test]
fn always_reload_clears_cache_once_per_render() {
    let renderer = CountingRenderer::new(true);
    let converter = HtmlConverter::new(
        renderer.clone(),
        RenderConfig {
            path_prefix: String::new(),
            always_reload: true,
        },
    );
    let doc: OutputDoc = SingleDoc::new("page", "p").into();

    for _ in 0..2 {
        let mut sink = MemoryResponse::new();
        converter.write(&doc, &mut sink).unwrap();
    }
    assert_eq!(renderer.clears.load(Ordering::SeqCst), 2);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);
}

#[test]
fn reload_skipped_when_disabled() {
    let renderer = CountingRenderer::new(true);
    let converter = HtmlConverter::new(renderer.clone(), RenderConfig::default());
    let doc: OutputDoc = SingleDoc::new("page", "p").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(renderer.clears.load(Ordering::SeqCst), 0);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
}

#[test]
fn reload_skipped_when_renderer_not_initialized() {
    let renderer = CountingRenderer::new(false);
    let converter = HtmlConverter::new(
        renderer.clone(),
        RenderConfig {
            path_prefix: String::new(),
            always_reload: true,
        },
    );
    let doc: OutputDoc = SingleDoc::new("page", "p").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(renderer.clears.load(Ordering::SeqCst), 0);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
}

#[test]
fn merged_parts_clear_cache_per_part() {
    let renderer = CountingRenderer::new(true);
    let converter = HtmlConverter::new(
        renderer.clone(),
        RenderConfig {
            path_prefix: String::new(),
            always_reload: true,
        },
    );
    let doc: OutputDoc = MergedDoc::new(
        "all",
        vec![
            SingleDoc::new("a", "a").into(),
            SingleDoc::new("b", "b").into(),
            SingleDoc::new("c", "c").into(),
        ],
    )
    .into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(renderer.clears.load(Ordering::SeqCst), 3);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 3);
}

// =====================================================================
// Download headers
// =====================================================================

#[test]
fn download_disabled_by_default() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    );
    let doc: OutputDoc = SingleDoc::new("page", "doc-1").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(sink.headers.get("Content-Disposition"), None);
}

#[test]
fn download_sets_attachment_header() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    )
    .with_download(true);
    let doc: OutputDoc = SingleDoc::new("page", "doc-1").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(
        sink.headers.get("Content-Disposition"),
        Some("attachment; filename=\"doc-1.pdf\"")
    );
}

#[test]
fn download_replaces_quotes_in_filename() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    )
    .with_download(true);
    let doc: OutputDoc = SingleDoc::new("page", "report \"q3\"").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(
        sink.headers.get("Content-Disposition"),
        Some("attachment; filename=\"report _q3_.pdf\"")
    );
}

#[test]
fn download_skipped_for_empty_output_name() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    )
    .with_download(true);
    let doc: OutputDoc = SingleDoc::new("page", "").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert_eq!(sink.headers.get("Content-Disposition"), None);
}

// =====================================================================
// Content formatter
// =====================================================================

#[test]
fn formatter_applies_to_single_documents() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    )
    .with_content_formatter(|html| html.replace("</body>", "<p>stamped</p></body>"));
    let doc: OutputDoc = SingleDoc::new("page", "p").into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert!(sink.body_text().contains("stamped"));
}

#[test]
fn formatter_skipped_for_merged_documents() {
    let converter = PdfConverter::<_, HtmlEchoEngine>::with_engine(
        CountingRenderer::new(true),
        RenderConfig::default(),
    )
    .with_content_formatter(|html| html.replace("</body>", "<p>stamped</p></body>"));
    let doc: OutputDoc = MergedDoc::new(
        "all",
        vec![
            SingleDoc::new("a", "a").into(),
            SingleDoc::new("b", "b").into(),
        ],
    )
    .into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    let text = sink.body_text();
    assert!(!text.contains("stamped"));
    assert_in_order(&text, &["<p>a</p>", "<p>b</p>"]);
}

// =====================================================================
// Format dispatch and directory templates
// =====================================================================

#[test]
fn converters_dispatch_by_negotiated_format() {
    let converters =
        Converters::from_renderer(demo_renderer().unwrap(), RenderConfig::default());
    let doc: OutputDoc = demo_invoice().into_doc().into();

    let mut html_sink = MemoryResponse::new();
    converters
        .write_response(&doc, ResponseFormat::Html, &mut html_sink)
        .unwrap();
    assert_eq!(html_sink.headers.content_type(), Some("text/html"));
    assert!(html_sink.body_text().contains("INVOICE"));

    let mut pdf_sink = MemoryResponse::new();
    converters
        .write_response(&doc, ResponseFormat::Pdf, &mut pdf_sink)
        .unwrap();
    assert_eq!(pdf_sink.headers.content_type(), Some("application/pdf"));
    assert_valid_pdf(&pdf_sink.body);
}

#[test]
fn directory_templates_resolve_with_prefix() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("letters")).unwrap();
    std::fs::write(
        dir.path().join("letters/notice.html"),
        "<html><body><p>{{ record.msg }}</p></body></html>",
    )
    .unwrap();

    let renderer = TeraRenderer::from_dir(dir.path()).unwrap();
    let converter = HtmlConverter::new(
        renderer,
        RenderConfig {
            path_prefix: "letters/".to_string(),
            always_reload: false,
        },
    );
    let doc: OutputDoc = SingleDoc::new("notice", "n")
        .record(json!({"msg": "delivered"}))
        .into();
    let mut sink = MemoryResponse::new();
    converter.write(&doc, &mut sink).unwrap();

    assert!(sink.body_text().contains("delivered"));
}
