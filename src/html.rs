//! HTML output writer.

use crate::convert::{DocumentRenderer, RenderConfig};
use crate::doc::OutputDoc;
use crate::error::Result;
use crate::response::{ResponseFormat, ResponseSink};
use crate::template::TemplateRenderer;

/// Writes a rendered document as a `text/html` response body.
pub struct HtmlConverter<R: TemplateRenderer> {
    core: DocumentRenderer<R>,
}

impl<R: TemplateRenderer> HtmlConverter<R> {
    pub fn new(renderer: R, config: RenderConfig) -> Self {
        Self {
            core: DocumentRenderer::new(renderer, config),
        }
    }

    /// Render `doc` and write it to `sink` as UTF-8 markup. Merged
    /// documents are spliced, then serialized back to markup.
    pub fn write(&self, doc: &OutputDoc, sink: &mut dyn ResponseSink) -> Result<()> {
        log::info!("rendering html content: {}", doc.output_name());
        let content = match doc {
            OutputDoc::Single(single) => self.core.render_single(single)?,
            OutputDoc::Merged(merged) => self.core.render_merged(merged)?.to_html(),
        };
        sink.headers_mut()
            .set_content_type(ResponseFormat::Html.content_type());
        let body = sink.body();
        body.write_all(content.as_bytes())?;
        body.flush()?;
        Ok(())
    }
}
