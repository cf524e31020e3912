//! Fragment merging: splice rendered documents into one tree.
//!
//! The first fragment's tree is the accumulating base. Every later
//! fragment contributes the children of its `body` element, appended to
//! the base body in input order. A fragment (or the base) without a
//! `body` fails the whole merge, naming the template that produced it.

use crate::dom::HtmlDocument;
use crate::error::{Error, Result};

/// One rendered template, kept with the name of the template that
/// produced it so structural errors can point at the right source.
#[derive(Debug, Clone)]
pub struct RenderedFragment {
    pub html: String,
    pub template_name: String,
}

impl RenderedFragment {
    pub fn new(html: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            template_name: template_name.into(),
        }
    }
}

/// Merge rendered fragments into a single document.
///
/// A one-fragment sequence is returned as parsed, untouched. Nothing is
/// written on failure; the error names the template whose output lacked
/// a `body`.
pub fn merge_fragments(fragments: Vec<RenderedFragment>) -> Result<HtmlDocument> {
    let mut parts = fragments.into_iter();
    let first = parts.next().ok_or(Error::EmptyMerge)?;

    let base_template = first.template_name;
    let mut base = HtmlDocument::parse(&first.html);

    for fragment in parts {
        // The base is validated per step so the error points at the
        // document actually at fault.
        if base.body().is_none() {
            return Err(Error::MissingBody {
                template: base_template,
            });
        }
        let children = HtmlDocument::parse(&fragment.html)
            .into_body_children()
            .ok_or(Error::MissingBody {
                template: fragment.template_name,
            })?;
        if let Some(body) = base.body_mut() {
            body.children.extend(children);
        }
    }

    Ok(base)
}
