//! The document model: what callers hand to the converters.
//!
//! A renderable document is either a [`SingleDoc`] (one template plus the
//! record it renders) or a [`MergedDoc`] (a named sequence of parts whose
//! rendered bodies are spliced into one output). The two cases are a tagged
//! enum so converter dispatch is a `match`, not a runtime type check.

use serde_json::Value;

use crate::context::RenderContext;

/// Hook that lets a document add extra variables to its render context
/// after the record has been seeded.
pub type ContextHook = Box<dyn Fn(&mut RenderContext) + Send + Sync>;

/// One template evaluation: the template to use, the data record to expose,
/// and the name the output travels under.
pub struct SingleDoc {
    template_name: String,
    output_name: String,
    record: Value,
    context_hook: Option<ContextHook>,
}

impl SingleDoc {
    /// A document with a `null` record. Attach data with
    /// [`SingleDoc::record`] and [`SingleDoc::with_context`].
    pub fn new(template_name: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            output_name: output_name.into(),
            record: Value::Null,
            context_hook: None,
        }
    }

    /// Set the data record exposed to the template under the reserved
    /// context key.
    pub fn record(mut self, record: Value) -> Self {
        self.record = record;
        self
    }

    /// Attach a hook that runs against the context after the record has
    /// been seeded. Hook writes win over the seeded key.
    pub fn with_context(mut self, hook: impl Fn(&mut RenderContext) + Send + Sync + 'static) -> Self {
        self.context_hook = Some(Box::new(hook));
        self
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn record_value(&self) -> &Value {
        &self.record
    }

    pub(crate) fn context_hook(&self) -> Option<&ContextHook> {
        self.context_hook.as_ref()
    }
}

/// A named sequence of documents rendered separately and merged into one
/// output, body contents appended in part order.
pub struct MergedDoc {
    output_name: String,
    parts: Vec<OutputDoc>,
}

impl MergedDoc {
    pub fn new(output_name: impl Into<String>, parts: Vec<OutputDoc>) -> Self {
        Self {
            output_name: output_name.into(),
            parts,
        }
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn parts(&self) -> &[OutputDoc] {
        &self.parts
    }

    pub fn push(&mut self, part: impl Into<OutputDoc>) {
        self.parts.push(part.into());
    }
}

/// A renderable document, ready for either output format.
pub enum OutputDoc {
    Single(SingleDoc),
    Merged(MergedDoc),
}

impl OutputDoc {
    /// The name the output travels under, used for download file names
    /// and log lines.
    pub fn output_name(&self) -> &str {
        match self {
            OutputDoc::Single(doc) => doc.output_name(),
            OutputDoc::Merged(doc) => doc.output_name(),
        }
    }
}

impl From<SingleDoc> for OutputDoc {
    fn from(doc: SingleDoc) -> Self {
        OutputDoc::Single(doc)
    }
}

impl From<MergedDoc> for OutputDoc {
    fn from(doc: MergedDoc) -> Self {
        OutputDoc::Merged(doc)
    }
}
