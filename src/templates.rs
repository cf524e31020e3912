//! Built-in demo templates and the sample documents that exercise them.
//!
//! The templates are Tera sources producing full XHTML pages; every page
//! carries a `body` so it can take part in merging. The sample data
//! builders mirror what an embedding application would hand the
//! converters: a record plus a context hook that adds display-ready
//! variables.

use serde::Serialize;
use serde_json::{json, Value};

use crate::doc::{MergedDoc, SingleDoc};
use crate::error::Result;
use crate::template::TeraRenderer;

/// Invoice page with a line-item table. Expects `invoice_number`,
/// `invoice_date`, `customer_name`, `customer_address`, `items`, and
/// `total_amount` in the context.
pub fn invoice_template() -> &'static str {
    r##"<html>
<head>
    <title>Invoice {{ invoice_number }}</title>
    <style>
        body { font-family: sans-serif; color: #1a202c; }
        th { text-align: left; background-color: #e2e8f0; padding: 6px; }
        td { padding: 6px; }
        .total { font-weight: bold; }
    </style>
</head>
<body>
    <h1>INVOICE</h1>
    <p>Number: {{ invoice_number }}</p>
    <p>Date: {{ invoice_date }}</p>
    <p>Billed to: {{ customer_name }}, {{ customer_address }}</p>
    <table>
        <tr>
            <th>Description</th>
            <th>Qty</th>
            <th>Unit price</th>
            <th>Amount</th>
        </tr>
        {% for item in items %}
        <tr>
            <td>{{ item.description }}</td>
            <td>{{ item.quantity }}</td>
            <td>{{ item.unit_price }}</td>
            <td>{{ item.total }}</td>
        </tr>
        {% endfor %}
    </table>
    <p class="total">Total: {{ total_amount }}</p>
</body>
</html>
"##
}

/// One report section: a numbered heading plus its content paragraph.
pub fn report_section_template() -> &'static str {
    r##"<html>
<head>
    <title>Section {{ section_number }}</title>
</head>
<body>
    <h2>Section {{ section_number }}: {{ title }}</h2>
    <p>{{ content }}</p>
</body>
</html>
"##
}

/// The built-in template set, keyed by the names the sample documents use.
pub fn builtin_templates() -> Vec<(&'static str, &'static str)> {
    vec![
        ("invoice.html", invoice_template()),
        ("report-section.html", report_section_template()),
    ]
}

/// Renderer preloaded with the built-in templates.
pub fn demo_renderer() -> Result<TeraRenderer> {
    Ok(TeraRenderer::from_templates(&builtin_templates())?.with_suffix(".html"))
}

/// Line item on an invoice.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    pub fn total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Invoice data as an embedding application would model it.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub invoice_date: String,
    pub customer_name: String,
    pub customer_address: String,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(InvoiceItem::total).sum()
    }

    /// Renderable document: the invoice as record, plus display-ready
    /// variables (formatted money fields) added by the context hook.
    pub fn into_doc(self) -> SingleDoc {
        let record = serde_json::to_value(&self).unwrap_or(Value::Null);
        let items: Vec<Value> = self
            .items
            .iter()
            .map(|item| {
                json!({
                    "description": item.description,
                    "quantity": item.quantity,
                    "unit_price": format!("{:.2}", item.unit_price),
                    "total": format!("{:.2}", item.total()),
                })
            })
            .collect();
        let total_amount = format!("{:.2}", self.total_amount());
        let output_name = format!("invoice-{}", self.invoice_number);
        SingleDoc::new("invoice", output_name)
            .record(record)
            .with_context(move |ctx| {
                ctx.insert("invoice_number", &self.invoice_number);
                ctx.insert("invoice_date", &self.invoice_date);
                ctx.insert("customer_name", &self.customer_name);
                ctx.insert("customer_address", &self.customer_address);
                ctx.insert_value("items", Value::Array(items.clone()));
                ctx.insert("total_amount", &total_amount);
            })
    }
}

/// One section of a multi-part report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub section_number: u32,
    pub title: String,
    pub content: String,
}

impl ReportSection {
    pub fn new(section_number: u32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            section_number,
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn into_doc(self) -> SingleDoc {
        let record = serde_json::to_value(&self).unwrap_or(Value::Null);
        let output_name = format!("section-{}", self.section_number);
        SingleDoc::new("report-section", output_name)
            .record(record)
            .with_context(move |ctx| {
                ctx.insert("section_number", &self.section_number);
                ctx.insert("title", &self.title);
                ctx.insert("content", &self.content);
            })
    }
}

/// Sample invoice used by the command-line demo and the end-to-end tests.
pub fn demo_invoice() -> Invoice {
    Invoice {
        invoice_number: "INV-2025-001".to_string(),
        invoice_date: "2025-11-18".to_string(),
        customer_name: "Acme Corporation".to_string(),
        customer_address: "123 Main Street, Springfield".to_string(),
        items: vec![
            InvoiceItem::new("Web Development Services", 40, 150.0),
            InvoiceItem::new("UI/UX Design", 20, 120.0),
            InvoiceItem::new("Cloud Hosting (Monthly)", 1, 500.0),
        ],
    }
}

/// Sample four-section report rendered as one merged document.
pub fn demo_report() -> MergedDoc {
    let sections = vec![
        ReportSection::new(
            1,
            "Introduction",
            "This report presents the findings of the annual review.",
        ),
        ReportSection::new(
            2,
            "Methodology",
            "Data was collected from all regional offices over twelve months.",
        ),
        ReportSection::new(
            3,
            "Results",
            "Performance improved across every tracked indicator.",
        ),
        ReportSection::new(
            4,
            "Conclusion",
            "The review recommends continuing the current programme.",
        ),
    ];
    let mut report = MergedDoc::new("annual-report", Vec::new());
    for section in sections {
        report.push(section.into_doc());
    }
    report
}
