//! press - command-line front end for the document converters.
//!
//! Usage:
//!   press <templates-dir> <template> <record.json> [output] [flags]
//!   press --demo [output-dir]
//!
//! The first form loads a template directory, renders one template with
//! the given JSON record as its data, and writes the response body to
//! `output` (default: `<template>.pdf`, or `.html` with `--html`). The
//! second form renders the built-in sample documents into `output-dir`.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use pdf_press::templates::{demo_invoice, demo_renderer, demo_report};
use pdf_press::{
    Converters, HtmlConverter, MemoryResponse, OutputDoc, PdfConverter, RenderConfig,
    ResponseFormat, SingleDoc, TeraRenderer,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut demo = false;
    let mut html = false;
    let mut reload = false;
    let mut download = false;
    let mut name: Option<String> = None;
    let mut prefix = String::new();
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--demo" => demo = true,
            "--html" => html = true,
            "--reload" | "-r" => reload = true,
            "--download" | "-d" => download = true,
            "--name" | "-n" => name = iter.next().cloned(),
            "--prefix" | "-p" => prefix = iter.next().cloned().unwrap_or_default(),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            value => positional.push(value.to_string()),
        }
    }

    if demo {
        let out_dir = positional
            .first()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        if let Err(e) = run_demo(&out_dir) {
            eprintln!("Error rendering demo documents: {e}");
            process::exit(1);
        }
        return;
    }

    if positional.len() < 3 || positional.len() > 4 {
        eprintln!("Error: expected <templates-dir> <template> <record.json> [output].");
        print_usage(&args[0]);
        process::exit(1);
    }

    let templates_dir = PathBuf::from(&positional[0]);
    let template = positional[1].clone();
    let record_path = PathBuf::from(&positional[2]);

    let format = if html {
        ResponseFormat::Html
    } else {
        ResponseFormat::Pdf
    };
    let output = positional.get(3).map(PathBuf::from).unwrap_or_else(|| {
        let ext = if html { "html" } else { "pdf" };
        PathBuf::from(format!("{template}.{ext}"))
    });

    let raw = match fs::read_to_string(&record_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", record_path.display());
            process::exit(1);
        }
    };
    let record: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", record_path.display());
            process::exit(1);
        }
    };

    let config = RenderConfig {
        path_prefix: prefix,
        always_reload: reload,
    };
    let output_name = name.unwrap_or_else(|| template.clone());
    let doc: OutputDoc = SingleDoc::new(template.as_str(), output_name)
        .record(record)
        .into();

    if let Err(e) = run_convert(&templates_dir, &doc, &output, format, config, download) {
        eprintln!("Error rendering '{template}': {e}");
        process::exit(1);
    }
}

fn run_convert(
    templates_dir: &Path,
    doc: &OutputDoc,
    output: &Path,
    format: ResponseFormat,
    config: RenderConfig,
    download: bool,
) -> pdf_press::Result<()> {
    let renderer = TeraRenderer::from_dir(templates_dir)?;
    let converters = Converters::new(
        HtmlConverter::new(renderer.clone(), config.clone()),
        PdfConverter::new(renderer, config).with_download(download),
    );

    let mut sink = MemoryResponse::new();
    converters.write_response(doc, format, &mut sink)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, &sink.body)?;
    report_written(output, &sink);
    Ok(())
}

fn run_demo(out_dir: &Path) -> pdf_press::Result<()> {
    fs::create_dir_all(out_dir)?;
    let renderer = demo_renderer()?;
    let converters = Converters::from_renderer(renderer, RenderConfig::default());

    let invoice: OutputDoc = demo_invoice().into_doc().into();
    let report: OutputDoc = demo_report().into();

    for (file, doc, format) in [
        ("invoice.pdf", &invoice, ResponseFormat::Pdf),
        ("invoice.html", &invoice, ResponseFormat::Html),
        ("annual-report.pdf", &report, ResponseFormat::Pdf),
    ] {
        let mut sink = MemoryResponse::new();
        converters.write_response(doc, format, &mut sink)?;
        let path = out_dir.join(file);
        fs::write(&path, &sink.body)?;
        report_written(&path, &sink);
    }
    Ok(())
}

fn report_written(path: &Path, sink: &MemoryResponse) {
    eprintln!("Wrote '{}' ({} bytes)", path.display(), sink.body.len());
    for (name, value) in sink.headers.iter() {
        eprintln!("  {name}: {value}");
    }
}

fn print_usage(prog: &str) {
    eprintln!("press - templated documents to HTML or PDF (pdf-press)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <templates-dir> <template> <record.json> [output] [flags]");
    eprintln!("  {prog} --demo [output-dir]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <templates-dir>  Directory of .html Tera templates");
    eprintln!("  <template>       Template name to render (without suffix)");
    eprintln!("  <record.json>    JSON record exposed to the template as 'record'");
    eprintln!("  [output]         Output path (default: <template>.pdf, or .html with --html)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --html           Write rendered HTML instead of PDF");
    eprintln!("  --name, -n       Output name for download headers (default: template name)");
    eprintln!("  --prefix, -p     Prefix prepended to template lookups");
    eprintln!("  --reload, -r     Clear the template cache before each render");
    eprintln!("  --download, -d   Add a Content-Disposition attachment header");
    eprintln!("  --demo           Render the built-in sample documents");
    eprintln!("  --help, -h       Print this message");
}
