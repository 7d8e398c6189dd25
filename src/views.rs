//! Server-rendered HTML pages
//!
//! Plain string building around one shared layout. Anything that came from
//! a user or a file goes through `escape`.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::models::{DetectionOutcome, Label, StoredFile, DETECTION_FIELDS};

fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Dataset,
    Detect,
}

const NAV: [(Page, &str, &str); 4] = [
    (Page::Home, "/", "Home"),
    (Page::About, "/about", "About"),
    (Page::Dataset, "/dataset", "Dataset"),
    (Page::Detect, "/detect", "Detect"),
];

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2933; background: #f5f7fa; }
nav { background: #102a43; padding: 0.75rem 2rem; }
nav a { color: #d9e2ec; margin-right: 1.5rem; text-decoration: none; }
nav a.active { color: #fff; font-weight: 600; }
main { max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
.data-table { border-collapse: collapse; width: 100%; background: #fff; }
.data-table th, .data-table td { border: 1px solid #d9e2ec; padding: 0.35rem 0.6rem; text-align: left; }
.error { color: #ab091e; }
.result-anomaly { color: #ab091e; font-weight: 600; }
.result-normal { color: #0e7c3a; font-weight: 600; }
form.inline { display: inline; }
"#;

fn layout(title: &str, active: Page, body: &str) -> String {
    let mut nav = String::new();
    for (page, href, label) in NAV {
        let class = if page == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{}\"{}>{}</a>", href, class, label);
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} · FlowGuard</title>\n<style>{}</style>\n</head>\n<body>\n\
         <nav>{}</nav>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        STYLE,
        nav,
        body
    )
}

pub fn index_page() -> String {
    layout(
        "Home",
        Page::Home,
        "<h1>FlowGuard</h1>\n\
         <p>Upload network-flow datasets, preview them, and check single flow \
         records against a trained anomaly-detection model.</p>\n\
         <p><a href=\"/dataset\">Manage datasets</a> · <a href=\"/detect\">Run a detection</a></p>",
    )
}

pub fn about_page() -> String {
    layout(
        "About",
        Page::About,
        "<h1>About</h1>\n\
         <p>FlowGuard classifies one network flow at a time as <em>anomaly</em> or \
         <em>normal traffic</em> using a pre-trained model loaded at start-up.</p>\n\
         <p>Datasets in CSV or XLSX format can be uploaded for inspection; the first \
         rows of the selected file are shown as a table.</p>",
    )
}

/// What sits in the preview area of the dataset page
#[derive(Debug, Clone, PartialEq)]
pub enum TableContent {
    Table(String),
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct DatasetView {
    pub files: Vec<StoredFile>,
    /// File the preview was resolved to
    pub filename: Option<String>,
    /// File bound to the session (download target)
    pub bound_file: Option<String>,
    pub table: Option<TableContent>,
}

pub fn dataset_page(view: &DatasetView) -> String {
    let mut body = String::from(
        "<h1>Dataset</h1>\n\
         <form method=\"post\" action=\"/dataset\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\".csv,.xlsx\" required>\n\
         <button type=\"submit\">Upload</button>\n</form>\n",
    );

    body.push_str("<h2>Stored files</h2>\n");
    if view.files.is_empty() {
        body.push_str("<p>No files uploaded yet.</p>\n");
    } else {
        body.push_str("<ul class=\"files\">\n");
        for file in &view.files {
            let encoded = urlencoding::encode(&file.name);
            let details = match file.display_modified() {
                Some(modified) => format!("{}, {}", file.display_size(), modified),
                None => file.display_size(),
            };
            let _ = writeln!(
                body,
                "<li><a href=\"/dataset?preview={enc}\">{name}</a> ({details}) \
                 <a href=\"/uploads/{enc}\">raw</a> \
                 <form class=\"inline\" method=\"post\" action=\"/delete/{enc}\">\
                 <button type=\"submit\">Delete</button></form></li>",
                enc = encoded,
                name = escape(&file.name),
                details = details,
            );
        }
        body.push_str("</ul>\n");
        body.push_str(
            "<form method=\"post\" action=\"/delete_all\">\
             <button type=\"submit\">Delete all</button></form>\n",
        );
    }

    if let Some(bound) = &view.bound_file {
        let _ = writeln!(
            body,
            "<p>Current file: <strong>{}</strong> · <a href=\"/download\">Download</a></p>",
            escape(bound)
        );
    }

    match (&view.filename, &view.table) {
        (Some(name), Some(TableContent::Table(html))) => {
            let _ = writeln!(body, "<h2>Preview: {}</h2>\n{}", escape(name), html);
        }
        (_, Some(TableContent::Error(message))) => {
            let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(message));
        }
        _ => {}
    }

    layout("Dataset", Page::Dataset, &body)
}

#[derive(Debug, Clone, Default)]
pub struct DetectView {
    /// Submitted values, echoed back into the form
    pub form: HashMap<String, String>,
    pub outcome: Option<DetectionOutcome>,
}

pub fn detect_page(view: &DetectView) -> String {
    let mut body = String::from("<h1>Detect</h1>\n<form method=\"post\" action=\"/detect\">\n");
    for field in DETECTION_FIELDS {
        let value = view.form.get(field).map(String::as_str).unwrap_or_default();
        let _ = writeln!(
            body,
            "<p><label for=\"{f}\">{f}</label><br>\
             <input id=\"{f}\" name=\"{f}\" value=\"{v}\" required></p>",
            f = field,
            v = escape(value),
        );
    }
    body.push_str("<button type=\"submit\">Detect</button>\n</form>\n");

    match &view.outcome {
        Some(DetectionOutcome::Label(label)) => {
            let class = match label {
                Label::Anomaly => "result-anomaly",
                Label::Normal => "result-normal",
            };
            let _ = writeln!(body, "<p class=\"{}\">{}</p>", class, label);
        }
        Some(DetectionOutcome::Error(message)) => {
            let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(message));
        }
        None => {}
    }

    layout("Detect", Page::Detect, &body)
}
