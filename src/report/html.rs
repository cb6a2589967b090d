//! Static HTML run report.

use std::fs;
use std::path::Path;

use log::info;

use crate::artifact::file_name_of;
use crate::error::{RescueError, Result};
use crate::repair::{OutcomeStatus, RunSummary};

const STYLE: &str = "body{font-family:'Segoe UI',sans-serif;background:#1e1e1e;color:#d4d4d4;padding:20px;max-width:1000px;margin:0 auto}\
h1{color:#4ec9b0;border-bottom:1px solid #3c3c3c}\
.card{background:#252526;border:1px solid #3c3c3c;padding:15px;margin-bottom:20px;border-radius:6px}\
.counts{display:flex;gap:20px;text-align:center}.counts div{flex:1}\
table{width:100%;border-collapse:collapse}th,td{padding:10px;border-bottom:1px solid #3c3c3c;text-align:left;vertical-align:top}\
.success{color:#6a9955}.fail{color:#f44747}.warn{color:#cca700}";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn status_class(status: OutcomeStatus) -> &'static str {
    match status {
        OutcomeStatus::Clean | OutcomeStatus::Fixed => "success",
        OutcomeStatus::Failed => "fail",
        OutcomeStatus::Skipped => "warn",
    }
}

/// Render the whole report. Diagnostics in `summary` are already truncated.
pub fn render(summary: &RunSummary) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\"/>\n");
    html.push_str("<title>BugRescue Report</title>\n");
    html.push_str(&format!("<style>{}</style>\n", STYLE));
    html.push_str("</head><body>\n");
    html.push_str("<h1>BugRescue Audit Report</h1>\n");

    html.push_str("<div class=\"card counts\">\n");
    html.push_str(&format!(
        "<div><h2 class=\"success\">{}</h2>Passed</div>\n",
        summary.passed()
    ));
    html.push_str(&format!("<div><h2 class=\"fail\">{}</h2>Failed</div>\n", summary.failed()));
    html.push_str(&format!("<div><h2 class=\"warn\">{}</h2>Skipped</div>\n", summary.skipped()));
    html.push_str(&format!("<div><h2>{}</h2>Total</div>\n", summary.total()));
    html.push_str("</div>\n");

    html.push_str("<div class=\"card\">\n");
    html.push_str(&format!(
        "<h3>Audit Log ({})</h3>\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    html.push_str("<table>\n<thead><tr><th>File</th><th>Status</th><th>Detection</th></tr></thead>\n<tbody>\n");
    for entry in &summary.entries {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"{}\"><strong>{}</strong></td><td>{}</td></tr>\n",
            escape_html(&entry.file),
            status_class(entry.status),
            entry.status.label(),
            escape_html(&entry.diagnostic)
        ));
    }
    html.push_str("</tbody>\n</table>\n</div>\n");

    if !summary.not_processed.is_empty() {
        html.push_str("<div class=\"card\">\n<h3 class=\"warn\">Not processed (run cancelled)</h3>\n<ul>\n");
        for path in &summary.not_processed {
            html.push_str(&format!("<li>{}</li>\n", escape_html(&file_name_of(path))));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("</body></html>\n");
    html
}

/// Render and write the report, creating parent directories as needed.
pub fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| RescueError::Report(format!("failed to create dir {}: {}", parent.display(), e)))?;
    }
    fs::write(path, render(summary))
        .map_err(|e| RescueError::Report(format!("failed to write {}: {}", path.display(), e)))?;
    info!("Report written to {}", path.display());
    Ok(())
}
