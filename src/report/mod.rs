//! Run artifacts written after the repair loop: the HTML summary and the audit log.

mod audit;
mod html;

pub use audit::AuditLog;
pub use html::{escape_html, render, write_report};
