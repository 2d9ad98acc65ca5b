//! Report sinks: JSON files and the Markdown summary.

pub mod json;
pub mod markdown;

pub use json::{read_workflow_reports, write_json, write_workflow_reports};
pub use markdown::{render_markdown, write_markdown};
