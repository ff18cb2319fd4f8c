//! Error reporting with source context.
//!
//! Compile errors carry byte spans into the Pa source the tree was parsed from. The source text itself is optional:
//! tree files can be compiled without it, in which case errors render without a snippet.

use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource, Report};

use crate::backend::CompileError;

/// Wrap a compile error into a `miette` report, attaching the Pa source when available.
pub fn report(error: CompileError, source: Option<(&str, String)>) -> Report {
    let report = Report::new(error);
    match source {
        Some((name, text)) => report.with_source_code(NamedSource::new(name, text)),
        None => report,
    }
}

/// Render a compile error as plain text (no colors), for logs and snapshots.
pub fn render_plain(error: CompileError, source: Option<(&str, String)>) -> String {
    let report = report(error, source);
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()).with_width(100);
    let mut out = String::new();
    if handler.render_report(&mut out, &*report).is_err() {
        // Rendering into a String cannot fail for I/O reasons; fall back to the message alone.
        return report.to_string();
    }
    out
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut line_start = 0;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    (line, offset - line_start + 1)
}
