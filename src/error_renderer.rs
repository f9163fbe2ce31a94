//! Error rendering using ariadne
//!
//! Compile errors are drawn against the source line they came from. Link and
//! execution errors have no useful source position and are printed as a
//! single line.

use std::io::Write;
use std::ops::Range;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use kerbo_core::compiler::CompileError;
use kerbo_core::parser::normalize;

use crate::Error;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use kerbo::{CpuOptions, NullHost, Session, render_error};
///
/// let mut session = Session::new(CpuOptions::default(), NullHost);
/// if let Err(e) = session.execute("set x to .") {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compile { text, error } => render_compile_error(text, error, writer, use_color),
        Error::Link(error) => writeln!(writer, "Link error: {}", error),
        Error::Execution(error) => writeln!(writer, "Execution error: {}", error),
    }
}

fn render_compile_error(
    source: &str,
    error: &CompileError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let cause = error.root_cause();
    let message = cause.to_string();
    let span = error_span(source, error);

    let mut report = Report::build(ReportKind::Error, ("<input>", span.clone()))
        .with_message(&message)
        .with_config(ariadne::Config::default().with_color(use_color));

    let label = match cause {
        CompileError::Parse(parse) => parse.message.clone(),
        _ => String::from("while compiling this"),
    };
    report = report.with_label(
        Label::new(("<input>", span))
            .with_message(label)
            .with_color(colors.next()),
    );
    if let CompileError::MalformedTree { .. } = cause {
        report = report.with_note("the parser accepted a shape the compiler cannot handle");
    }

    report
        .finish()
        .write(("<input>", Source::from(source)), &mut *writer)
}

/// Byte range the report points at.
///
/// Parse errors carry their own span. Anything else is located by the text
/// of the node that was being compiled; the parser folds case before it
/// hands out fragments, so the search runs on the folded source. Folding is
/// ASCII-only, so offsets carry over to the original text.
fn error_span(source: &str, error: &CompileError) -> Range<usize> {
    let range = match error {
        CompileError::Parse(parse) => parse.span.0.clone(),
        CompileError::Node { fragment, source: inner } => {
            match normalize(source).find(fragment.as_str()) {
                Some(start) if !fragment.is_empty() => start..start + fragment.len(),
                _ => error_span(source, inner),
            }
        }
        CompileError::MalformedTree { .. } => 0..source.len(),
    };
    widen(range, source.len())
}

/// Zero-width spans are stretched to one character so there is something to
/// underline.
fn widen(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    let end = range.end.min(len);
    if start == end && end < len {
        start..end + 1
    } else {
        start..end
    }
}
