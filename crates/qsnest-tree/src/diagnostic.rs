//! Recovered problems and their rendering.
//!
//! These never abort a parse. The codec keeps going with a best-effort
//! result and records what it had to paper over.

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use qsnest_format::{Malformed, decode_component};
use qsnest_tokenizer::Span;

/// A recovered problem with its location in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// Where, when known.
    pub span: Option<Span>,
}

/// Kind of recovered problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A bad percent escape or invalid UTF-8, passed through.
    MalformedEncoding,
    /// A scalar stood where a container was needed and was replaced.
    StructuralConflict { key: String },
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }

    /// A malformed escape found inside the component spanning `component`.
    pub fn malformed<T>(err: &Malformed<T>, component: Span) -> Self {
        Self::new(
            DiagnosticKind::MalformedEncoding,
            Some(component.narrow(err.offset, err.len)),
        )
    }

    /// Render this diagnostic with ariadne.
    ///
    /// Returns a string containing the formatted report with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span.map(Into::into).unwrap_or(0..0);

        match &self.kind {
            DiagnosticKind::MalformedEncoding => {
                Report::build(ReportKind::Warning, (filename, range.clone()))
                    .with_message("malformed percent-encoding")
                    .with_label(
                        Label::new((filename, range))
                            .with_message("kept as written")
                            .with_color(Color::Yellow),
                    )
                    .with_help("escape a literal '%' as %25")
            }
            DiagnosticKind::StructuralConflict { key } => {
                Report::build(ReportKind::Warning, (filename, range.clone()))
                    .with_message(format!("structural conflict at `{}`", key))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("replaces an earlier scalar with a container")
                            .with_color(Color::Yellow),
                    )
                    .with_help("a key cannot hold both a value and nested keys")
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MalformedEncoding => write!(f, "malformed percent-encoding")?,
            DiagnosticKind::StructuralConflict { key } => {
                write!(f, "structural conflict at `{}`", key)?
            }
        }
        if let Some(span) = self.span {
            write!(f, " at offset {}", span.start)?;
        }
        Ok(())
    }
}

/// Decode a component, recording a diagnostic if it had to be recovered.
pub(crate) fn decode_recovering(
    text: &str,
    span: Span,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    match decode_component(text) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            diagnostics.push(Diagnostic::malformed(&err, span));
            err.into_recovered()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripped(rendered: String) -> String {
        String::from_utf8(strip_ansi_escapes::strip(&rendered)).unwrap()
    }

    #[test]
    fn test_decode_recovering() {
        let mut diagnostics = Vec::new();
        assert_eq!(decode_recovering("a+b", Span::new(0, 3), &mut diagnostics), "a b");
        assert!(diagnostics.is_empty());

        let decoded = decode_recovering("x%zz", Span::new(10, 14), &mut diagnostics);
        assert_eq!(decoded, "x%zz");
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(
                DiagnosticKind::MalformedEncoding,
                Some(Span::new(11, 14))
            )]
        );
    }

    #[test]
    fn test_render_malformed() {
        let source = "a=%zz";
        let diagnostic = Diagnostic::new(DiagnosticKind::MalformedEncoding, Some(Span::new(2, 5)));
        let rendered = stripped(diagnostic.render("query", source));
        assert!(rendered.contains("malformed percent-encoding"), "{rendered}");
        assert!(rendered.contains("kept as written"), "{rendered}");
    }

    #[test]
    fn test_render_conflict() {
        let source = "a=1&a[b]=2";
        let diagnostic = Diagnostic::new(
            DiagnosticKind::StructuralConflict {
                key: "a[b]".to_string(),
            },
            Some(Span::new(4, 10)),
        );
        let rendered = stripped(diagnostic.render("query", source));
        assert!(rendered.contains("structural conflict at `a[b]`"), "{rendered}");
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(DiagnosticKind::MalformedEncoding, Some(Span::new(7, 9)));
        assert_eq!(diagnostic.to_string(), "malformed percent-encoding at offset 7");
    }
}
