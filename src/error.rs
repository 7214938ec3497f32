use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind};
use thiserror::Error;

use crate::lexer::TokenKind;

pub type Span = Range<usize>;

pub type CompileResult<T> = Result<T, CompileError>;

/// Every way a pipeline run can fail, as a value. How an error is shown
/// (terse one-liner vs. full source report) is decided by the caller, not
/// at the point where the error is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("UnrecognizedTokenError: unrecognized token \"{text}\" encountered at {line}:{column}")]
    UnrecognizedToken {
        text: String,
        line: usize,
        column: usize,
        span: Span,
    },

    #[error("UnexpectedTokenError: expected {expected:?}, but got {found:?}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        span: Span,
    },

    #[error("BuildError: {tool} failed:\n{diagnostics}")]
    Build { tool: String, diagnostics: String },

    #[error("NotYetBuiltError: executable does not exist, compile the program first")]
    NotYetBuilt,
}

impl CompileError {
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::UnrecognizedToken { span, .. } => Some(span.clone()),
            CompileError::UnexpectedToken { span, .. } => Some(span.clone()),
            _ => None,
        }
    }

    /// Full source-anchored report for errors that carry a span. Build
    /// and run errors have no source position and render as `None`.
    pub fn report(&self, file: String) -> Option<Report<'static, (String, Span)>> {
        let span = self.span()?;
        let label = match self {
            CompileError::UnrecognizedToken { text, .. } => {
                format!("could not make a token out of \"{text}\"")
            }
            CompileError::UnexpectedToken {
                expected, found, ..
            } => format!("expected {expected:?} here, but found {found:?}"),
            _ => return None,
        };
        Some(
            Report::build(ReportKind::Error, (file.clone(), span.clone()))
                .with_message(self.to_string())
                .with_label(
                    Label::new((file, span))
                        .with_message(label)
                        .with_color(Color::BrightRed),
                )
                .finish(),
        )
    }
}
