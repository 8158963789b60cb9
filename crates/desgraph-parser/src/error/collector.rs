//! Destinations for diagnostics that do not abort processing.
//!
//! The parser and the elaborator report warnings through a
//! [`DiagnosticSink`] supplied by the caller. [`DiagnosticCollector`] is the
//! usual implementation; a plain `Vec<Diagnostic>` also works.

use crate::error::{Diagnostic, ParseError};

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink {
    /// Report one diagnostic.
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

/// A collector for accumulating diagnostics across several phases.
///
/// # Example
///
/// ```
/// # use desgraph_parser::error::{Diagnostic, DiagnosticCollector, DiagnosticSink, ErrorCode};
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(Diagnostic::warning("wire `w` has one endpoint").with_code(ErrorCode::W001));
///
/// assert_eq!(collector.diagnostics().len(), 1);
/// assert!(collector.finish().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns `true` if an error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - Otherwise returns the warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }
}
