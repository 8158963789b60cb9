//! Spans of netlist source annotated with a short note.

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// The text the diagnostic is about.
    Primary,
    /// An earlier declaration the primary text clashes with.
    Secondary,
}

/// A note pinned to a span of netlist source.
///
/// For `wire w dependency;` declared twice, the primary label marks the
/// second `w` ("already declared") and a secondary label marks the first
/// ("first declared here").
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    role: Role,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::with_role(span, message, Role::Primary)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::with_role(span, message, Role::Secondary)
    }

    fn with_role(span: Span, message: impl Into<String>, role: Role) -> Self {
        Self {
            span,
            message: message.into(),
            role,
        }
    }

    /// Byte range of the labeled text in the module source.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.role == Role::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.role == Role::Secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "module M(a); input a; wire w dependency; wire w stream; endmodule";

    fn span_of(needle: &str, nth: usize) -> Span {
        let (start, _) = SOURCE.match_indices(needle).nth(nth).unwrap();
        Span::new(start..start + needle.len())
    }

    #[test]
    fn test_duplicate_wire_labels() {
        let clash = Label::primary(span_of("wire w stream", 0), "already declared");
        let first = Label::secondary(span_of("wire w dependency", 0), "first declared here");

        assert!(clash.is_primary());
        assert!(!clash.is_secondary());
        assert_eq!(clash.message(), "already declared");
        assert_eq!(&SOURCE[clash.span().start()..clash.span().end()], "wire w stream");

        assert!(first.is_secondary());
        assert!(first.span().end() <= clash.span().start());
    }

    #[test]
    fn test_empty_span_at_end_of_source() {
        let eof = Span::new(SOURCE.len()..SOURCE.len());
        let label = Label::primary(eof, "expected `endmodule`");

        assert!(label.span().is_empty());
        assert_eq!(label.span().start(), SOURCE.len());
    }
}
