//! The statement loop: drives the lexer over one module's source and
//! dispatches each statement to the [`ModuleBuilder`].

use log::{debug, trace};
use winnow::stream::{LocatingSlice, Location};

use desgraph_core::module::{Direction, Module};

use crate::{
    error::{Diagnostic, DiagnosticSink, ErrorCode, Result},
    lexer::{self, Input, Keyword},
    span::Span,
    statement::ModuleBuilder,
};

/// Span of the word starting at the cursor, for "unexpected statement"
/// labels.
fn word_span(input: &Input<'_>) -> Span {
    let start = input.current_token_start();
    let len = input
        .find(|c: char| c.is_whitespace() || matches!(c, ';' | '(' | '/' | '#'))
        .unwrap_or(input.len());
    Span::new(start..start + len.max(1).min(input.len()))
}

/// Consumes `endmodule`, an optional `;`, and checks nothing else follows.
fn close_module(input: &mut Input<'_>, builder: &ModuleBuilder) -> Result<()> {
    let end = lexer::consume_keyword(input, Keyword::Endmodule)?;
    lexer::advance_to_next_token(input)?;
    lexer::consume_semicolon(input);
    lexer::advance_to_next_token(input)?;

    if !input.is_empty() {
        return Err(Diagnostic::error("unexpected text after `endmodule`")
            .with_code(ErrorCode::E103)
            .with_label(word_span(input), "unexpected statement")
            .with_secondary_label(end, format!("module `{}` ends here", builder.name()))
            .with_help("each source holds exactly one module"));
    }
    Ok(())
}

/// Parses exactly one module from `source`.
pub(crate) fn parse_module(source: &str, sink: &mut dyn DiagnosticSink) -> Result<Module> {
    let mut input = LocatingSlice::new(source);

    lexer::advance_to_next_token(&mut input)?;
    if lexer::match_keyword(&input) != Some(Keyword::Module) {
        let message = if input.is_empty() {
            "source contains no module"
        } else {
            "expected a module header"
        };
        return Err(Diagnostic::error(message)
            .with_code(ErrorCode::E103)
            .with_label(word_span(&input), "expected `module`")
            .with_help("start the source with `module NAME(ports);`"));
    }

    let header = lexer::next_statement(&mut input)?;
    let mut builder = ModuleBuilder::from_header(&header)?;

    loop {
        lexer::advance_to_next_token(&mut input)?;

        if input.is_empty() {
            let end = input.current_token_start();
            return Err(Diagnostic::error(format!(
                "module `{}` is missing `endmodule`",
                builder.name()
            ))
            .with_code(ErrorCode::E101)
            .with_label(Span::new(end..end), "source ends here")
            .with_secondary_label(builder.header_span(), "module starts here")
            .with_help("close the module with `endmodule`"));
        }

        match lexer::match_keyword(&input) {
            Some(Keyword::Endmodule) => {
                close_module(&mut input, &builder)?;
                break;
            }
            Some(Keyword::Module) => {
                let statement = lexer::next_statement(&mut input)?;
                return Err(Diagnostic::error("module headers cannot be nested")
                    .with_code(ErrorCode::E103)
                    .with_label(statement.span, "second module header")
                    .with_secondary_label(builder.header_span(), "enclosing module")
                    .with_help("close the current module with `endmodule` first"));
            }
            Some(Keyword::Input) => {
                let statement = lexer::next_statement(&mut input)?;
                builder.declare_direction(&statement, Direction::Input)?;
            }
            Some(Keyword::Output) => {
                let statement = lexer::next_statement(&mut input)?;
                builder.declare_direction(&statement, Direction::Output)?;
            }
            Some(Keyword::Wire) => {
                let statement = lexer::next_statement(&mut input)?;
                builder.declare_wire(&statement)?;
            }
            None => {
                let statement = lexer::next_statement(&mut input)?;
                builder.add_instance(&statement)?;
            }
        }
    }

    let module = builder.finish(sink);
    debug!(module:% = module.name(), instances = module.instances().len(); "Parsed module");
    trace!(module:?; "Module contents");
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(source: &str) -> Diagnostic {
        let mut sink: Vec<Diagnostic> = Vec::new();
        parse_module(source, &mut sink).unwrap_err()
    }

    #[test]
    fn test_minimal_module() {
        let mut sink: Vec<Diagnostic> = Vec::new();

        let module = parse_module("module M(); endmodule", &mut sink).unwrap();

        assert_eq!(module.name(), "M");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_trailing_semicolon_after_endmodule() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        assert!(parse_module("module M();\nendmodule ;\n// done\n", &mut sink).is_ok());
    }

    #[test]
    fn test_missing_endmodule() {
        let source = "module M(a);\ninput a;\n";
        let err = parse_err(source);

        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert_eq!(err.labels()[0].span(), Span::new(source.len()..source.len()));
        assert_eq!(err.labels()[1].span(), Span::new(0..11));
    }

    #[test]
    fn test_statement_before_header() {
        assert_eq!(parse_err("input a;").code(), Some(ErrorCode::E103));
        assert_eq!(parse_err("endmodule").code(), Some(ErrorCode::E103));
        assert_eq!(parse_err("  // nothing\n").code(), Some(ErrorCode::E103));
    }

    #[test]
    fn test_nested_header() {
        let err = parse_err("module A(); module B(); endmodule");
        assert_eq!(err.code(), Some(ErrorCode::E103));
    }

    #[test]
    fn test_text_after_endmodule() {
        let err = parse_err("module A(); endmodule\nmodule B(); endmodule");

        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(err.labels()[0].span(), Span::new(22..28));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_err("module M(a);\ninput a\nendmodule");
        assert_eq!(err.code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_statement_spans_are_absolute() {
        let err = parse_err("module M(a);\n  wire w bus;\nendmodule");

        assert_eq!(err.code(), Some(ErrorCode::E206));
        assert_eq!(err.labels()[0].span(), Span::new(22..25));
    }
}
