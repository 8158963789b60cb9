//! Low-level scanning of netlist source text.
//!
//! The netlist language is statement oriented: every declaration except
//! `endmodule` runs up to a terminating `;`. The lexer does not produce a
//! token stream. Instead it offers three primitives that the parsing loop
//! drives over a shared cursor:
//!
//! - [`advance_to_next_token`] skips whitespace and comments
//! - [`match_keyword`] classifies the upcoming statement without consuming it
//! - [`next_statement`] slices out the raw statement text and its span
//!
//! Positions are byte offsets into the original source, tracked by winnow's
//! [`LocatingSlice`].

use winnow::{
    Parser as _,
    ascii::multispace1,
    combinator::{alt, cut_err, not, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{literal, one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

pub(crate) type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Statement keywords. Anything else starts a cell instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Module,
    Input,
    Output,
    Wire,
    Endmodule,
}

impl Keyword {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Keyword::Module => "module",
            Keyword::Input => "input",
            Keyword::Output => "output",
            Keyword::Wire => "wire",
            Keyword::Endmodule => "endmodule",
        }
    }
}

/// The raw text of one `;`-terminated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Statement<'a> {
    /// Everything from the first significant character up to, but not
    /// including, the `;`.
    pub text: &'a str,
    pub span: Span,
}

/// Parse a `//` or `#` comment running to the end of the line.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    preceded(alt(("//", "#")), take_while(0.., |c| c != '\n'))
        .void()
        .parse_next(input)
}

/// Parse a `/* ... */` comment. Block comments do not nest.
fn block_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let start = input.current_token_start();

    "/*".parse_next(input)?;

    // Committed: a missing `*/` is an error, not a backtrack.
    cut_err(terminated(take_until(0.., "*/"), "*/"))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated block comment",
            help: Some("close the comment with `*/`"),
            start,
        })
        .void()
        .parse_next(input)
}

/// Parse one run of insignificant text.
fn trivia<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    alt((multispace1.void(), line_comment, block_comment)).parse_next(input)
}

/// Parse a keyword with word boundary checking.
fn keyword<'a>(input: &mut Input<'a>) -> IResult<'a, Keyword> {
    terminated(
        alt((
            literal("module").value(Keyword::Module),
            literal("input").value(Keyword::Input),
            literal("output").value(Keyword::Output),
            literal("wire").value(Keyword::Wire),
            literal("endmodule").value(Keyword::Endmodule),
        )),
        // `wire_a` or `modules` are identifiers, not keywords
        peek(not(one_of(|c: char| c.is_ascii_alphanumeric() || c == '_'))),
    )
    .parse_next(input)
}

/// Skips whitespace and comments, leaving `input` at the next significant
/// character.
///
/// # Errors
///
/// - `E001` if a block comment is never closed
/// - `E002` if only a lone `/` remains
pub(crate) fn advance_to_next_token(input: &mut Input<'_>) -> Result<()> {
    repeat(0.., trivia)
        .map(|()| ())
        .parse_next(input)
        .map_err(|err| convert_err_mode(err, input.current_token_start()))?;

    if input.trim_end() == "/" {
        let start = input.current_token_start();
        return Err(Diagnostic::error("unexpected `/` at end of input")
            .with_code(ErrorCode::E002)
            .with_label(Span::new(start..start + 1), ErrorCode::E002.description())
            .with_help("comments start with `//` or `/*`"));
    }
    Ok(())
}

/// Returns the keyword that starts the upcoming statement, if any.
///
/// The input is not advanced.
pub(crate) fn match_keyword(input: &Input<'_>) -> Option<Keyword> {
    let mut probe = input.clone();
    keyword(&mut probe).ok()
}

/// Consumes `keyword`, returning its span.
///
/// Only call after [`match_keyword`] returned the same keyword.
pub(crate) fn consume_keyword(input: &mut Input<'_>, keyword: Keyword) -> Result<Span> {
    let start = input.current_token_start();
    literal(keyword.as_str())
        .parse_next(input)
        .map_err(|err: ErrMode<ContextError<LexerDiagnostic>>| {
            convert_err_mode(err, input.current_token_start())
        })?;
    Ok(Span::new(start..input.current_token_start()))
}

/// Consumes a single `;` if it is the next character.
pub(crate) fn consume_semicolon(input: &mut Input<'_>) -> bool {
    let result: IResult<'_, char> = ';'.parse_next(input);
    result.is_ok()
}

/// Slices out the next statement and consumes its terminating `;`.
///
/// # Errors
///
/// `E100` if there is no `;` before the end of input.
pub(crate) fn next_statement<'a>(input: &mut Input<'a>) -> Result<Statement<'a>> {
    let start = input.current_token_start();

    let result: IResult<'a, &'a str> =
        terminated(take_until(0.., ";"), ";").parse_next(input);

    match result {
        Ok(text) => Ok(Statement {
            text,
            span: Span::new(start..start + text.len()),
        }),
        Err(_) => {
            let line_len = input.find('\n').unwrap_or(input.len());
            Err(Diagnostic::error("missing `;` at end of statement")
                .with_code(ErrorCode::E100)
                .with_label(
                    Span::new(start..start + line_len.max(1)),
                    "statement is never terminated",
                )
                .with_help("end the statement with `;`"))
        }
    }
}

/// Convert an ErrMode and error position to a Diagnostic.
///
/// Falls back to E002 if no diagnostic context is found.
fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(LexerDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let span = Span::new(*start..error_pos);

        let mut diag = Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span, code.description());
        if let Some(h) = help {
            diag = diag.with_help(*h);
        }
        return diag;
    }

    let span = Span::new(error_pos..error_pos.saturating_add(1));
    Diagnostic::error("unexpected character")
        .with_code(ErrorCode::E002)
        .with_label(span, ErrorCode::E002.description())
}
