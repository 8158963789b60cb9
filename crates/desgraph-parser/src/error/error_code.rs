//! Error codes for the desgraph diagnostic system.
//!
//! Codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Statement loop errors
//! - `E2xx` - Statement validation errors
//! - `W0xx` - Warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated block comment.
    ///
    /// A `/*` comment was opened but the source ended before `*/`.
    E001,

    /// Stray `/` at end of input.
    ///
    /// The source ends with a single `/` that does not start a comment.
    E002,

    // =========================================================================
    // Statement Loop Errors (E1xx)
    // =========================================================================
    /// Missing semicolon.
    ///
    /// A statement has no terminating `;` before the end of input.
    E100,

    /// Missing endmodule.
    ///
    /// The source ended before the module was closed with `endmodule`.
    E101,

    /// Statement spans lines.
    ///
    /// An `input`, `output` or `wire` statement must fit on one line.
    E102,

    /// Unexpected statement.
    ///
    /// A statement appeared where it is not allowed: before the module
    /// header, a second header, text after `endmodule`, or `endmodule` with
    /// no open module.
    E103,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Invalid identifier.
    ///
    /// A name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    E200,

    /// Malformed module header.
    ///
    /// The header is missing its port list parentheses, has text after
    /// the closing parenthesis, or contains an empty port entry.
    E201,

    /// Duplicate port.
    ///
    /// A port name appears twice in the module header.
    E202,

    /// Undeclared port.
    ///
    /// An `input` or `output` statement names a port missing from the header.
    E203,

    /// Duplicate direction.
    ///
    /// A port is given a direction more than once.
    E204,

    /// Duplicate wire.
    ///
    /// A wire name is declared twice, or collides with a port name.
    E205,

    /// Invalid wire kind.
    ///
    /// A wire kind other than `dependency` or `stream`.
    E206,

    /// Undeclared wire.
    ///
    /// An instance connects to a name that is neither a declared wire nor
    /// a port with a direction.
    E207,

    /// Duplicate instance.
    ///
    /// An instance name is used twice in the same module.
    E208,

    /// Wire endpoint overflow.
    ///
    /// A wire already has two endpoints and a third instance connects to it.
    E209,

    /// Empty instance connections.
    ///
    /// An instance has no `.pin(wire)` connections.
    E210,

    /// Port already connected.
    ///
    /// An input or output port is connected by a second instance.
    E211,

    /// Duplicate connection.
    ///
    /// An instance uses the same pin or the same wire twice.
    E212,

    /// Malformed instance.
    ///
    /// An instance statement is not of the form
    /// `TYPE name(.pin(wire), ...)`.
    E213,

    /// Malformed declaration.
    ///
    /// An `input`, `output` or `wire` statement has the wrong number of
    /// words.
    E214,

    // =========================================================================
    // Warnings (W0xx)
    // =========================================================================
    /// Incomplete wire.
    ///
    /// A wire has fewer than two endpoints and is left out of the graph.
    W001,

    /// Port without direction.
    ///
    /// A header port is never declared `input` or `output`.
    W002,

    /// Unconnected port.
    ///
    /// A port has a direction but no instance connects to it.
    W003,

    /// Unconnected instance port.
    ///
    /// A nested module port is left unconnected by the instance that uses it.
    W004,

    /// Unresolved boundary.
    ///
    /// An instance pin maps to a port that has no vertex inside the
    /// instantiated module.
    W005,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            ErrorCode::E209 => "E209",
            ErrorCode::E210 => "E210",
            ErrorCode::E211 => "E211",
            ErrorCode::E212 => "E212",
            ErrorCode::E213 => "E213",
            ErrorCode::E214 => "E214",
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
            ErrorCode::W003 => "W003",
            ErrorCode::W004 => "W004",
            ErrorCode::W005 => "W005",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated block comment",
            ErrorCode::E002 => "stray `/` at end of input",
            ErrorCode::E100 => "missing semicolon",
            ErrorCode::E101 => "missing endmodule",
            ErrorCode::E102 => "statement spans lines",
            ErrorCode::E103 => "unexpected statement",
            ErrorCode::E200 => "invalid identifier",
            ErrorCode::E201 => "malformed module header",
            ErrorCode::E202 => "duplicate port",
            ErrorCode::E203 => "undeclared port",
            ErrorCode::E204 => "duplicate direction",
            ErrorCode::E205 => "duplicate wire",
            ErrorCode::E206 => "invalid wire kind",
            ErrorCode::E207 => "undeclared wire",
            ErrorCode::E208 => "duplicate instance",
            ErrorCode::E209 => "wire endpoint overflow",
            ErrorCode::E210 => "empty instance connections",
            ErrorCode::E211 => "port already connected",
            ErrorCode::E212 => "duplicate connection",
            ErrorCode::E213 => "malformed instance",
            ErrorCode::E214 => "malformed declaration",
            ErrorCode::W001 => "incomplete wire",
            ErrorCode::W002 => "port without direction",
            ErrorCode::W003 => "unconnected port",
            ErrorCode::W004 => "unconnected instance port",
            ErrorCode::W005 => "unresolved boundary",
        }
    }

    /// Returns `true` for the `W0xx` codes.
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E214.to_string(), "E214");
        assert_eq!(ErrorCode::W005.to_string(), "W005");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated block comment");
        assert_eq!(ErrorCode::E209.description(), "wire endpoint overflow");
        assert_eq!(ErrorCode::W001.description(), "incomplete wire");
    }

    #[test]
    fn test_error_code_is_warning() {
        assert!(ErrorCode::W003.is_warning());
        assert!(!ErrorCode::E203.is_warning());
    }
}
