//! Error and diagnostic system for the desgraph parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - A [`DiagnosticSink`] through which non-fatal warnings are reported
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Fatal diagnostics are wrapped in [`ParseError`]
//! for returning from [`parse`](crate::parse); warnings go to the sink the
//! caller supplies.
//!
//! # Example
//!
//! ```
//! # use desgraph_parser::error::{Diagnostic, ErrorCode};
//! # use desgraph_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::error("wire `w` is declared more than once")
//!     .with_code(ErrorCode::E205)
//!     .with_label(span, "duplicate declaration")
//!     .with_secondary_label(original_span, "first declared here")
//!     .with_help("rename one of the wires");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use collector::{DiagnosticCollector, DiagnosticSink};
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
