//! # desgraph Parser
//!
//! Parser for the desgraph structural netlist language. A source holds a
//! single module built from five statement forms:
//!
//! ```text
//! module M1(a, b);        // header with the port list
//!   input a;              // port directions
//!   output b;
//!   wire w dependency;    // point-to-point wires, `dependency` or `stream`
//!   INV i1(.i(a), .o(w)); // cell instances with named pin connections
//!   INV i2(.i(w), .o(b));
//! endmodule
//! ```
//!
//! `//`, `#` and `/* */` comments may appear between statements.
//!
//! ## Usage
//!
//! ```
//! # use desgraph_parser::{parse, error::{Diagnostic, ParseError}};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "module M(a); input a; BUF u(.i(a)); endmodule";
//!
//!     let mut warnings: Vec<Diagnostic> = Vec::new();
//!     let module = parse(source, &mut warnings)?;
//!
//!     assert_eq!(module.name(), "M");
//!     assert!(warnings.is_empty());
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
mod span;
mod statement;

pub use span::Span;

use desgraph_core::module::Module;
use log::debug;

use error::{DiagnosticSink, ParseError};

/// Parse source text into a [`Module`].
///
/// Parsing stops at the first error; no partial module is returned and the
/// error carries a single diagnostic with source spans. Non-fatal findings
/// (incomplete wires, ports without a direction, unconnected ports) are
/// reported to `sink` as warnings once the whole module has been read.
///
/// # Example
///
/// ```
/// # use desgraph_parser::{parse, error::{DiagnosticCollector, ErrorCode}};
/// let mut collector = DiagnosticCollector::new();
///
/// let err = parse("module M(a); input x; endmodule", &mut collector).unwrap_err();
/// assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E203));
/// ```
pub fn parse(source: &str, sink: &mut dyn DiagnosticSink) -> Result<Module, ParseError> {
    debug!(bytes = source.len(); "Parsing netlist source");
    parser::parse_module(source, sink).map_err(ParseError::from)
}
