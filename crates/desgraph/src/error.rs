//! Error types for desgraph operations.
//!
//! This module provides the main error type [`DesError`] which wraps the
//! error conditions that can occur while loading, elaborating and checking
//! a design.

use std::{io, path::PathBuf};

use thiserror::Error;

use desgraph_core::identifier::Id;
use desgraph_parser::error::ParseError;

use crate::check::Inconsistency;

/// The main error type for desgraph operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the full source text alongside the parser's
/// diagnostics so that their spans can be rendered.
#[derive(Debug, Error)]
pub enum DesError {
    #[error("cannot read `{}`: {source}", path.display())]
    SourceUnavailable { path: PathBuf, source: io::Error },

    #[error("{err}")]
    Parse {
        err: ParseError,
        path: PathBuf,
        src: String,
    },

    #[error("module `{name}` from `{}` is already defined", path.display())]
    DuplicateModule { name: Id, path: PathBuf },

    #[error("module `{0}` not found")]
    ModuleNotFound(Id),

    #[error("module `{0}` has not been elaborated")]
    NotElaborated(Id),

    #[error("instantiation cycle: {}", cycle_path(.path))]
    HierarchyCycle { path: Vec<Id> },

    #[error("instance `{instance}` in `{module}` connects pin `{pin}`, which is not a port of `{target}`")]
    UnknownPin {
        module: Id,
        instance: Id,
        pin: Id,
        target: Id,
    },

    #[error("graph of `{module}` is inconsistent: {}", summarize(.violations))]
    GraphInconsistency {
        module: Id,
        violations: Vec<Inconsistency>,
    },

    #[error("{count} warning(s) reported and warnings are denied")]
    WarningsDenied { count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DesError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, path: impl Into<PathBuf>, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            path: path.into(),
            src: src.into(),
        }
    }
}

fn cycle_path(path: &[Id]) -> String {
    path.iter()
        .map(Id::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn summarize(violations: &[Inconsistency]) -> String {
    match violations {
        [] => "no violations".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}
