//! desgraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the desgraph parser
//! and elaborator:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Modules**: The structural netlist model ([`module`] module)
//! - **Graphs**: Flattened per-module connectivity graphs ([`graph`] module)

pub mod graph;
pub mod identifier;
pub mod module;
