//! Structural consistency checks for elaborated graphs.

use thiserror::Error;

use desgraph_core::{graph::Graph, identifier::Id};

/// A single broken reference inside a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("edge `{edge}` references missing vertex `{vertex}`")]
    MissingVertex { edge: Id, vertex: Id },

    #[error("vertex `{vertex}` touches unknown wire `{wire}`")]
    DanglingWire { vertex: Id, wire: Id },

    #[error("boundary port `{port}` lands on missing vertex `{vertex}`")]
    MissingBoundaryVertex { port: Id, vertex: Id },
}

/// Checks that every name in `graph` refers to something that exists.
///
/// - every edge endpoint is a vertex
/// - every wire recorded on a vertex is a primary input, primary output or
///   edge
/// - every primary input and output lands on a vertex
///
/// All violations are returned; an empty list means the graph is consistent.
pub fn check(graph: &Graph) -> Vec<Inconsistency> {
    let mut violations = Vec::new();

    for (name, edge) in graph.edges() {
        for vertex in [edge.from(), edge.to()] {
            if graph.vertex(vertex).is_none() {
                violations.push(Inconsistency::MissingVertex {
                    edge: *name,
                    vertex,
                });
            }
        }
    }

    for (name, vertex) in graph.vertices() {
        for wire in vertex.wires() {
            if !graph.is_boundary(*wire) && graph.edge(*wire).is_none() {
                violations.push(Inconsistency::DanglingWire {
                    vertex: *name,
                    wire: *wire,
                });
            }
        }
    }

    for (port, vertex) in graph.pi().iter().chain(graph.po()) {
        if graph.vertex(*vertex).is_none() {
            violations.push(Inconsistency::MissingBoundaryVertex {
                port: *port,
                vertex: *vertex,
            });
        }
    }

    violations
}
