//! Graphviz DOT output for elaborated graphs.

use dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph as DotGraph, GraphAttributes, Id as DotId, Node,
    NodeId, Stmt, Vertex as DotVertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};

use desgraph_core::{graph::Graph, identifier::Id, module::WireKind};

use crate::config::DumpConfig;

/// Quotes `text` as a DOT string.
fn quoted(text: &str) -> DotId {
    DotId::Escaped(format!("\"{}\"", text.replace('"', "\\\"")))
}

fn plain(text: &str) -> DotId {
    DotId::Plain(text.to_string())
}

fn attr(key: &str, value: DotId) -> Attribute {
    Attribute(plain(key), value)
}

fn node_id(name: &str) -> NodeId {
    NodeId(quoted(name), None)
}

fn edge(from: &str, to: &str, attributes: Vec<Attribute>) -> Stmt {
    Stmt::Edge(DotEdge {
        ty: EdgeTy::Pair(DotVertex::N(node_id(from)), DotVertex::N(node_id(to))),
        attributes,
    })
}

/// Name of the terminal node drawn for boundary `port`.
fn port_node(port: Id) -> String {
    format!("port:{port}")
}

/// Builds the DOT representation of `graph`.
pub fn to_dot(graph: &Graph, config: &DumpConfig) -> DotGraph {
    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(vec![attr(
            "rankdir",
            plain(config.rankdir().as_str()),
        )])),
        Stmt::GAttribute(GraphAttributes::Node(vec![attr("shape", plain("box"))])),
    ];

    for (name, vertex) in graph.vertices() {
        let label = format!("{name}\\n{}", vertex.cell());
        stmts.push(Stmt::Node(Node::new(
            node_id(&name.to_string()),
            vec![attr("label", quoted(&label))],
        )));
    }

    for (name, wire) in graph.edges() {
        let mut attributes = vec![attr("label", quoted(&name.to_string()))];
        if wire.kind() == WireKind::Stream {
            attributes.push(attr("style", plain("dashed")));
        }
        stmts.push(edge(
            &wire.from().to_string(),
            &wire.to().to_string(),
            attributes,
        ));
    }

    if config.show_ports() {
        for (port, vertex) in graph.pi() {
            stmts.push(port_stmt(*port));
            stmts.push(edge(&port_node(*port), &vertex.to_string(), Vec::new()));
        }
        for (port, vertex) in graph.po() {
            stmts.push(port_stmt(*port));
            stmts.push(edge(&vertex.to_string(), &port_node(*port), Vec::new()));
        }
    }

    DotGraph::DiGraph {
        id: quoted(&graph.name().to_string()),
        strict: false,
        stmts,
    }
}

fn port_stmt(port: Id) -> Stmt {
    Stmt::Node(Node::new(
        node_id(&port_node(port)),
        vec![
            attr("label", quoted(&port.to_string())),
            attr("shape", plain("plaintext")),
        ],
    ))
}

/// Renders `graph` as DOT text.
pub fn dump(graph: &Graph, config: &DumpConfig) -> String {
    to_dot(graph, config).print(&mut PrinterContext::default())
}
