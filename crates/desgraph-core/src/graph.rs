//! Flattened connectivity graph of one elaborated module.
//!
//! # Architecture
//!
//! - [`Vertex`]: a leaf cell instance, possibly reached through several levels
//!   of hierarchy, together with the names of every wire touching it
//! - [`Edge`]: a point-to-point wire between two vertices, tagged with its
//!   [`WireKind`]
//! - [`Graph`]: vertices and edges keyed by name, plus the primary inputs and
//!   outputs through which a parent module can connect to it
//!
//! All collections keep insertion order, so iteration (and anything rendered
//! from it) is deterministic.

use indexmap::{IndexMap, IndexSet, map::Entry};

use crate::{identifier::Id, module::WireKind};

/// A leaf cell in the flattened graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    cell: Id,
    wires: IndexSet<Id>,
}

impl Vertex {
    /// Creates a vertex for an instance of the leaf cell `cell`.
    pub fn new(cell: Id) -> Self {
        Self {
            cell,
            wires: IndexSet::new(),
        }
    }

    /// The leaf cell type of this vertex.
    pub fn cell(&self) -> Id {
        self.cell
    }

    /// Names of the edges, primary inputs and primary outputs touching this
    /// vertex.
    pub fn wires(&self) -> &IndexSet<Id> {
        &self.wires
    }

    /// Records that `wire` touches this vertex.
    pub fn touch(&mut self, wire: Id) {
        self.wires.insert(wire);
    }
}

/// A directed, point-to-point connection between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    from: Id,
    to: Id,
    kind: WireKind,
}

impl Edge {
    pub fn new(from: Id, to: Id, kind: WireKind) -> Self {
        Self { from, to, kind }
    }

    pub fn from(&self) -> Id {
        self.from
    }

    pub fn to(&self) -> Id {
        self.to
    }

    pub fn kind(&self) -> WireKind {
        self.kind
    }
}

/// The flattened graph of a single module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    name: Id,
    pi: IndexMap<Id, Id>,
    po: IndexMap<Id, Id>,
    vertices: IndexMap<Id, Vertex>,
    edges: IndexMap<Id, Edge>,
}

impl Graph {
    /// Creates an empty graph for the module `name`.
    pub fn new(name: Id) -> Self {
        Self {
            name,
            pi: IndexMap::new(),
            po: IndexMap::new(),
            vertices: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// The module this graph was elaborated from.
    pub fn name(&self) -> Id {
        self.name
    }

    /// Primary inputs mapped to the vertex that consumes each one.
    pub fn pi(&self) -> &IndexMap<Id, Id> {
        &self.pi
    }

    /// Primary outputs mapped to the vertex that drives each one.
    pub fn po(&self) -> &IndexMap<Id, Id> {
        &self.po
    }

    pub fn vertices(&self) -> &IndexMap<Id, Vertex> {
        &self.vertices
    }

    pub fn vertex(&self, name: Id) -> Option<&Vertex> {
        self.vertices.get(&name)
    }

    pub fn vertex_mut(&mut self, name: Id) -> Option<&mut Vertex> {
        self.vertices.get_mut(&name)
    }

    pub fn edges(&self) -> &IndexMap<Id, Edge> {
        &self.edges
    }

    pub fn edge(&self, name: Id) -> Option<&Edge> {
        self.edges.get(&name)
    }

    /// The vertex behind a primary input or output.
    pub fn boundary(&self, port: Id) -> Option<Id> {
        self.pi.get(&port).or_else(|| self.po.get(&port)).copied()
    }

    /// Returns `true` if `name` is a primary input or output.
    pub fn is_boundary(&self, name: Id) -> bool {
        self.pi.contains_key(&name) || self.po.contains_key(&name)
    }

    /// Adds a vertex, returning a mutable handle to it.
    ///
    /// Returns `None` if a vertex of that name already exists.
    pub fn add_vertex(&mut self, name: Id, vertex: Vertex) -> Option<&mut Vertex> {
        match self.vertices.entry(name) {
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => Some(entry.insert(vertex)),
        }
    }

    /// Adds an edge. Returns `false` if an edge of that name already exists.
    pub fn add_edge(&mut self, name: Id, edge: Edge) -> bool {
        match self.edges.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(edge);
                true
            }
        }
    }

    /// Records `port` as a primary input landing on `vertex`.
    pub fn add_pi(&mut self, port: Id, vertex: Id) {
        self.pi.insert(port, vertex);
    }

    /// Records `port` as a primary output driven by `vertex`.
    pub fn add_po(&mut self, port: Id, vertex: Id) {
        self.po.insert(port, vertex);
    }
}
