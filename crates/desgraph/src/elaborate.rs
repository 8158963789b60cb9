//! Hierarchy elaboration: flattens module instances into per-module graphs.
//!
//! Every instance in a module is either a *leaf cell* (its type is not a
//! module of the design) or a *nested module*. Leaf cells become vertices
//! directly. Nested modules are elaborated first, memoized, and their
//! vertices and edges are copied into the parent under
//! `<instance>/<name>`.
//!
//! The boundary ports of a nested graph are not copied. Instead, every
//! connection the parent makes through an instance pin is routed to the
//! vertex behind the matching port of the nested graph, and the parent's
//! wire or port name is recorded on that vertex (a *boundary rename*).
//!
//! Modules move through three states while elaborating:
//!
//! ```text
//! Unvisited --build--> Building --done--> Built
//!     ^                   |
//!     +------failure------+
//! ```
//!
//! Reaching a `Building` module again means the instantiation hierarchy
//! contains a cycle. Warnings raised while elaborating a module are held
//! back until it reaches `Built`, so a failed module reports nothing.

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};

use desgraph_core::{
    graph::{Edge, Graph, Vertex},
    identifier::Id,
    module::{Instance, Module},
};
use desgraph_parser::error::{Diagnostic, DiagnosticSink, ErrorCode};

use crate::error::DesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Building,
    Built,
}

/// Memoized elaboration state of a design.
#[derive(Debug, Default)]
pub struct Hierarchy {
    leaf_cells: IndexSet<Id>,
    states: IndexMap<Id, BuildState>,
    graphs: IndexMap<Id, Rc<Graph>>,
    build_counts: IndexMap<Id, usize>,
    path: Vec<Id>,
}

impl Hierarchy {
    /// Types instantiated somewhere but never defined as modules.
    pub fn leaf_cells(&self) -> &IndexSet<Id> {
        &self.leaf_cells
    }

    pub fn is_leaf_cell(&self, name: Id) -> bool {
        self.leaf_cells.contains(&name)
    }

    /// The cached graph of `name`, if it has been built.
    pub fn graph(&self, name: Id) -> Option<&Rc<Graph>> {
        self.graphs.get(&name)
    }

    /// How many times `name` has been elaborated.
    ///
    /// Memoization keeps this at one per module unless the cache is
    /// invalidated.
    pub fn elaboration_count(&self, name: Id) -> usize {
        self.build_counts.get(&name).copied().unwrap_or(0)
    }

    /// Drops every cached graph and leaf registration.
    pub fn invalidate(&mut self) {
        debug!(graphs = self.graphs.len(); "Invalidating elaboration cache");
        self.leaf_cells.clear();
        self.states.clear();
        self.graphs.clear();
    }

    /// Registers every instantiated type that is not a module as a leaf
    /// cell.
    pub fn register_leaf_cells(&mut self, modules: &IndexMap<Id, Module>) {
        let types = modules
            .values()
            .flat_map(|module| module.instances().values())
            .map(Instance::module_name);
        for cell in types {
            if !modules.contains_key(&cell) && self.leaf_cells.insert(cell) {
                debug!(cell:% = cell; "Registered leaf cell");
            }
        }
    }

    /// Elaborates every module that has not been built yet.
    pub fn build_all(
        &mut self,
        modules: &IndexMap<Id, Module>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), DesError> {
        self.register_leaf_cells(modules);

        for name in modules.keys() {
            if self.states.get(name) != Some(&BuildState::Built) {
                self.build(*name, modules, sink)?;
            }
        }

        info!(
            graphs = self.graphs.len(),
            leaf_cells = self.leaf_cells.len();
            "Hierarchy elaborated"
        );
        Ok(())
    }

    /// Elaborates `name`, reusing cached graphs of nested modules.
    pub fn build(
        &mut self,
        name: Id,
        modules: &IndexMap<Id, Module>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Rc<Graph>, DesError> {
        match self.states.get(&name) {
            Some(BuildState::Built) => {
                if let Some(graph) = self.graphs.get(&name) {
                    return Ok(Rc::clone(graph));
                }
            }
            Some(BuildState::Building) => {
                let start = self.path.iter().position(|n| *n == name).unwrap_or(0);
                let mut path = self.path[start..].to_vec();
                path.push(name);
                return Err(DesError::HierarchyCycle { path });
            }
            None => {}
        }

        let module = modules.get(&name).ok_or(DesError::ModuleNotFound(name))?;

        debug!(module:% = name, depth = self.path.len(); "Elaborating module");
        self.states.insert(name, BuildState::Building);
        self.path.push(name);
        let mut pending: Vec<Diagnostic> = Vec::new();
        let result = self.elaborate(module, modules, sink, &mut pending);
        self.path.pop();

        match result {
            Ok(graph) => {
                for diag in pending {
                    sink.emit(diag);
                }
                let graph = Rc::new(graph);
                self.states.insert(name, BuildState::Built);
                self.graphs.insert(name, Rc::clone(&graph));
                *self.build_counts.entry(name).or_default() += 1;
                debug!(
                    module:% = name,
                    vertices = graph.vertices().len(),
                    edges = graph.edges().len();
                    "Module elaborated"
                );
                trace!(graph:?; "Elaborated graph");
                Ok(graph)
            }
            Err(err) => {
                debug!(module:% = name, dropped = pending.len(); "Elaboration failed");
                self.states.shift_remove(&name);
                Err(err)
            }
        }
    }

    /// Builds the graph of `module`.
    ///
    /// Nested modules report to `sink` once built; warnings about `module`
    /// itself go to `pending`.
    fn elaborate(
        &mut self,
        module: &Module,
        modules: &IndexMap<Id, Module>,
        sink: &mut dyn DiagnosticSink,
        pending: &mut Vec<Diagnostic>,
    ) -> Result<Graph, DesError> {
        let mut graph = Graph::new(module.name());
        let mut nested: IndexMap<Id, Rc<Graph>> = IndexMap::new();

        for instance in module.instances().values() {
            let cell = instance.module_name();
            let Some(target) = modules.get(&cell) else {
                self.leaf_cells.insert(cell);
                graph.add_vertex(instance.name(), Vertex::new(cell));
                continue;
            };

            let subgraph = self.build(cell, modules, sink)?;
            if let Some(pin) = instance
                .pin_to_wire()
                .keys()
                .find(|pin| !target.has_port(**pin))
            {
                return Err(DesError::UnknownPin {
                    module: module.name(),
                    instance: instance.name(),
                    pin: *pin,
                    target: cell,
                });
            }

            flatten(&mut graph, module.name(), instance, &subgraph, pending);
            nested.insert(instance.name(), subgraph);
        }

        let mut router = Router {
            module,
            nested: &nested,
            graph: &mut graph,
            sink: pending,
        };

        for (port, instance) in module.inputs() {
            match instance {
                Some(instance) => {
                    if let Some(vertex) = router.attach(*instance, *port) {
                        router.graph.add_pi(*port, vertex);
                    }
                }
                None => debug!(port:% = port; "Skipping unconnected input"),
            }
        }
        for (port, instance) in module.outputs() {
            match instance {
                Some(instance) => {
                    if let Some(vertex) = router.attach(*instance, *port) {
                        router.graph.add_po(*port, vertex);
                    }
                }
                None => debug!(port:% = port; "Skipping unconnected output"),
            }
        }

        for (name, wire) in module.wires() {
            let Some((first, second)) = wire.endpoints().pair() else {
                debug!(wire:% = name; "Skipping incomplete wire");
                continue;
            };
            let from = router.resolve(first, *name);
            let to = router.resolve(second, *name);
            if let (Some(from), Some(to)) = (from, to) {
                router.touch(from, *name);
                router.touch(to, *name);
                router.graph.add_edge(*name, Edge::new(from, to, wire.kind()));
            }
        }

        Ok(graph)
    }
}

/// Copies the vertices and edges of `subgraph` into `graph` under the
/// instance's name.
fn flatten(
    graph: &mut Graph,
    parent: Id,
    instance: &Instance,
    subgraph: &Graph,
    sink: &mut dyn DiagnosticSink,
) {
    let prefix = instance.name();

    for (name, vertex) in subgraph.vertices() {
        let mut flat = Vertex::new(vertex.cell());
        for wire in vertex.wires() {
            // Boundary names are re-attached under the parent's name.
            if !subgraph.is_boundary(*wire) {
                flat.touch(prefix.create_nested(*wire));
            }
        }
        graph.add_vertex(prefix.create_nested(*name), flat);
    }

    for (name, edge) in subgraph.edges() {
        graph.add_edge(
            prefix.create_nested(*name),
            Edge::new(
                prefix.create_nested(edge.from()),
                prefix.create_nested(edge.to()),
                edge.kind(),
            ),
        );
    }

    for port in subgraph.pi().keys().chain(subgraph.po().keys()) {
        if instance.wire(*port).is_none() {
            let diag = Diagnostic::warning(format!(
                "port `{port}` of instance `{prefix}` in `{parent}` is left unconnected"
            ))
            .with_code(ErrorCode::W004)
            .with_help(format!("connect it with `.{port}(...)`"));
            debug!(module:% = parent, instance:% = prefix, port:% = port; "Unconnected instance port");
            sink.emit(diag);
        }
    }
}

/// Resolves connections of a module's instances to vertices of its graph.
struct Router<'a, 'g> {
    module: &'a Module,
    nested: &'a IndexMap<Id, Rc<Graph>>,
    graph: &'g mut Graph,
    sink: &'a mut dyn DiagnosticSink,
}

impl Router<'_, '_> {
    /// Finds the vertex behind `instance`'s connection to `external`.
    ///
    /// Returns `None` if a nested instance has nothing behind the pin.
    fn resolve(&mut self, instance: Id, external: Id) -> Option<Id> {
        let Some(subgraph) = self.nested.get(&instance) else {
            return Some(instance);
        };

        let pin = self.module.instance(instance)?.pin(external)?;
        match subgraph.boundary(pin) {
            Some(inner) => Some(instance.create_nested(inner)),
            None => {
                let diag = Diagnostic::warning(format!(
                    "`{external}` connects to pin `{pin}` of `{instance}`, which reaches no vertex"
                ))
                .with_code(ErrorCode::W005)
                .with_help(format!(
                    "port `{pin}` is not connected inside `{}`",
                    subgraph.name()
                ));
                debug!(module:% = self.module.name(), instance:% = instance, pin:% = pin; "Unresolved boundary");
                self.sink.emit(diag);
                None
            }
        }
    }

    /// Records `external` on `vertex`.
    fn touch(&mut self, vertex: Id, external: Id) {
        if let Some(v) = self.graph.vertex_mut(vertex) {
            v.touch(external);
        }
        trace!(wire:% = external, vertex:% = vertex; "Attached connection");
    }

    fn attach(&mut self, instance: Id, external: Id) -> Option<Id> {
        let vertex = self.resolve(instance, external)?;
        self.touch(vertex, external);
        Some(vertex)
    }
}
