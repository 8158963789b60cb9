//! The structural netlist model: modules, their ports and wires, and the cell
//! instances that connect to them.
//!
//! A [`Module`] is assembled statement by statement by the parser and is
//! treated as immutable once parsing completes. Its [`fmt::Display`]
//! implementation regenerates the declarative source in declaration order, so
//! rendering is deterministic and re-parsing the output yields an equal
//! module.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::identifier::Id;

/// Direction of a module port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// The keyword that declares a port in this direction.
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The two semantic kinds of internal wire.
///
/// Both kinds are structurally identical point-to-point connections; the kind
/// is carried through elaboration onto the resulting graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    Dependency,
    Stream,
}

impl WireKind {
    /// The literal used for this kind in a `wire` declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            WireKind::Dependency => "dependency",
            WireKind::Stream => "stream",
        }
    }

    /// Parses the literal used in a `wire` declaration.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "dependency" => Some(WireKind::Dependency),
            "stream" => Some(WireKind::Stream),
            _ => None,
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The two ordered endpoint slots of a wire.
///
/// Slots fill in connection order: the first instance to connect takes the
/// first slot, the second instance the second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Endpoints([Option<Id>; 2]);

impl Endpoints {
    /// Places `instance` in the first free slot.
    ///
    /// Returns `false` and leaves the slots untouched if both are taken.
    pub fn push(&mut self, instance: Id) -> bool {
        match self.0.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(instance);
                true
            }
            None => false,
        }
    }

    /// Both endpoints, if the wire is fully connected.
    pub fn pair(&self) -> Option<(Id, Id)> {
        Some((self.0[0]?, self.0[1]?))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == 2
    }

    /// Iterates over the occupied slots in order.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.0.iter().flatten().copied()
    }
}

/// A declared internal wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    kind: WireKind,
    endpoints: Endpoints,
}

impl Wire {
    /// Creates a wire of `kind` with both endpoint slots empty.
    pub fn new(kind: WireKind) -> Self {
        Self {
            kind,
            endpoints: Endpoints::default(),
        }
    }

    pub fn kind(&self) -> WireKind {
        self.kind
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn endpoints_mut(&mut self) -> &mut Endpoints {
        &mut self.endpoints
    }
}

/// One use of a module or leaf cell inside another module.
///
/// Pins and the wires/ports they connect to form a bijection: a pin appears
/// at most once and so does a wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    name: Id,
    module_name: Id,
    pin_to_wire: IndexMap<Id, Id>,
    wire_to_pin: IndexMap<Id, Id>,
}

impl Instance {
    /// Creates an instance of `module_name` with no connections.
    pub fn new(name: Id, module_name: Id) -> Self {
        Self {
            name,
            module_name,
            pin_to_wire: IndexMap::new(),
            wire_to_pin: IndexMap::new(),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// The instantiated type: a module in the design or a leaf cell.
    pub fn module_name(&self) -> Id {
        self.module_name
    }

    /// Records a pin connection.
    ///
    /// Returns `false` without modifying the instance if either the pin or
    /// the wire is already connected.
    pub fn connect(&mut self, pin: Id, wire: Id) -> bool {
        if self.pin_to_wire.contains_key(&pin) || self.wire_to_pin.contains_key(&wire) {
            return false;
        }
        self.pin_to_wire.insert(pin, wire);
        self.wire_to_pin.insert(wire, pin);
        true
    }

    pub fn pin_to_wire(&self) -> &IndexMap<Id, Id> {
        &self.pin_to_wire
    }

    pub fn wire_to_pin(&self) -> &IndexMap<Id, Id> {
        &self.wire_to_pin
    }

    /// The wire or port connected to `pin`.
    pub fn wire(&self, pin: Id) -> Option<Id> {
        self.pin_to_wire.get(&pin).copied()
    }

    /// The pin through which this instance connects to `wire`.
    pub fn pin(&self, wire: Id) -> Option<Id> {
        self.wire_to_pin.get(&wire).copied()
    }

    pub fn connection_count(&self) -> usize {
        self.pin_to_wire.len()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.module_name, self.name)?;
        for (idx, (pin, wire)) in self.pin_to_wire.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, ".{pin}({wire})")?;
        }
        f.write_str(");")
    }
}

/// A named declarative unit with ports, wires, and instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: Id,
    ports: IndexSet<Id>,
    inputs: IndexMap<Id, Option<Id>>,
    outputs: IndexMap<Id, Option<Id>>,
    wires: IndexMap<Id, Wire>,
    instances: IndexMap<Id, Instance>,
}

impl Module {
    /// Creates an empty module called `name`.
    pub fn new(name: Id) -> Self {
        Self {
            name,
            ports: IndexSet::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            wires: IndexMap::new(),
            instances: IndexMap::new(),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// Ports in header order.
    pub fn ports(&self) -> &IndexSet<Id> {
        &self.ports
    }

    /// Input ports mapped to the instance consuming them, if any.
    pub fn inputs(&self) -> &IndexMap<Id, Option<Id>> {
        &self.inputs
    }

    /// Output ports mapped to the instance driving them, if any.
    pub fn outputs(&self) -> &IndexMap<Id, Option<Id>> {
        &self.outputs
    }

    /// All wires of either kind, in declaration order.
    pub fn wires(&self) -> &IndexMap<Id, Wire> {
        &self.wires
    }

    pub fn wire(&self, name: Id) -> Option<&Wire> {
        self.wires.get(&name)
    }

    pub fn dependency_wires(&self) -> impl Iterator<Item = (Id, &Wire)> {
        self.wires_of(WireKind::Dependency)
    }

    pub fn stream_wires(&self) -> impl Iterator<Item = (Id, &Wire)> {
        self.wires_of(WireKind::Stream)
    }

    fn wires_of(&self, kind: WireKind) -> impl Iterator<Item = (Id, &Wire)> {
        self.wires
            .iter()
            .filter(move |(_, wire)| wire.kind() == kind)
            .map(|(name, wire)| (*name, wire))
    }

    /// Instances in declaration order.
    pub fn instances(&self) -> &IndexMap<Id, Instance> {
        &self.instances
    }

    pub fn instance(&self, name: Id) -> Option<&Instance> {
        self.instances.get(&name)
    }

    pub fn has_port(&self, name: Id) -> bool {
        self.ports.contains(&name)
    }

    /// The declared direction of `port`, or `None` if it is not classified.
    pub fn direction(&self, port: Id) -> Option<Direction> {
        if self.inputs.contains_key(&port) {
            Some(Direction::Input)
        } else if self.outputs.contains_key(&port) {
            Some(Direction::Output)
        } else {
            None
        }
    }

    /// The instance recorded against a classified port.
    pub fn port_instance(&self, port: Id) -> Option<Id> {
        self.inputs
            .get(&port)
            .or_else(|| self.outputs.get(&port))
            .copied()
            .flatten()
    }

    /// Adds a header port. Returns `false` if it already exists.
    pub fn add_port(&mut self, name: Id) -> bool {
        self.ports.insert(name)
    }

    /// Classifies a header port.
    ///
    /// Returns `false` if the name is not a port or is already classified.
    pub fn classify_port(&mut self, port: Id, direction: Direction) -> bool {
        if !self.has_port(port) || self.direction(port).is_some() {
            return false;
        }
        match direction {
            Direction::Input => self.inputs.insert(port, None),
            Direction::Output => self.outputs.insert(port, None),
        };
        true
    }

    /// Records `instance` as the consumer/driver of a classified port.
    ///
    /// Returns `false` if the port is unclassified or already has an
    /// instance.
    pub fn set_port_instance(&mut self, port: Id, instance: Id) -> bool {
        let slot = match self.direction(port) {
            Some(Direction::Input) => self.inputs.get_mut(&port),
            Some(Direction::Output) => self.outputs.get_mut(&port),
            None => None,
        };
        match slot {
            Some(slot) if slot.is_none() => {
                *slot = Some(instance);
                true
            }
            _ => false,
        }
    }

    /// Declares a wire. Returns `false` if a wire or port of that name exists.
    pub fn add_wire(&mut self, name: Id, kind: WireKind) -> bool {
        if self.wires.contains_key(&name) || self.has_port(name) {
            return false;
        }
        self.wires.insert(name, Wire::new(kind));
        true
    }

    pub fn wire_mut(&mut self, name: Id) -> Option<&mut Wire> {
        self.wires.get_mut(&name)
    }

    /// Adds an instance. Returns `false` if the name is taken.
    pub fn add_instance(&mut self, instance: Instance) -> bool {
        if self.instances.contains_key(&instance.name()) {
            return false;
        }
        self.instances.insert(instance.name(), instance);
        true
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module {}(", self.name)?;
        for (idx, port) in self.ports.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{port}")?;
        }
        f.write_str(");\n")?;

        // Classification order follows the header, not declaration order.
        for port in &self.ports {
            if let Some(direction) = self.direction(*port) {
                writeln!(f, "  {direction} {port};")?;
            }
        }
        for (name, wire) in &self.wires {
            writeln!(f, "  wire {name} {};", wire.kind())?;
        }
        for instance in self.instances.values() {
            writeln!(f, "  {instance}")?;
        }
        f.write_str("endmodule\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Id {
        Id::new(name)
    }

    #[test]
    fn test_endpoints_fill_in_order() {
        let mut endpoints = Endpoints::default();
        assert!(endpoints.is_empty());

        assert!(endpoints.push(id("i1")));
        assert_eq!(endpoints.iter().collect::<Vec<_>>(), vec![id("i1")]);
        assert_eq!(endpoints.pair(), None);

        assert!(endpoints.push(id("i2")));
        assert!(endpoints.is_full());
        assert_eq!(endpoints.pair(), Some((id("i1"), id("i2"))));

        assert!(!endpoints.push(id("i3")));
        assert_eq!(endpoints.iter().collect::<Vec<_>>(), vec![id("i1"), id("i2")]);
    }

    #[test]
    fn test_instance_connections_are_bijective() {
        let mut inst = Instance::new(id("i1"), id("INV"));

        assert!(inst.connect(id("i"), id("a")));
        assert!(!inst.connect(id("i"), id("b")), "pin reused");
        assert!(!inst.connect(id("o"), id("a")), "wire reused");
        assert!(inst.connect(id("o"), id("w")));

        assert_eq!(inst.wire(id("o")), Some(id("w")));
        assert_eq!(inst.pin(id("a")), Some(id("i")));
        assert_eq!(inst.connection_count(), 2);
    }

    #[test]
    fn test_port_classification_is_exclusive() {
        let mut module = Module::new(id("M"));
        module.add_port(id("a"));

        assert!(!module.classify_port(id("zz"), Direction::Input));
        assert!(module.classify_port(id("a"), Direction::Input));
        assert!(!module.classify_port(id("a"), Direction::Input));
        assert!(!module.classify_port(id("a"), Direction::Output));
        assert_eq!(module.direction(id("a")), Some(Direction::Input));
    }

    #[test]
    fn test_port_instance_single_claim() {
        let mut module = Module::new(id("M"));
        module.add_port(id("b"));
        assert!(!module.set_port_instance(id("b"), id("i1")), "unclassified");

        module.classify_port(id("b"), Direction::Output);
        assert!(module.set_port_instance(id("b"), id("i1")));
        assert!(!module.set_port_instance(id("b"), id("i2")));
        assert_eq!(module.port_instance(id("b")), Some(id("i1")));
    }

    #[test]
    fn test_wire_names_do_not_collide() {
        let mut module = Module::new(id("M"));
        module.add_port(id("a"));

        assert!(module.add_wire(id("w"), WireKind::Stream));
        assert!(!module.add_wire(id("w"), WireKind::Dependency));
        assert!(!module.add_wire(id("a"), WireKind::Dependency));
        assert_eq!(module.stream_wires().count(), 1);
        assert_eq!(module.dependency_wires().count(), 0);
    }

    #[test]
    fn test_display_renders_declarations_in_order() {
        let mut module = Module::new(id("M1"));
        module.add_port(id("a"));
        module.add_port(id("b"));
        module.classify_port(id("b"), Direction::Output);
        module.classify_port(id("a"), Direction::Input);
        module.add_wire(id("w"), WireKind::Dependency);

        let mut i1 = Instance::new(id("i1"), id("INV"));
        i1.connect(id("i"), id("a"));
        i1.connect(id("o"), id("w"));
        module.add_instance(i1);

        let expected = "module M1(a, b);\n  input a;\n  output b;\n  wire w dependency;\n  INV i1(.i(a), .o(w));\nendmodule\n";
        assert_eq!(module.to_string(), expected);
        assert_eq!(module.to_string(), module.to_string());
    }
}
