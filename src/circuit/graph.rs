//! Circuit graph structure.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::types::{ComponentId, DisjointSet, NodeId, Params, TerminalRef};
use crate::catalog::Catalog;
use crate::components::Component;
use crate::error::{CircuitError, Result};

/// A set of terminals tied together.
#[derive(Debug, Clone, PartialEq)]
pub struct Net {
    pub terminals: Vec<TerminalRef>,
}

/// A circuit: components, nets and the ground designation.
///
/// Nets are kept as a union-find forest over terminal slots. A freshly added
/// terminal is its own singleton net; [`Circuit::connect`] merges nets.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    catalog: Arc<Catalog>,

    /// All components, indexed by `ComponentId`
    components: Vec<Component>,

    /// Mapping from display names to component IDs
    names: HashMap<String, ComponentId>,

    /// First terminal slot of each component
    offsets: Vec<usize>,

    /// Union-find over terminal slots
    forest: DisjointSet,

    /// Terminal whose net is the 0V reference
    ground: Option<TerminalRef>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    /// Create an empty circuit backed by the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    /// Create an empty circuit backed by a custom catalog.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            components: Vec::new(),
            names: HashMap::new(),
            offsets: Vec::new(),
            forest: DisjointSet::default(),
            ground: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Add a component with a generated display name (`R1`, `R2`, ...).
    ///
    /// Parameters are validated against the catalog spec for `kind`.
    pub fn add_component(&mut self, kind: &str, params: &Params) -> Result<ComponentId> {
        let spec = self.catalog.lookup(kind)?;
        let name = (1..)
            .map(|n| format!("{}{}", spec.prefix, n))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_default();
        self.add_named_component(&name, kind, params)
    }

    /// Add a component under an explicit display name.
    pub fn add_named_component(&mut self, name: &str, kind: &str, params: &Params) -> Result<ComponentId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CircuitError::invalid_parameter(
                name,
                "id",
                "component name must not be empty",
            ));
        }
        if self.names.contains_key(name) {
            return Err(CircuitError::DuplicateComponent {
                name: name.to_string(),
            });
        }

        let spec = self.catalog.lookup(kind)?.clone();
        let id = ComponentId(self.components.len());
        let component = Component::new(id, name.to_string(), spec, params)?;

        self.offsets.push(self.forest.len());
        for _ in &component.terminals {
            self.forest.push();
        }
        debug!(component = %component.name, kind = component.kind(), "added component");

        self.names.insert(component.name.clone(), id);
        self.components.push(component);
        Ok(id)
    }

    /// Tie two terminals into the same net.
    ///
    /// Self-connections and terminals already in one net are no-ops.
    pub fn connect(&mut self, a: TerminalRef, b: TerminalRef) -> Result<()> {
        let (sa, sb) = (self.slot(a)?, self.slot(b)?);
        self.forest.union(sa, sb);
        Ok(())
    }

    /// Designate the net containing `terminal` as the 0V reference,
    /// replacing any previous designation.
    pub fn set_ground(&mut self, terminal: TerminalRef) -> Result<()> {
        self.slot(terminal)?;
        self.ground = Some(terminal);
        Ok(())
    }

    /// The designated ground terminal, if any.
    pub fn ground(&self) -> Option<TerminalRef> {
        self.ground
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Find a component ID by display name.
    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name.trim()).copied()
    }

    /// Resolve `component` + pin name (or alias, or 1-based number).
    pub fn terminal(&self, component: &str, pin: &str) -> Result<TerminalRef> {
        let id = self
            .find_component(component)
            .ok_or_else(|| CircuitError::UnknownComponent {
                name: component.to_string(),
            })?;
        let c = &self.components[id.0];
        c.spec
            .terminal_index(&c.params, pin)
            .map(|index| TerminalRef::new(id, index))
            .ok_or_else(|| CircuitError::unknown_terminal(component, pin))
    }

    /// `"R1.end"` style label of a terminal.
    pub fn terminal_label(&self, terminal: TerminalRef) -> String {
        match self.component(terminal.component) {
            Some(c) => c.terminal_label(terminal.index),
            None => terminal.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Check whether two terminals are in the same net.
    pub fn same_net(&self, a: TerminalRef, b: TerminalRef) -> Result<bool> {
        Ok(self.forest.same(self.slot(a)?, self.slot(b)?))
    }

    /// All nets, ordered by their first terminal.
    pub fn nets(&self) -> Vec<Net> {
        let map = self.net_map();
        (0..map.len())
            .map(|n| Net {
                terminals: map.members(NodeId(n)).to_vec(),
            })
            .collect()
    }

    /// Every terminal of every component, in slot order.
    pub fn terminal_refs(&self) -> impl Iterator<Item = TerminalRef> + '_ {
        self.components.iter().flat_map(|c| {
            (0..c.terminals.len()).map(move |index| TerminalRef::new(c.id, index))
        })
    }

    /// Number nets for one solve: the ground net (if any) is node 0, the
    /// rest follow in order of their first terminal.
    pub fn net_map(&self) -> NetMap {
        let mut node_of_root: HashMap<usize, NodeId> = HashMap::new();
        let mut members: Vec<Vec<TerminalRef>> = Vec::new();

        if let Some(ground) = self.ground {
            let root = self.forest.find(self.slot_unchecked(ground));
            node_of_root.insert(root, NodeId::GROUND);
            members.push(Vec::new());
        }

        let mut per_component = Vec::with_capacity(self.components.len());
        for c in &self.components {
            let mut nodes = Vec::with_capacity(c.terminals.len());
            for index in 0..c.terminals.len() {
                let terminal = TerminalRef::new(c.id, index);
                let root = self.forest.find(self.slot_unchecked(terminal));
                let node = *node_of_root.entry(root).or_insert_with(|| {
                    members.push(Vec::new());
                    NodeId(members.len() - 1)
                });
                members[node.0].push(terminal);
                nodes.push(node);
            }
            per_component.push(nodes);
        }

        NetMap {
            per_component,
            members,
            grounded: self.ground.is_some(),
        }
    }

    fn slot(&self, terminal: TerminalRef) -> Result<usize> {
        let c = self
            .components
            .get(terminal.component.0)
            .ok_or_else(|| CircuitError::UnknownComponent {
                name: terminal.component.to_string(),
            })?;
        if terminal.index >= c.terminals.len() {
            return Err(CircuitError::unknown_terminal(
                &c.name,
                (terminal.index + 1).to_string(),
            ));
        }
        Ok(self.offsets[terminal.component.0] + terminal.index)
    }

    fn slot_unchecked(&self, terminal: TerminalRef) -> usize {
        self.offsets[terminal.component.0] + terminal.index
    }
}

/// Net numbering for one solve.
///
/// Node identity is only meaningful for the `NetMap` it came from.
#[derive(Debug, Clone)]
pub struct NetMap {
    per_component: Vec<Vec<NodeId>>,
    members: Vec<Vec<TerminalRef>>,
    grounded: bool,
}

impl NetMap {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether node 0 is a designated ground (rather than the first net).
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Nodes of each terminal of a component, in terminal order.
    pub fn nodes_of(&self, id: ComponentId) -> &[NodeId] {
        &self.per_component[id.0]
    }

    pub fn node(&self, terminal: TerminalRef) -> NodeId {
        self.per_component[terminal.component.0][terminal.index]
    }

    /// Terminals joined at a node.
    pub fn members(&self, node: NodeId) -> &[TerminalRef] {
        &self.members[node.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::params;

    fn divider() -> (Circuit, ComponentId, ComponentId, ComponentId) {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        let r1 = c.add_component("resistor", &params([("resistance", 1000.0)])).unwrap();
        let r2 = c.add_component("resistor", &params([("resistance", 2000.0)])).unwrap();
        (c, v, r1, r2)
    }

    #[test]
    fn test_generated_names() {
        let (c, v, r1, r2) = divider();
        assert_eq!(c.component(v).unwrap().name, "V1");
        assert_eq!(c.component(r1).unwrap().name, "R1");
        assert_eq!(c.component(r2).unwrap().name, "R2");
        assert_eq!(c.find_component("R2"), Some(r2));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut c = Circuit::new();
        c.add_named_component("R1", "resistor", &params([("resistance", 1.0)])).unwrap();
        let err = c
            .add_named_component("R1", "resistor", &params([("resistance", 2.0)]))
            .unwrap_err();
        assert!(matches!(err, CircuitError::DuplicateComponent { .. }));
    }

    #[test]
    fn test_connect_is_idempotent() {
        let (mut once, v, r1, _) = divider();
        let a = TerminalRef::new(v, 0);
        let b = TerminalRef::new(r1, 0);
        once.connect(a, b).unwrap();

        let mut twice = once.clone();
        twice.connect(a, b).unwrap();
        twice.connect(b, a).unwrap();
        twice.connect(a, a).unwrap();
        assert_eq!(once, twice);
        assert!(twice.same_net(a, b).unwrap());
    }

    #[test]
    fn test_fresh_terminals_are_singleton_nets() {
        let (c, _, _, _) = divider();
        let nets = c.nets();
        assert_eq!(nets.len(), 6);
        assert!(nets.iter().all(|net| net.terminals.len() == 1));
    }

    #[test]
    fn test_ground_is_node_zero() {
        let (mut c, v, r1, r2) = divider();
        c.connect(TerminalRef::new(r2, 1), TerminalRef::new(v, 1)).unwrap();
        c.set_ground(TerminalRef::new(r2, 1)).unwrap();
        let map = c.net_map();
        assert!(map.is_grounded());
        assert_eq!(map.node(TerminalRef::new(v, 1)), NodeId::GROUND);
        assert_eq!(map.members(NodeId::GROUND).len(), 2);
        assert!(!map.node(TerminalRef::new(r1, 0)).is_ground());
    }

    #[test]
    fn test_set_ground_replaces_previous() {
        let (mut c, v, r1, _) = divider();
        c.set_ground(TerminalRef::new(v, 1)).unwrap();
        c.set_ground(TerminalRef::new(r1, 1)).unwrap();
        assert_eq!(c.ground(), Some(TerminalRef::new(r1, 1)));
    }

    #[test]
    fn test_terminal_resolution() {
        let (c, v, _, _) = divider();
        assert_eq!(c.terminal("V1", "+").unwrap(), TerminalRef::new(v, 0));
        assert_eq!(c.terminal("V1", "neg").unwrap(), TerminalRef::new(v, 1));
        assert!(matches!(
            c.terminal("V1", "wiper"),
            Err(CircuitError::UnknownTerminal { .. })
        ));
        assert!(matches!(
            c.terminal("R9", "start"),
            Err(CircuitError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn test_connect_unknown_terminal_fails() {
        let (mut c, v, _, _) = divider();
        let err = c
            .connect(TerminalRef::new(v, 0), TerminalRef::new(v, 5))
            .unwrap_err();
        assert!(matches!(err, CircuitError::UnknownTerminal { .. }));
    }
}
