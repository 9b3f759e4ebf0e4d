/// The construction-node graph.
///
/// Owns the evaluated counterparts of ACT nodes. The evaluator adds nodes
/// as it runs and detaches the inputs a boolean, wire, or face composite
/// consumes. Hosts own the document's lifetime; the engine assumes
/// single-writer access for the duration of one program run.
use crate::ast::Command;
use crate::backend::ShapeHandle;
use crate::material::MaterialId;
use std::collections::HashMap;

/// Id of a node in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// The topological class of a node's shape, used to enforce the 2D-profile
/// preconditions of prism, revolve, and sweep without geometry math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    Solid,
    /// A multi-solid boolean result that could not be reduced to one solid.
    Compound,
    Face,
    Wire,
    Edge,
    /// No geometry at all (folders).
    Empty,
}

/// Where a node came from. Provenance owns the originating command with its
/// literal field values outright, so reverse serialization never needs to
/// chase document references; consumed operands re-emit as nested
/// sub-commands even after they were detached.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Command(Command),
    /// Imported or host-inserted geometry; serialization of these is lossy.
    External,
}

/// The evaluated counterpart of an ACT node.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionNode {
    /// Backend shape handle; `None` for non-geometric nodes (folders).
    pub shape: Option<ShapeHandle>,
    pub class: ShapeClass,
    pub provenance: Provenance,
    pub material: Option<MaterialId>,
}

/// Insertion-ordered node store.
#[derive(Debug, Default)]
pub struct Document {
    nodes: HashMap<NodeId, ConstructionNode>,
    order: Vec<NodeId>,
    next: u64,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: ConstructionNode) -> NodeId {
        self.next += 1;
        let id = NodeId(self.next);
        self.nodes.insert(id, node);
        self.order.push(id);
        id
    }

    /// Admit a shape with no recorded provenance (imported geometry).
    pub fn insert_external(&mut self, shape: ShapeHandle, class: ShapeClass) -> NodeId {
        self.add(ConstructionNode {
            shape: Some(shape),
            class,
            provenance: Provenance::External,
            material: None,
        })
    }

    /// Remove a node that was consumed by a composite operation.
    pub fn detach(&mut self, id: NodeId) -> Option<ConstructionNode> {
        let node = self.nodes.remove(&id);
        if node.is_some() {
            self.order.retain(|n| *n != id);
        }
        node
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ConstructionNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ConstructionNode> {
        self.nodes.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ConstructionNode)> {
        self.order.iter().filter_map(|id| {
            let node = self.nodes.get(id)?;
            Some((*id, node))
        })
    }
}
