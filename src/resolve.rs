//! Capability resolution
//!
//! Resolution walks the parent graph depth-first, left to right, starting at the node an
//! instance was materialized from. A node already visited is never visited again, so a
//! shared ancestor under a diamond is seen exactly once (through the leftmost path) and the
//! walk terminates on any graph. The first node in walk order defining the requested
//! capability wins

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};
use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::error::{LineageError, Result};
use crate::hierarchy::{BehaviorNode, Hierarchy};
use crate::id::NodeId;

/// The visit order from one originating node, along with the tree edge each node was
/// first reached through
#[derive(Debug)]
pub(crate) struct Walk {
    order: Vec<NodeId>,
    reached_from: HashMap<NodeId, NodeId>,
}

impl Walk {
    pub(crate) fn new(hierarchy: &Hierarchy, origin: NodeId) -> Self {
        let mut order = Vec::new();
        let mut reached_from = HashMap::new();
        let mut visited = HashSet::new();

        // parents are pushed in reverse so the leftmost is popped first
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(origin, None)];

        while let Some((id, via)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(via) = via {
                reached_from.insert(id, via);
            }
            order.push(id);

            let Some(node) = hierarchy.node_by_id(id) else {
                continue;
            };
            for parent in node.parents().iter().rev() {
                if !visited.contains(parent) {
                    stack.push((*parent, Some(id)));
                }
            }
        }

        Walk {
            order,
            reached_from,
        }
    }

    fn origin(&self) -> Option<NodeId> {
        self.order.first().copied()
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|n| *n == id)
    }

    fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(via) = self.reached_from.get(&current) {
            path.push(*via);
            current = *via;
        }
        path.reverse();
        path
    }
}

/// The outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    origin: NodeId,
    node: NodeId,
    capability: String,
    position: usize,
    path: Vec<NodeId>,
}

impl Resolution {
    /// The node resolution started from
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// The node whose definition applies
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Index of the defining node in the origin's linearization
    pub fn position(&self) -> usize {
        self.position
    }

    /// The parent edges followed from the origin to the defining node, both ends included
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }
}

/// The complete resolution order from one node
pub struct Linearization<'h> {
    hierarchy: &'h Hierarchy,
    walk: Arc<Walk>,
}

impl<'h> Linearization<'h> {
    pub(crate) fn new(hierarchy: &'h Hierarchy, walk: Arc<Walk>) -> Self {
        Self { hierarchy, walk }
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.walk.order
    }

    pub fn len(&self) -> usize {
        self.walk.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walk.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'h BehaviorNode> + '_ {
        let hierarchy = self.hierarchy;
        self.walk
            .order
            .iter()
            .filter_map(move |id| hierarchy.node_by_id(*id))
    }

    pub fn names(&self) -> Vec<&'h str> {
        self.iter().map(|node| node.name()).collect()
    }
}

impl Display for Linearization<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().map(|node| node.name()).join(" -> "))
    }
}

/// Resolves `capability` for instances of `origin`
pub(crate) fn resolve(hierarchy: &Hierarchy, origin: NodeId, capability: &str) -> Result<Resolution> {
    let walk = hierarchy.walk(origin);
    resolve_in(hierarchy, &walk, 0, capability)
}

/// Resolves `capability` for instances of `origin`, considering only nodes after `after` in
/// the origin's walk order
///
/// This is how a definition reaches the next definition of the same capability further
/// up the graph
pub(crate) fn resolve_after(
    hierarchy: &Hierarchy,
    origin: NodeId,
    after: NodeId,
    capability: &str,
) -> Result<Resolution> {
    let walk = hierarchy.walk(origin);
    let start = walk
        .position(after)
        .map(|position| position + 1)
        .unwrap_or(walk.order.len());
    resolve_in(hierarchy, &walk, start, capability)
}

fn resolve_in(hierarchy: &Hierarchy, walk: &Walk, start: usize, capability: &str) -> Result<Resolution> {
    let origin = walk.origin().ok_or_else(|| {
        LineageError::NodeDoesntExist("{empty walk}".to_string())
    })?;

    let found = walk
        .order
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, id)| {
            hierarchy
                .node_by_id(**id)
                .map_or(false, |node| node.defines(capability))
        });

    match found {
        Some((position, id)) => {
            debug!(
                origin = %hierarchy.name_of(origin),
                capability,
                resolved = %hierarchy.name_of(*id),
                position,
                "resolved capability"
            );
            Ok(Resolution {
                origin,
                node: *id,
                capability: capability.to_string(),
                position,
                path: walk.path_to(*id),
            })
        }
        None => {
            debug!(origin = %hierarchy.name_of(origin), capability, "capability not found");
            Err(LineageError::CapabilityNotFound {
                node: hierarchy.name_of(origin).to_string(),
                capability: capability.to_string(),
            })
        }
    }
}
