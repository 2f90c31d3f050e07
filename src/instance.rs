//! Instance
//!
//! A materialized, stateful realization of one behavior node

use std::collections::BTreeMap;

use crate::{id::NodeId, value::Value};

/// An `Instance` is created from exactly one [crate::BehaviorNode]
///
/// Its attributes are private to it, they are populated by the constructor capability and
/// may only be changed afterwards through a [crate::Receiver] handed to an invoked capability
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    node: NodeId,
    attributes: BTreeMap<String, Value>,
}

impl Instance {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            attributes: BTreeMap::new(),
        }
    }

    /// The node this instance was materialized from
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attributes in name order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn set(&mut self, name: String, value: Value) -> Option<Value> {
        self.attributes.insert(name, value)
    }
}
