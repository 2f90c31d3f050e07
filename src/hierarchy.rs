//! Hierarchy
//!
//! Behavior nodes, their definitions, and the validated graph they form

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug};
use std::sync::Arc;

use dashmap::DashMap;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::config::HierarchyConfig;
use crate::error::{LineageError, Result};
use crate::id::{CapabilityId, NodeId};
use crate::instance::Instance;
use crate::receiver::{self, CapabilityResult, Receiver};
use crate::resolve::{self, Linearization, Resolution, Walk};
use crate::transcript::Transcript;
use crate::value::Value;

pub(crate) type Action = Arc<dyn Fn(&mut Receiver<'_>) -> CapabilityResult + Send + Sync>;

/// A named action defined locally on a [BehaviorNode]
#[derive(Clone)]
pub struct Capability {
    name: String,
    action: Action,
}

impl Capability {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> CapabilityId {
        CapabilityId::of(&self.name)
    }

    pub(crate) fn run(&self, receiver: &mut Receiver<'_>) -> CapabilityResult {
        (self.action)(receiver)
    }
}

impl Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.name)
    }
}

/// A `BehaviorNode` is a named grouping of capabilities and an ordered list of parents
///
/// Nodes are only ever created by [HierarchyBuilder::build] and are immutable once built
#[derive(Debug)]
pub struct BehaviorNode {
    id: NodeId,
    name: String,
    parents: Vec<NodeId>,
    capabilities: HashMap<CapabilityId, Capability>,
}

impl BehaviorNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parents in declaration order, the order resolution visits them in
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// True if this node itself defines the capability, ancestors are not consulted
    pub fn defines(&self, capability: &str) -> bool {
        self.capability(capability).is_some()
    }

    /// The local definition of `name`, an id hit under a different name is a miss
    pub(crate) fn capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities
            .get(&CapabilityId::of(name))
            .filter(|capability| capability.name() == name)
    }

    /// Locally defined capability names, sorted
    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.values().map(|c| c.name()).sorted()
    }
}

/// Declarative definition of a node, consumed by a [HierarchyBuilder]
///
/// ```
/// use lineage::{Hierarchy, NodeDef};
///
/// let hierarchy = Hierarchy::builder()
///     .node(NodeDef::new("Animal").capability("speak", |slf| {
///         slf.say("Animals can make sounds.");
///         Ok(None)
///     }))
///     .node(NodeDef::new("Dog").parent("Animal"))
///     .build()
///     .unwrap();
///
/// assert_eq!(hierarchy.resolve("Dog", "speak").unwrap().node(), hierarchy.node("Animal").unwrap().id());
/// ```
#[derive(Debug)]
pub struct NodeDef {
    name: String,
    parents: Vec<String>,
    capabilities: Vec<Capability>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a parent, parents are resolved left to right in the order they're added
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parents.push(name.into());
        self
    }

    pub fn parents<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents.extend(names.into_iter().map(Into::into));
        self
    }

    /// Defines a capability on this node, redefining a name replaces the earlier action
    pub fn capability<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Receiver<'_>) -> CapabilityResult + Send + Sync + 'static,
    {
        self.capabilities.push(Capability {
            name: name.into(),
            action: Arc::new(action),
        });
        self
    }
}

/// Collects node definitions in any order and validates them into a [Hierarchy]
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    config: HierarchyConfig,
    defs: Vec<NodeDef>,
}

impl HierarchyBuilder {
    pub fn with_config(mut self, config: HierarchyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn node(mut self, def: NodeDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn push(&mut self, def: NodeDef) {
        self.defs.push(def);
    }

    /// Validates the collected definitions and freezes them into a [Hierarchy]
    ///
    /// Fails if a name is defined twice, a parent is unknown or listed twice on the same
    /// node, or the parent graph contains a cycle
    pub fn build(self) -> Result<Hierarchy> {
        let mut known = HashSet::with_capacity(self.defs.len());
        for def in &self.defs {
            if !known.insert(NodeId::of(&def.name)) {
                return Err(LineageError::DuplicateNode(def.name.clone()));
            }
        }

        let mut nodes = HashMap::with_capacity(self.defs.len());
        let mut order = Vec::with_capacity(self.defs.len());

        for def in self.defs {
            if let Some(parent) = def.parents.iter().duplicates().next() {
                return Err(LineageError::DuplicateParent {
                    node: def.name.clone(),
                    parent: parent.clone(),
                });
            }

            let mut parents = Vec::with_capacity(def.parents.len());
            for parent in &def.parents {
                let parent_id = NodeId::of(parent);
                if !known.contains(&parent_id) {
                    return Err(LineageError::NodeDoesntExist(parent.clone()));
                }
                parents.push(parent_id);
            }

            let capabilities: HashMap<CapabilityId, Capability> = def
                .capabilities
                .into_iter()
                .map(|capability| (capability.id(), capability))
                .collect();

            let id = NodeId::of(&def.name);
            trace!(node = %def.name, parents = parents.len(), capabilities = capabilities.len(), "defined node");

            order.push(id);
            nodes.insert(
                id,
                BehaviorNode {
                    id,
                    name: def.name,
                    parents,
                    capabilities,
                },
            );
        }

        let hierarchy = Hierarchy {
            config: self.config,
            nodes,
            order,
            walks: DashMap::new(),
        };

        hierarchy.validate_acyclic()?;
        debug!(nodes = hierarchy.len(), "built hierarchy");

        Ok(hierarchy)
    }
}

/// A validated, immutable graph of [BehaviorNode]'s
///
/// The `Hierarchy` is the single owner of every node, edges are stored as [NodeId]'s on the
/// child pointing at each parent. Walk orders used for resolution are computed lazily and,
/// when enabled by [HierarchyConfig::cache_linearizations], cached per originating node
#[derive(Debug)]
pub struct Hierarchy {
    config: HierarchyConfig,
    nodes: HashMap<NodeId, BehaviorNode>,

    /// Node ids in definition order
    order: Vec<NodeId>,

    walks: DashMap<NodeId, Arc<Walk>>,
}

impl Hierarchy {
    pub fn builder() -> HierarchyBuilder {
        HierarchyBuilder::default()
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(&NodeId::of(name))
    }

    pub fn node(&self, name: &str) -> Result<&BehaviorNode> {
        self.nodes
            .get(&NodeId::of(name))
            .ok_or_else(|| LineageError::NodeDoesntExist(name.to_string()))
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&BehaviorNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn name_of(&self, id: NodeId) -> &str {
        self.nodes
            .get(&id)
            .map(|node| node.name())
            .unwrap_or("{unknown}")
    }

    /// Every node in definition order
    pub fn nodes(&self) -> impl Iterator<Item = &BehaviorNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &BehaviorNode> {
        self.nodes().filter(|node| node.is_root())
    }

    /// Nodes listing `name` as a direct parent, in definition order
    pub fn children(&self, name: &str) -> Result<Vec<&BehaviorNode>> {
        let id = self.node(name)?.id();
        Ok(self
            .nodes()
            .filter(|node| node.parents.contains(&id))
            .collect())
    }

    /// The order in which resolution visits nodes when starting from `name`
    pub fn linearization(&self, name: &str) -> Result<Linearization<'_>> {
        let origin = self.node(name)?.id();
        Ok(Linearization::new(self, self.walk(origin)))
    }

    /// Every ancestor of `name` in resolution order, the node itself excluded
    pub fn ancestors(&self, name: &str) -> Result<Vec<&BehaviorNode>> {
        Ok(self.linearization(name)?.iter().skip(1).collect())
    }

    /// True if `ancestor` is `node` or is reachable through its parents
    pub fn is_descendant_of(&self, node: &str, ancestor: &str) -> Result<bool> {
        let ancestor = self.node(ancestor)?.id();
        Ok(self.linearization(node)?.ids().contains(&ancestor))
    }

    /// Finds the node whose definition of `capability` applies to instances of `node`
    pub fn resolve(&self, node: &str, capability: &str) -> Result<Resolution> {
        let origin = self.node(node)?.id();
        resolve::resolve(self, origin, capability)
    }

    /// Materializes an instance of `node`
    ///
    /// If the configured constructor capability resolves it runs with `args`, otherwise
    /// the instance starts with no attributes and `args` must be empty
    pub fn instantiate(
        &self,
        node: &str,
        args: impl AsRef<[Value]>,
        transcript: &mut dyn Transcript,
    ) -> Result<Instance> {
        let args = args.as_ref();
        let origin = self.node(node)?;
        let mut instance = Instance::new(origin.id());

        match resolve::resolve(self, origin.id(), &self.config.constructor) {
            Ok(resolution) => {
                debug!(node, constructor = %self.name_of(resolution.node()), "constructing instance");
                receiver::dispatch(self, &mut instance, transcript, &resolution, args)?;
            }
            Err(err) if err.is_not_found() => {
                if !args.is_empty() {
                    return Err(LineageError::UnexpectedArguments {
                        node: node.to_string(),
                        count: args.len(),
                    });
                }
                debug!(node, "constructing instance without constructor");
            }
            Err(err) => return Err(err),
        }

        Ok(instance)
    }

    /// Resolves `capability` from the node `instance` was materialized from and runs it
    pub fn invoke(
        &self,
        instance: &mut Instance,
        capability: &str,
        args: impl AsRef<[Value]>,
        transcript: &mut dyn Transcript,
    ) -> CapabilityResult {
        if self.node_by_id(instance.node()).is_none() {
            return Err(LineageError::NodeDoesntExist(instance.node().to_string()));
        }

        let resolution = resolve::resolve(self, instance.node(), capability)?;
        receiver::dispatch(self, instance, transcript, &resolution, args.as_ref())
    }

    /// Walk order from `origin`, memoized when the config allows it
    pub(crate) fn walk(&self, origin: NodeId) -> Arc<Walk> {
        if !self.config.cache_linearizations {
            return Arc::new(Walk::new(self, origin));
        }

        if let Some(walk) = self.walks.get(&origin).map(|walk| Arc::clone(walk.value())) {
            return walk;
        }

        let walk = Arc::new(Walk::new(self, origin));
        self.walks.insert(origin, Arc::clone(&walk));
        walk
    }

    /// Kahn's algorithm over parent -> child edges, any node never reaching zero
    /// in-degree sits on or below a cycle. Nodes only below a cycle are then peeled off
    /// so the error reports the cycle itself
    fn validate_acyclic(&self) -> Result<()> {
        let mut in_degree: HashMap<NodeId, usize> = self
            .nodes()
            .map(|node| (node.id, node.parents.len()))
            .collect();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for node in self.nodes() {
            for parent in &node.parents {
                children.entry(*parent).or_default().push(node.id);
            }
        }

        let mut queue: VecDeque<NodeId> = self
            .order
            .iter()
            .filter(|id| in_degree.get(*id) == Some(&0))
            .copied()
            .collect();
        let mut visited = 0usize;

        while let Some(id) = queue.pop_front() {
            visited += 1;
            if let Some(children) = children.get(&id) {
                for child in children {
                    if let Some(degree) = in_degree.get_mut(child) {
                        *degree = degree.saturating_sub(1);
                        if *degree == 0 {
                            queue.push_back(*child);
                        }
                    }
                }
            }
        }

        if visited == self.len() {
            return Ok(());
        }

        let mut stuck: HashSet<NodeId> = in_degree
            .into_iter()
            .filter_map(|(id, degree)| (degree > 0).then_some(id))
            .collect();

        loop {
            let leaves: Vec<NodeId> = stuck
                .iter()
                .filter(|id| {
                    children
                        .get(*id)
                        .map_or(true, |c| c.iter().all(|child| !stuck.contains(child)))
                })
                .copied()
                .collect();
            if leaves.is_empty() {
                break;
            }
            for leaf in leaves {
                stuck.remove(&leaf);
            }
        }

        let cycle = self.order.iter().filter(|id| stuck.contains(*id)).copied();
        Err(LineageError::CyclicInheritance(node_names!(self, cycle)))
    }
}

#[cfg(test)]
mod test {
    use super::{Hierarchy, NodeDef};
    use crate::config::HierarchyConfig;
    use crate::error::LineageError;
    use crate::id::{CapabilityId, NodeId};
    use crate::transcript::Recorded;
    use crate::value::Value;

    fn noop(def: NodeDef, capability: &str) -> NodeDef {
        def.capability(capability, |_| Ok(None))
    }

    fn diamond() -> Hierarchy {
        Hierarchy::builder()
            .node(noop(NodeDef::new("A"), "featureA"))
            .node(noop(NodeDef::new("B").parent("A"), "featureB"))
            .node(noop(NodeDef::new("C").parent("A"), "featureC"))
            .node(noop(NodeDef::new("D").parents(["B", "C"]), "featureD"))
            .build()
            .unwrap()
    }

    #[test]
    fn definitions_may_arrive_in_any_order() {
        let hierarchy = Hierarchy::builder()
            .node(NodeDef::new("Child").parents(["Father", "Mother"]))
            .node(NodeDef::new("Mother"))
            .node(NodeDef::new("Father"))
            .build()
            .unwrap();

        assert_eq!(hierarchy.len(), 3);
        let roots: Vec<&str> = hierarchy.roots().map(|n| n.name()).collect();
        assert_eq!(roots, vec!["Mother", "Father"]);
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let err = Hierarchy::builder()
            .node(NodeDef::new("Vehicle"))
            .node(NodeDef::new("Vehicle"))
            .build()
            .unwrap_err();
        assert_eq!(err, LineageError::DuplicateNode("Vehicle".to_string()));
    }

    #[test]
    fn rejects_unknown_and_duplicate_parents() {
        let err = Hierarchy::builder()
            .node(NodeDef::new("Car").parent("Vehicle"))
            .build()
            .unwrap_err();
        assert_eq!(err, LineageError::NodeDoesntExist("Vehicle".to_string()));

        let err = Hierarchy::builder()
            .node(NodeDef::new("Vehicle"))
            .node(NodeDef::new("Car").parents(["Vehicle", "Vehicle"]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LineageError::DuplicateParent {
                node: "Car".to_string(),
                parent: "Vehicle".to_string()
            }
        );
    }

    #[test]
    fn rejects_cycles() {
        let err = Hierarchy::builder()
            .node(NodeDef::new("Root"))
            .node(NodeDef::new("P").parents(["Root", "R"]))
            .node(NodeDef::new("Q").parent("P"))
            .node(NodeDef::new("R").parent("Q"))
            .node(NodeDef::new("Below").parent("R"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LineageError::CyclicInheritance(vec![
                "P".to_string(),
                "Q".to_string(),
                "R".to_string()
            ])
        );

        let err = Hierarchy::builder()
            .node(NodeDef::new("Ouroboros").parent("Ouroboros"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LineageError::CyclicInheritance(vec!["Ouroboros".to_string()])
        );
    }

    #[test]
    fn children_and_ancestors() {
        let hierarchy = diamond();

        let children: Vec<&str> = hierarchy
            .children("A")
            .unwrap()
            .into_iter()
            .map(|n| n.name())
            .collect();
        assert_eq!(children, vec!["B", "C"]);

        let ancestors: Vec<&str> = hierarchy
            .ancestors("D")
            .unwrap()
            .into_iter()
            .map(|n| n.name())
            .collect();
        assert_eq!(ancestors, vec!["B", "A", "C"]);

        assert!(hierarchy.is_descendant_of("D", "A").unwrap());
        assert!(hierarchy.is_descendant_of("D", "D").unwrap());
        assert!(!hierarchy.is_descendant_of("B", "C").unwrap());
        assert!(hierarchy.is_descendant_of("B", "Z").is_err());
    }

    #[test]
    fn later_definition_of_a_capability_wins() {
        let hierarchy = Hierarchy::builder()
            .node(
                NodeDef::new("Twice")
                    .capability("speak", |slf| {
                        slf.say("first");
                        Ok(None)
                    })
                    .capability("speak", |slf| {
                        slf.say("second");
                        Ok(None)
                    }),
            )
            .build()
            .unwrap();

        let node = hierarchy.node("Twice").unwrap();
        assert_eq!(node.capability_names().collect::<Vec<_>>(), vec!["speak"]);

        let mut out = Recorded::default();
        let mut instance = hierarchy.instantiate("Twice", args![], &mut out).unwrap();
        hierarchy.invoke(&mut instance, "speak", args![], &mut out).unwrap();
        assert_eq!(out.lines(), ["second"]);
    }

    #[test]
    fn instantiate_without_constructor() {
        let hierarchy = diamond();
        let mut out = Recorded::default();

        let instance = hierarchy.instantiate("D", args![], &mut out).unwrap();
        assert_eq!(instance.node(), hierarchy.node("D").unwrap().id());
        assert_eq!(instance.attributes().count(), 0);

        let err = hierarchy.instantiate("D", args![1], &mut out).unwrap_err();
        assert_eq!(
            err,
            LineageError::UnexpectedArguments {
                node: "D".to_string(),
                count: 1
            }
        );

        assert!(hierarchy.instantiate("Z", args![], &mut out).is_err());
    }

    #[test]
    fn configured_constructor_name() {
        let hierarchy = Hierarchy::builder()
            .with_config(HierarchyConfig::new().constructor("setup"))
            .node(
                NodeDef::new("Widget")
                    .capability("setup", |slf| {
                        let label: String = slf.arg(0)?;
                        slf.set("label", label);
                        slf.say("setup ran");
                        Ok(None)
                    })
                    .capability("init", |slf| {
                        slf.say("init ran");
                        Ok(None)
                    }),
            )
            .node(NodeDef::new("Button").parent("Widget"))
            .node(NodeDef::new("Plain").capability("init", |slf| {
                slf.say("init ran");
                Ok(None)
            }))
            .build()
            .unwrap();
        assert_eq!(hierarchy.config().constructor, "setup");
        let mut out = Recorded::default();

        let widget = hierarchy.instantiate("Widget", args!["ok"], &mut out).unwrap();
        assert_eq!(widget.attr("label"), Some(&Value::from("ok")));

        // inherited from Widget
        let button = hierarchy.instantiate("Button", args!["go"], &mut out).unwrap();
        assert_eq!(button.attr("label"), Some(&Value::from("go")));
        assert_eq!(out.lines(), ["setup ran", "setup ran"]);

        // "init" is an ordinary capability under this config
        let plain = hierarchy.instantiate("Plain", args![], &mut out).unwrap();
        assert_eq!(plain.attributes().count(), 0);
        assert_eq!(out.count("init ran"), 0);
        let err = hierarchy.instantiate("Plain", args![1], &mut out).unwrap_err();
        assert_eq!(
            err,
            LineageError::UnexpectedArguments {
                node: "Plain".to_string(),
                count: 1
            }
        );
    }

    #[test]
    fn capability_lookup_compares_names_after_ids() {
        let mut hierarchy = Hierarchy::builder()
            .node(NodeDef::new("Holder").capability("real", |slf| {
                slf.say("real ran");
                Ok(None)
            }))
            .build()
            .unwrap();

        // file the definition under an id that belongs to another name
        let node = hierarchy.nodes.get_mut(&NodeId::of("Holder")).unwrap();
        let real = node.capabilities.remove(&CapabilityId::of("real")).unwrap();
        node.capabilities.insert(CapabilityId::of("other"), real);

        let node = hierarchy.node("Holder").unwrap();
        assert!(!node.defines("other"));
        assert!(!node.defines("real"));

        let err = hierarchy.resolve("Holder", "other").unwrap_err();
        assert_eq!(
            err,
            LineageError::CapabilityNotFound {
                node: "Holder".to_string(),
                capability: "other".to_string()
            }
        );

        let mut out = Recorded::default();
        let mut holder = hierarchy.instantiate("Holder", args![], &mut out).unwrap();
        assert!(hierarchy
            .invoke(&mut holder, "other", args![], &mut out)
            .unwrap_err()
            .is_not_found());
        assert!(out.lines().is_empty());
    }
}
