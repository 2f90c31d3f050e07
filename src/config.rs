//!
//! Hierarchy configuration
//!

/// Options fixed when a [crate::Hierarchy] is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyConfig {
    /// Name of the capability run when an instance is created
    pub constructor: String,

    /// When set, the walk order of each node is computed once and reused by every
    /// subsequent resolution starting from that node
    pub cache_linearizations: bool,
}

impl HierarchyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constructor(mut self, name: impl Into<String>) -> Self {
        self.constructor = name.into();
        self
    }

    pub fn cache_linearizations(mut self, enabled: bool) -> Self {
        self.cache_linearizations = enabled;
        self
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            constructor: "init".to_string(),
            cache_linearizations: true,
        }
    }
}
