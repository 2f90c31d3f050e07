//!
//!
//! ID types for behavior nodes and the capabilities they define
//!
//!

use std::fmt::{self, Debug, Display};

/// A `NodeId` uniquely identifies a single behavior node within a hierarchy
///
/// Node ids are a compile time FNV-1a hash of the node name, node names are unique
/// within a [crate::Hierarchy] so the id is too
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// A `CapabilityId` identifies a capability by name, independent of the node defining it
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapabilityId(u64);

// `NodeId`
impl NodeId {
    pub const fn of(name: &str) -> Self {
        NodeId(const_fnv1a_hash::fnv1a_hash_str_64(name))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N[{:016x}]", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// `CapabilityId`
impl CapabilityId {
    /// Capability ids can be computed in const contexts
    ///
    /// ```
    /// use lineage::CapabilityId;
    ///
    /// const DEPOSIT: CapabilityId = CapabilityId::of("deposit");
    /// assert_eq!(DEPOSIT, CapabilityId::of("deposit"));
    /// ```
    pub const fn of(name: &str) -> Self {
        CapabilityId(const_fnv1a_hash::fnv1a_hash_str_64(name))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C[{:016x}]", self.0)
    }
}

impl Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::{CapabilityId, NodeId};

    const FEATURE_A: CapabilityId = CapabilityId::of("featureA");

    #[test]
    fn ids_are_stable_hashes_of_names() {
        assert_eq!(NodeId::of("Vehicle"), NodeId::of("Vehicle"));
        assert_ne!(NodeId::of("Vehicle"), NodeId::of("Car"));
        assert_eq!(FEATURE_A, CapabilityId::of("featureA"));
        assert_ne!(FEATURE_A, CapabilityId::of("featureB"));
    }

    #[test]
    fn node_and_capability_ids_share_a_hash_space() {
        // same name, same hash, but the types keep them apart
        assert_eq!(NodeId::of("info").raw(), CapabilityId::of("info").raw());
    }
}
