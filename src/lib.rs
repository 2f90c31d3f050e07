//!
//! Lineage is an explicit behavior graph: named nodes derive capabilities from ordered
//! parent lists, instances are materialized from a single node, and every capability
//! invocation is resolved by a depth-first, left-to-right walk that never revisits a node
//!

#[macro_use]
pub(crate) mod macros;
pub mod id;
pub mod error;
pub mod config;
pub mod value;
pub mod instance;
pub mod hierarchy;
pub mod resolve;
pub mod receiver;
pub mod transcript;
pub mod session;
pub mod catalog;

pub use id::NodeId;
pub use id::CapabilityId;
pub use error::LineageError;
pub use error::Result;
pub use config::HierarchyConfig;
pub use value::Value;
pub use value::FromValue;
pub use instance::Instance;
pub use hierarchy::BehaviorNode;
pub use hierarchy::Hierarchy;
pub use hierarchy::HierarchyBuilder;
pub use hierarchy::NodeDef;
pub use resolve::Linearization;
pub use resolve::Resolution;
pub use receiver::CapabilityResult;
pub use receiver::Receiver;
pub use transcript::Recorded;
pub use transcript::Stdout;
pub use transcript::Transcript;
pub use session::Session;
