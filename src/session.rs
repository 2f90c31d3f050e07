//! Session
//!
//! Pairs a [Hierarchy] with the [Transcript] its capabilities say lines to

use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::instance::Instance;
use crate::receiver::CapabilityResult;
use crate::transcript::Transcript;
use crate::value::Value;

/// ```
/// use lineage::{args, Hierarchy, NodeDef, Recorded, Session};
///
/// let hierarchy = Hierarchy::builder()
///     .node(NodeDef::new("Father").capability("skill", |slf| {
///         slf.say("Father: Knows driving.");
///         Ok(None)
///     }))
///     .node(NodeDef::new("Child").parent("Father"))
///     .build()
///     .unwrap();
///
/// let mut session = Session::new(&hierarchy, Recorded::default());
/// let mut child = session.create("Child", args![]).unwrap();
/// session.invoke(&mut child, "skill", args![]).unwrap();
///
/// assert_eq!(session.transcript().lines(), ["Father: Knows driving."]);
/// ```
#[derive(Debug)]
pub struct Session<'h, T: Transcript> {
    hierarchy: &'h Hierarchy,
    transcript: T,
}

impl<'h, T: Transcript> Session<'h, T> {
    pub fn new(hierarchy: &'h Hierarchy, transcript: T) -> Self {
        Self {
            hierarchy,
            transcript,
        }
    }

    pub fn hierarchy(&self) -> &'h Hierarchy {
        self.hierarchy
    }

    pub fn transcript(&self) -> &T {
        &self.transcript
    }

    pub fn into_transcript(self) -> T {
        self.transcript
    }

    /// Materializes an instance of `node`, running its constructor if one resolves
    pub fn create(&mut self, node: &str, args: impl AsRef<[Value]>) -> Result<Instance> {
        self.hierarchy.instantiate(node, args, &mut self.transcript)
    }

    pub fn invoke(
        &mut self,
        instance: &mut Instance,
        capability: &str,
        args: impl AsRef<[Value]>,
    ) -> CapabilityResult {
        self.hierarchy
            .invoke(instance, capability, args, &mut self.transcript)
    }
}
