//! Receiver
//!
//! The explicit `self` handed to every capability

use std::fmt::Display;

use tracing::trace;

use crate::error::{LineageError, Result};
use crate::hierarchy::Hierarchy;
use crate::id::NodeId;
use crate::instance::Instance;
use crate::resolve::{self, Resolution};
use crate::transcript::Transcript;
use crate::value::{FromValue, Value};

/// What a capability hands back to its caller
pub type CapabilityResult = Result<Option<Value>>;

/// A `Receiver` binds one running capability to the instance it was invoked on
///
/// It is the only way to change an instance's attributes. It also carries the call's
/// arguments, the transcript lines are said to, and the position in the originating node's
/// linearization the running definition came from, which is what [Receiver::invoke_super]
/// continues from
pub struct Receiver<'a> {
    hierarchy: &'a Hierarchy,
    instance: &'a mut Instance,
    transcript: &'a mut dyn Transcript,
    capability: &'a str,
    defined_on: NodeId,
    args: &'a [Value],
}

/// Runs the definition a [Resolution] points at against `instance`
pub(crate) fn dispatch(
    hierarchy: &Hierarchy,
    instance: &mut Instance,
    transcript: &mut dyn Transcript,
    resolution: &Resolution,
    args: &[Value],
) -> CapabilityResult {
    let capability = hierarchy
        .node_by_id(resolution.node())
        .and_then(|node| node.capability(resolution.capability()))
        .ok_or_else(|| LineageError::CapabilityNotFound {
            node: hierarchy.name_of(resolution.origin()).to_string(),
            capability: resolution.capability().to_string(),
        })?;

    trace!(
        capability = resolution.capability(),
        defined_on = %hierarchy.name_of(resolution.node()),
        args = args.len(),
        "invoking"
    );

    let mut receiver = Receiver {
        hierarchy,
        instance,
        transcript,
        capability: resolution.capability(),
        defined_on: resolution.node(),
        args,
    };

    capability.run(&mut receiver)
}

impl<'a> Receiver<'a> {
    /// Name of the node the instance was materialized from
    pub fn node(&self) -> &str {
        self.hierarchy.name_of(self.instance.node())
    }

    /// Name of the node whose definition is running
    pub fn defined_on(&self) -> &str {
        self.hierarchy.name_of(self.defined_on)
    }

    pub fn capability(&self) -> &str {
        self.capability
    }

    pub fn instance(&self) -> &Instance {
        &*self.instance
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        self.hierarchy
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// Reads argument `index` as `T`
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self
            .args
            .get(index)
            .ok_or_else(|| LineageError::MissingArgument {
                capability: self.capability.to_string(),
                index,
            })?;

        T::from_value(value).ok_or_else(|| LineageError::ArgumentTypeDiscrepancy {
            capability: self.capability.to_string(),
            index,
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.instance.attr(attribute).is_some()
    }

    pub fn attr(&self, attribute: &str) -> Result<&Value> {
        self.instance
            .attr(attribute)
            .ok_or_else(|| LineageError::AttributeDoesntExist {
                node: self.node().to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Reads attribute `attribute` as `T`
    pub fn get<T: FromValue>(&self, attribute: &str) -> Result<T> {
        let value = self.attr(attribute)?;
        T::from_value(value).ok_or_else(|| LineageError::AttributeTypeDiscrepancy {
            attribute: attribute.to_string(),
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    /// Sets an attribute, returning the previous value if there was one
    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.instance.set(attribute.into(), value.into())
    }

    /// The error for integer arithmetic in this capability leaving the `i64` range
    pub fn overflow(&self) -> LineageError {
        LineageError::ArithmeticOverflow {
            capability: self.capability.to_string(),
        }
    }

    /// Appends a line to the transcript
    pub fn say(&mut self, line: impl Display) {
        self.transcript.line(line.to_string());
    }

    /// Invokes another capability on the same instance, resolved from its originating node
    pub fn invoke(&mut self, capability: &str, args: impl AsRef<[Value]>) -> CapabilityResult {
        let resolution = resolve::resolve(self.hierarchy, self.instance.node(), capability)?;
        dispatch(
            self.hierarchy,
            &mut *self.instance,
            &mut *self.transcript,
            &resolution,
            args.as_ref(),
        )
    }

    /// Invokes the next definition of `capability` after the running one, in the
    /// originating node's linearization
    pub fn invoke_super(&mut self, capability: &str, args: impl AsRef<[Value]>) -> CapabilityResult {
        let resolution = resolve::resolve_after(
            self.hierarchy,
            self.instance.node(),
            self.defined_on,
            capability,
        )?;
        dispatch(
            self.hierarchy,
            &mut *self.instance,
            &mut *self.transcript,
            &resolution,
            args.as_ref(),
        )
    }
}
