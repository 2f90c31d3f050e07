use std::{error::Error, fmt::Display};

use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub enum LineageError {
    CapabilityNotFound {
        node: String,
        capability: String,
    },
    NodeDoesntExist(String),
    DuplicateNode(String),
    DuplicateParent {
        node: String,
        parent: String,
    },
    CyclicInheritance(Vec<String>),
    AttributeDoesntExist {
        node: String,
        attribute: String,
    },
    AttributeTypeDiscrepancy {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
    MissingArgument {
        capability: String,
        index: usize,
    },
    ArgumentTypeDiscrepancy {
        capability: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    UnexpectedArguments {
        node: String,
        count: usize,
    },
    ArithmeticOverflow {
        capability: String,
    },
}

pub type Result<T> = std::result::Result<T, LineageError>;

impl LineageError {
    /// True for the one failure resolution itself can produce
    pub fn is_not_found(&self) -> bool {
        matches!(self, LineageError::CapabilityNotFound { .. })
    }
}

impl Error for LineageError {}

impl Display for LineageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineageError::CapabilityNotFound { node, capability } => {
                write!(
                    f,
                    "capability '{}' is not defined by {} or any of its ancestors",
                    capability, node
                )
            }
            LineageError::NodeDoesntExist(node) => {
                write!(f, "node {} doesn't exist", node)
            }
            LineageError::DuplicateNode(node) => {
                write!(f, "node {} is defined more than once", node)
            }
            LineageError::DuplicateParent { node, parent } => {
                write!(f, "node {} lists parent {} more than once", node, parent)
            }
            LineageError::CyclicInheritance(nodes) => {
                write!(
                    f,
                    "inheritance must be acyclic, cycle through [{}]",
                    nodes.iter().join(", ")
                )
            }
            LineageError::AttributeDoesntExist { node, attribute } => {
                write!(f, "instance of {} has no attribute '{}'", node, attribute)
            }
            LineageError::AttributeTypeDiscrepancy {
                attribute,
                expected,
                found,
            } => {
                write!(
                    f,
                    "attribute '{}' type mismatch, expected {} found {}",
                    attribute, expected, found
                )
            }
            LineageError::MissingArgument { capability, index } => {
                write!(f, "'{}' is missing argument {}", capability, index)
            }
            LineageError::ArgumentTypeDiscrepancy {
                capability,
                index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "'{}' argument {} type mismatch, expected {} found {}",
                    capability, index, expected, found
                )
            }
            LineageError::UnexpectedArguments { node, count } => {
                write!(
                    f,
                    "{} has no constructor but was given {} argument(s)",
                    node, count
                )
            }
            LineageError::ArithmeticOverflow { capability } => {
                write!(f, "'{}' overflowed its integer range", capability)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::LineageError;

    #[test]
    fn not_found_message_names_node_and_capability() {
        let err = LineageError::CapabilityNotFound {
            node: "X".to_string(),
            capability: "fly".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "capability 'fly' is not defined by X or any of its ancestors"
        );
    }

    #[test]
    fn cycle_message_lists_nodes() {
        let err = LineageError::CyclicInheritance(vec!["P".to_string(), "Q".to_string()]);
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "inheritance must be acyclic, cycle through [P, Q]"
        );
    }

    #[test]
    fn overflow_message_names_capability() {
        let err = LineageError::ArithmeticOverflow {
            capability: "deposit".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "'deposit' overflowed its integer range");
    }
}
