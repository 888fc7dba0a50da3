use std::fmt;

/// Result alias for `ppblock`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building graphs or running the sampler.
///
/// None of these are retried; each one ends the current run.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A label vector does not cover the node set exactly once.
    LabelMismatch {
        /// Number of nodes in the graph.
        expected: usize,
        /// Length of the offending label vector.
        found: usize,
    },

    /// Pair accounting produced a negative non-edge count, which happens
    /// when a graph view reports the same node pair more than once.
    NegativeNonEdges {
        /// Same-community pairs minus same-community edges.
        non_edges_in: i64,
        /// Cross-community pairs minus cross-community edges.
        non_edges_out: i64,
    },

    /// Every candidate community got zero (or non-finite) weight.
    DegenerateDistribution {
        /// Node being resampled.
        node: usize,
    },

    /// An interaction joins a node to itself.
    SelfInteraction {
        /// Index of the node in sorted order.
        node: usize,
    },

    /// Parameter outside its domain.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LabelMismatch { expected, found } => {
                write!(
                    f,
                    "graph/label mismatch: expected {expected} labels, found {found}"
                )
            }
            Error::NegativeNonEdges {
                non_edges_in,
                non_edges_out,
            } => write!(
                f,
                "negative non-edge count (in: {non_edges_in}, out: {non_edges_out}); \
                 a node pair was counted as an edge more than once"
            ),
            Error::DegenerateDistribution { node } => {
                write!(f, "all community weights vanished for node {node}")
            }
            Error::SelfInteraction { node } => {
                write!(f, "node {node} interacts with itself")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
