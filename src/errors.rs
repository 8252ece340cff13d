//! Error types produced while building, loading or analysing trusses.

use thiserror::Error;

/// Error returned when editing a [`Truss`](crate::Truss).
///
/// Every variant is raised at the call that introduces the problem, so a truss
/// that was built without error only needs to be checked for stability.
///
/// # Examples
///
/// ```
/// use truss2d::{point, Node, Truss, TrussEditError};
///
/// let mut truss = Truss::new();
/// truss.add_node(Node::new("A", point(0.0, 0.0))).unwrap();
/// let error = truss
///     .add_node(Node::new("A", point(1.0, 0.0)))
///     .expect_err("duplicate id is rejected");
/// assert_eq!(error, TrussEditError::DuplicateNode("A".to_string()));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrussEditError {
    /// Returned when a node id is already part of the truss.
    #[error("node {0:?} already exists in this truss")]
    DuplicateNode(String),
    /// Returned when a bar id is already part of the truss.
    #[error("bar {0:?} already exists in this truss")]
    DuplicateBar(String),
    /// Returned when a bar refers to a node that has not been added.
    #[error("bar {bar:?} references unknown node {node:?}")]
    UnknownNode {
        /// Identifier of the offending bar.
        bar: String,
        /// Identifier that could not be resolved.
        node: String,
    },
    /// Returned when a node position or load is NaN or infinite.
    #[error("node {node:?}: {quantity} must be finite")]
    NonFinite {
        /// Identifier of the affected node.
        node: String,
        /// Either `"position"` or `"load"`.
        quantity: &'static str,
    },
    /// Returned when an edit addresses a node id that is not in the truss.
    #[error("node {0:?} does not exist in this truss")]
    UnknownNodeId(String),
    /// Returned when the supplied bar is not physically meaningful.
    #[error("{0}")]
    InvalidBar(#[from] BarPropertyError),
}

/// Reason a bar is rejected at construction time.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BarPropertyError {
    /// Returned when the cross-sectional area is zero, negative or not a number.
    #[error("bar {bar:?}: area must be positive (received {area})")]
    NonPositiveArea {
        /// Identifier of the affected bar.
        bar: String,
        /// Rejected cross-sectional area in square metres.
        area: f64,
    },
    /// Returned when the elastic modulus is zero, negative or not a number.
    #[error("bar {bar:?}: elastic modulus must be positive (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Identifier of the affected bar.
        bar: String,
        /// Rejected elastic modulus in pascals.
        elastic_modulus: f64,
    },
    /// Returned when both ends of a bar name the same node.
    #[error("bar {bar:?} connects node {node:?} to itself")]
    CoincidentEndpoints {
        /// Identifier of the affected bar.
        bar: String,
        /// Node named at both ends.
        node: String,
    },
    /// Returned when the two endpoint nodes sit at the same position.
    #[error("bar {0:?} has zero length")]
    ZeroLength(String),
}

/// Error returned when a truss analysis fails.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when a bar spans zero distance.
    #[error("bar {0:?} has zero length")]
    ZeroLengthBar(String),
    /// Returned when the free-free stiffness block cannot be solved.
    #[error(
        "stiffness matrix is singular ({free_dofs} free dofs, conditioning {conditioning:e}); \
         check supports and bracing"
    )]
    SingularStiffness {
        /// Number of unrestrained degrees of freedom in the reduced system.
        free_dofs: usize,
        /// Reciprocal condition estimate of the reduced system.
        conditioning: f64,
    },
}

/// Error returned when a support code string is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unrecognised support code {0:?} (expected N, P, X or Y)")]
pub struct SupportCodeError(pub String);

/// Error returned by the readers in [`loader`](crate::loader).
#[derive(Debug, Error)]
pub enum InputError {
    /// The input could not be read.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON payload is malformed.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    /// A line of the text format is malformed.
    #[error("line {line}: {message}")]
    Parse {
        /// One-based line number in the source text.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// A node carries a support code that is not recognised.
    #[error("line {line}: {source}")]
    InvalidSupport {
        /// One-based line number in the source text.
        line: usize,
        /// Underlying parse failure.
        #[source]
        source: SupportCodeError,
    },
    /// The payload has no nodes or no bars.
    #[error("input defines no {0}")]
    Empty(&'static str),
    /// The parsed entities do not form a valid truss.
    #[error(transparent)]
    Truss(#[from] TrussEditError),
}
