//! Error types for kerf

use thiserror::Error;

use crate::kind::Dim;
use crate::value::ValueType;

/// Result type alias using kerf's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a compilation run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Usage errors
    /// A statement was emitted while no procedure was open
    #[error("codegen attempted outside of an open procedure")]
    NoActiveProcedure,

    /// A procedure was opened while another one was still open
    #[error("procedure `{0}` is still open")]
    ProcedureOpen(String),

    /// The scope stack did not return to the root at the end of a run
    #[error("expected scope stack to contain only the root node; {open} scope(s) still open")]
    UnbalancedScopes { open: usize },

    /// A scope was closed that is not the innermost open scope
    #[error("scope `{0}` is not the innermost open scope")]
    ScopeMismatch(String),

    /// A leaf kind was opened as a scope
    #[error("`{0}` is a leaf and cannot contain children")]
    NotAScope(String),

    /// A scope kind was instantiated as a leaf
    #[error("`{0}` is a scope and must be opened, not placed as a leaf")]
    NotALeaf(String),

    /// Two views were registered under the same name
    #[error("view `{0}` is already defined")]
    DuplicateView(String),

    /// No view is registered under this name
    #[error("no view named `{0}`")]
    UnknownView(String),

    /// Two different kind declarations share a name within one run
    #[error("node kind `{0}` is declared twice")]
    DuplicateKind(String),

    // Validation errors
    /// Wrong number of arguments for a node kind
    #[error("invalid number of arguments for `{kind}`; wanted {expected}, got {got}")]
    ArgumentCount {
        kind: String,
        expected: usize,
        got: usize,
    },

    /// An argument does not match its declared shape
    #[error("argument {index} of `{kind}` is not a {expected}")]
    ArgumentType {
        kind: String,
        index: usize,
        expected: ValueType,
    },

    /// A kind was used in a scene of the wrong dimensionality
    #[error("`{kind}` is a {expected} node but was used in a {got} scene")]
    DimensionMismatch { kind: String, expected: Dim, got: Dim },

    /// A material supplied a field the active material set does not have
    #[error("material field `{0}` is not part of the active material set")]
    UnknownMaterialField(String),

    /// A material field value has the wrong type
    #[error("material field `{field}` must be a {expected}")]
    MaterialFieldType { field: String, expected: ValueType },

    // Model errors
    /// A kind declares both 2D and 3D spatial rules
    #[error("mixed dimensions in definition of `{0}`")]
    MixedDimensions(String),

    /// A kind's argument shape contains an unknown character
    #[error("unhandled argument shape character {ch:?} in `{kind}`")]
    InvalidArgShape { kind: String, ch: char },

    /// A template is not consistently indented
    #[error("bad template input; line {line} is not untabbable")]
    Untab { line: usize },

    // Evaluation errors
    /// A compiled program referenced a symbol it never bound
    #[error("symbol `{0}` is not bound")]
    UnboundSymbol(String),
}
