//! Error types for autoroute.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`AutorouteError`] - Top-level error type for the fatal failures
//! - [`ScanError`] - The namespace could not be enumerated
//! - [`ValidationError`] - A handler has the wrong call shape (skipped)
//! - [`TransformerConstructionError`] - A transformer failed to construct (skipped)
//! - [`SynthesisError`] - No usable dispatch stub exists for a handler
//! - [`AlreadyBoundError`] - Registration attempted twice
//! - [`DispatchError`] - Request-time adapter misuse

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for the operations that abort registration.
#[derive(Error, Debug)]
pub enum AutorouteError {
    /// The namespace could not be scanned.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// A dispatch adapter could not be produced.
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Routes were already bound by this driver.
    #[error(transparent)]
    AlreadyBound(#[from] AlreadyBoundError),
}

/// Errors that make a namespace impossible to enumerate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The namespace is not a `::`-separated module path.
    #[error("invalid namespace `{namespace}`: {reason}")]
    InvalidNamespace {
        /// The rejected namespace.
        namespace: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No module at or under the namespace declares anything.
    #[error("namespace `{namespace}` does not resolve to any declaring module")]
    UnknownNamespace {
        /// The unresolved namespace.
        namespace: String,
    },
}

/// A handler whose signature does not fit the call shape it was declared for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The handler needs an instance to be called.
    #[error("{handler} takes a receiver; handlers must be free functions")]
    Receiver {
        /// Qualified handler name.
        handler: String,
    },

    /// Wrong parameter count.
    #[error("{handler} takes {found} parameters, expected {expected}")]
    Arity {
        /// Qualified handler name.
        handler: String,
        /// Required parameter count.
        expected: usize,
        /// Declared parameter count.
        found: usize,
    },

    /// The handler returns nothing.
    #[error("{handler} does not return a value")]
    UnitOutput {
        /// Qualified handler name.
        handler: String,
    },

    /// A parameter has the wrong type or passing mode.
    #[error("parameter {index} of {handler} is `{found}`, expected `{expected}`")]
    ParamType {
        /// Qualified handler name.
        handler: String,
        /// Zero-based parameter position.
        index: usize,
        /// The required parameter type.
        expected: &'static str,
        /// The declared parameter type.
        found: String,
    },

    /// The first parameter cannot receive the declared exception kind.
    #[error("{handler} cannot receive exceptions of kind `{kind}` through `{found}`")]
    IncompatibleException {
        /// Qualified handler name.
        handler: String,
        /// The declared exception kind.
        kind: &'static str,
        /// The declared first parameter.
        found: String,
    },
}

/// A transformer type whose no-argument construction failed.
#[derive(Error, Debug)]
#[error("transformer `{transformer}` could not be constructed: {source}")]
pub struct TransformerConstructionError {
    /// The transformer type name.
    pub transformer: &'static str,
    /// The construction failure.
    #[source]
    pub source: BoxError,
}

/// Errors producing a dispatch adapter for a handler that passed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// The declaration carries no compiled stub.
    #[error("no dispatch stub was compiled for {handler}")]
    MissingStub {
        /// Qualified handler name.
        handler: String,
    },

    /// The compiled stub has the other call shape.
    #[error("dispatch stub for {handler} has the {found} shape, expected the {expected} shape")]
    ShapeMismatch {
        /// Qualified handler name.
        handler: String,
        /// The shape that was requested.
        expected: &'static str,
        /// The shape that was compiled.
        found: &'static str,
    },
}

/// Registration was attempted a second time on the same driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlreadyBoundError {
    /// Routes were already bound.
    #[error("routes have already been bound by this autorouter")]
    Routes,

    /// The route overview is already mounted.
    #[error("the route overview is already mounted at `{0}`")]
    Overview(String),
}

/// Errors raised by adapters at request time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An exception adapter received an error outside its kind.
    #[error("{handler} was dispatched an error that is not a `{expected}`")]
    ExceptionMismatch {
        /// Qualified handler name.
        handler: &'static str,
        /// The kind the handler catches.
        expected: &'static str,
    },
}
