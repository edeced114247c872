//! The route table produced by one scan.
//!
//! A [`RouteTable`] is built once by the scanner and never mutated afterwards.
//! The driver keeps the latest one behind an `Arc` and shares it read-only with
//! the route overview.

use autoroute_core::{ExceptionKind, HandlerDescriptor, MetadataKind, Transformer, Verb};
use std::collections::BTreeMap;
use thiserror::Error;

/// One handler and what the scan resolved for it.
#[derive(Clone, Debug)]
pub struct Entry<T> {
    /// The discovered handler.
    pub handler: HandlerDescriptor,
    /// The resolved routing information.
    pub info: T,
}

impl<T> Entry<T> {
    /// The handler's `container::name`.
    pub fn qualified_name(&self) -> String {
        self.handler.qualified_name()
    }
}

/// A resolved verb route.
#[derive(Clone, Debug)]
pub struct RouteInfo {
    /// Path-group prefix plus declared path; never empty.
    pub path: String,
    /// The accepted content type, or `None` for any.
    pub accept_type: Option<String>,
    /// The constructed output transformer, if one was declared.
    pub transformer: Option<Transformer>,
}

/// A before or after filter. `None` fields apply globally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterInfo {
    /// The filtered path.
    pub path: Option<String>,
    /// The accepted content type.
    pub accept_type: Option<String>,
}

/// An after-after filter. A `None` path applies globally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AfterAfterInfo {
    /// The filtered path.
    pub path: Option<String>,
}

/// The exception category a handler is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExceptionBinding {
    /// The caught kind.
    pub kind: ExceptionKind,
}

/// Why a declaration did not make it into the table.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Prefix and declared path are both empty.
    #[error("effective path is empty")]
    EmptyPath,

    /// An accept type was given as an empty string.
    #[error("accept type is empty")]
    EmptyAcceptType,

    /// The declared transformer could not be constructed.
    #[error("transformer `{transformer}` could not be constructed: {message}")]
    Transformer {
        /// The transformer type name.
        transformer: &'static str,
        /// The construction failure.
        message: String,
    },

    /// The same handler was already declared with the same kind.
    #[error("duplicate declaration")]
    Duplicate,

    /// The module already declares a path group.
    #[error("module already declares a path group")]
    DuplicatePathGroup,
}

/// A skipped declaration occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// The qualified handler name, or the module path for path groups.
    pub subject: String,
    /// The declaration kind, or `None` for path groups.
    pub kind: Option<MetadataKind>,
    /// What was wrong with it.
    pub reason: RejectReason,
}

/// The normalized, immutable result of one scan.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    pub(crate) namespace: String,
    pub(crate) path_group_prefixes: BTreeMap<&'static str, String>,
    pub(crate) before_filters: Vec<Entry<FilterInfo>>,
    pub(crate) after_filters: Vec<Entry<FilterInfo>>,
    pub(crate) after_after_filters: Vec<Entry<AfterAfterInfo>>,
    pub(crate) exception_handlers: Vec<Entry<ExceptionBinding>>,
    pub(crate) routes: BTreeMap<Verb, Vec<Entry<RouteInfo>>>,
    pub(crate) rejected: Vec<Rejection>,
}

impl RouteTable {
    pub(crate) fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            ..Self::default()
        }
    }

    /// The namespace that was scanned.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolved prefix per path-group module.
    pub fn path_group_prefixes(&self) -> &BTreeMap<&'static str, String> {
        &self.path_group_prefixes
    }

    /// The resolved prefix of one path-group module.
    pub fn prefix_of(&self, container: &str) -> Option<&str> {
        self.path_group_prefixes.get(container).map(String::as_str)
    }

    /// Before filters.
    pub fn before_filters(&self) -> &[Entry<FilterInfo>] {
        &self.before_filters
    }

    /// After filters.
    pub fn after_filters(&self) -> &[Entry<FilterInfo>] {
        &self.after_filters
    }

    /// After-after filters.
    pub fn after_after_filters(&self) -> &[Entry<AfterAfterInfo>] {
        &self.after_after_filters
    }

    /// Exception handlers.
    pub fn exception_handlers(&self) -> &[Entry<ExceptionBinding>] {
        &self.exception_handlers
    }

    /// Routes for one verb.
    pub fn routes(&self, verb: Verb) -> &[Entry<RouteInfo>] {
        self.routes.get(&verb).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every route, grouped by verb in binding order.
    pub fn all_routes(&self) -> impl Iterator<Item = (Verb, &Entry<RouteInfo>)> {
        self.routes
            .iter()
            .flat_map(|(verb, entries)| entries.iter().map(move |entry| (*verb, entry)))
    }

    /// Number of routes across all verbs.
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Declarations skipped during the scan.
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }
}
