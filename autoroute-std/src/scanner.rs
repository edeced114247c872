//! # Scanner
//!
//! Walks one namespace of a [`Registry`] and normalizes what it finds into a
//! [`RouteTable`].
//!
//! # Path-group composition
//!
//! Prefixes compose along the module nesting chain. A handler in
//! `app::api::v1` gets the prefix of `app`, then `app::api`, then
//! `app::api::v1`, each contributing the empty string when it declares no
//! path group. The chain is walked to the crate root whatever the scanned
//! namespace, so a handler's path never depends on where the scan started.
//!
//! # Partial failure
//!
//! A malformed occurrence is logged, recorded in [`RouteTable::rejected`] and
//! skipped. Only an unusable namespace fails the whole scan.

use crate::registry::Registry;
use crate::table::{
    AfterAfterInfo, Entry, ExceptionBinding, FilterInfo, RejectReason, Rejection, RouteInfo,
    RouteTable,
};
use autoroute_core::{
    Annotation, Declaration, FilterDecl, HandlerDescriptor, MetadataKind, RouteDecl, ScanError,
    Verb,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, error, trace, warn};

/// Scans a registry one namespace at a time.
#[derive(Clone, Copy, Debug)]
pub struct Scanner<'r> {
    registry: &'r Registry,
}

impl<'r> Scanner<'r> {
    /// Create a scanner over `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Build the route table for `namespace`.
    pub fn search(&self, namespace: &str) -> Result<RouteTable, ScanError> {
        validate_namespace(namespace)?;
        if !self.registry.declares_within(namespace) {
            return Err(ScanError::UnknownNamespace {
                namespace: namespace.to_owned(),
            });
        }

        debug!(namespace, "Scanning for annotated handlers");
        let mut scan = Scan {
            table: RouteTable::new(namespace),
            groups: BTreeMap::new(),
            seen: HashSet::new(),
        };

        scan.collect_path_groups(self.registry, namespace);

        for verb in Verb::ALL {
            for decl in self.within(MetadataKind::Route(verb), namespace) {
                if let Annotation::Route(route) = decl.annotation {
                    scan.add_route(&decl.handler, &route);
                }
            }
        }
        for decl in self.within(MetadataKind::Before, namespace) {
            if let Annotation::Before(filter) = decl.annotation {
                scan.add_filter(&decl.handler, MetadataKind::Before, &filter);
            }
        }
        for decl in self.within(MetadataKind::After, namespace) {
            if let Annotation::After(filter) = decl.annotation {
                scan.add_filter(&decl.handler, MetadataKind::After, &filter);
            }
        }
        for decl in self.within(MetadataKind::AfterAfter, namespace) {
            if let Annotation::AfterAfter(filter) = decl.annotation {
                scan.add_after_after(&decl.handler, filter.path);
            }
        }
        for decl in self.within(MetadataKind::Exception, namespace) {
            if let Annotation::Exception(exception) = decl.annotation {
                scan.add_exception(&decl.handler, ExceptionBinding {
                    kind: exception.kind,
                });
            }
        }

        let table = scan.table;
        debug!(
            namespace,
            routes = table.route_count(),
            before = table.before_filters.len(),
            after = table.after_filters.len(),
            after_after = table.after_after_filters.len(),
            exceptions = table.exception_handlers.len(),
            rejected = table.rejected.len(),
            "Scan finished"
        );
        Ok(table)
    }

    fn within<'a>(
        &'a self,
        kind: MetadataKind,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'r Declaration> + 'a {
        self.registry
            .declarations(kind)
            .iter()
            .filter(move |decl| decl.handler.is_within(namespace))
    }
}

/// Mutable state of one `search` call.
struct Scan {
    table: RouteTable,
    groups: BTreeMap<&'static str, &'static str>,
    seen: HashSet<(&'static str, &'static str, MetadataKind)>,
}

impl Scan {
    fn collect_path_groups(&mut self, registry: &Registry, namespace: &str) {
        // Prefixes resolve along the whole enclosing chain, including modules
        // above the namespace; only groups inside it are reported.
        for group in registry.path_groups() {
            if self.groups.contains_key(group.container) {
                if !group.is_within(namespace) {
                    continue;
                }
                warn!(
                    container = group.container,
                    prefix = group.prefix,
                    "Module declares more than one path group, keeping the first"
                );
                self.table.rejected.push(Rejection {
                    subject: group.container.to_owned(),
                    kind: None,
                    reason: RejectReason::DuplicatePathGroup,
                });
                continue;
            }
            self.groups.insert(group.container, group.prefix);
        }

        let reported = registry.path_groups().iter().filter(|g| g.is_within(namespace));
        for group in reported {
            let prefix = resolve_prefix(group.container, &self.groups);
            trace!(container = group.container, prefix = %prefix, "Resolved path group");
            self.table.path_group_prefixes.insert(group.container, prefix);
        }
    }

    /// Claim the identity of one occurrence; false if it was already seen.
    fn claim(&mut self, handler: &HandlerDescriptor, kind: MetadataKind) -> bool {
        if self.seen.insert((handler.container, handler.name, kind)) {
            return true;
        }
        debug!(handler = %handler.qualified_name(), %kind, "Skipping duplicate declaration");
        self.table.rejected.push(Rejection {
            subject: handler.qualified_name(),
            kind: Some(kind),
            reason: RejectReason::Duplicate,
        });
        false
    }

    fn reject(&mut self, handler: &HandlerDescriptor, kind: MetadataKind, reason: RejectReason) {
        match &reason {
            RejectReason::Transformer { .. } => {
                error!(handler = %handler.qualified_name(), %kind, %reason, "Skipping declaration")
            }
            _ => warn!(handler = %handler.qualified_name(), %kind, %reason, "Skipping malformed declaration"),
        }
        self.table.rejected.push(Rejection {
            subject: handler.qualified_name(),
            kind: Some(kind),
            reason,
        });
    }

    fn add_route(&mut self, handler: &HandlerDescriptor, route: &RouteDecl) {
        let kind = MetadataKind::Route(route.verb);
        if !self.claim(handler, kind) {
            return;
        }

        let mut path = resolve_prefix(handler.container, &self.groups);
        path.push_str(route.path);
        if path.is_empty() {
            return self.reject(handler, kind, RejectReason::EmptyPath);
        }
        if route.accept_type == Some("") {
            return self.reject(handler, kind, RejectReason::EmptyAcceptType);
        }

        let transformer = match route.transformer.map(|t| t.instantiate()).transpose() {
            Ok(transformer) => transformer,
            Err(err) => {
                let reason = RejectReason::Transformer {
                    transformer: err.transformer,
                    message: err.source.to_string(),
                };
                return self.reject(handler, kind, reason);
            }
        };

        trace!(handler = %handler.qualified_name(), verb = %route.verb, path = %path, "Found route");
        self.table.routes.entry(route.verb).or_default().push(Entry {
            handler: *handler,
            info: RouteInfo {
                path,
                accept_type: route.accept_type.map(str::to_owned),
                transformer,
            },
        });
    }

    fn add_filter(&mut self, handler: &HandlerDescriptor, kind: MetadataKind, filter: &FilterDecl) {
        if !self.claim(handler, kind) {
            return;
        }
        if filter.path == Some("") {
            return self.reject(handler, kind, RejectReason::EmptyPath);
        }
        if filter.accept_type == Some("") {
            return self.reject(handler, kind, RejectReason::EmptyAcceptType);
        }

        let entry = Entry {
            handler: *handler,
            info: FilterInfo {
                path: filter.path.map(str::to_owned),
                accept_type: filter.accept_type.map(str::to_owned),
            },
        };
        trace!(handler = %handler.qualified_name(), %kind, "Found filter");
        match kind {
            MetadataKind::Before => self.table.before_filters.push(entry),
            _ => self.table.after_filters.push(entry),
        }
    }

    fn add_after_after(&mut self, handler: &HandlerDescriptor, path: Option<&'static str>) {
        let kind = MetadataKind::AfterAfter;
        if !self.claim(handler, kind) {
            return;
        }
        if path == Some("") {
            return self.reject(handler, kind, RejectReason::EmptyPath);
        }

        trace!(handler = %handler.qualified_name(), "Found after-after filter");
        self.table.after_after_filters.push(Entry {
            handler: *handler,
            info: AfterAfterInfo {
                path: path.map(str::to_owned),
            },
        });
    }

    fn add_exception(&mut self, handler: &HandlerDescriptor, binding: ExceptionBinding) {
        if !self.claim(handler, MetadataKind::Exception) {
            return;
        }

        trace!(handler = %handler.qualified_name(), kind = %binding.kind, "Found exception handler");
        self.table.exception_handlers.push(Entry {
            handler: *handler,
            info: binding,
        });
    }
}

/// Concatenate the prefixes declared along `container`'s nesting chain,
/// outermost first.
fn resolve_prefix(container: &str, groups: &BTreeMap<&'static str, &'static str>) -> String {
    container
        .match_indices("::")
        .map(|(end, _)| end)
        .chain(std::iter::once(container.len()))
        .filter_map(|end| groups.get(&container[..end]).copied())
        .collect()
}

fn validate_namespace(namespace: &str) -> Result<(), ScanError> {
    let invalid = |reason| ScanError::InvalidNamespace {
        namespace: namespace.to_owned(),
        reason,
    };

    if namespace.is_empty() {
        return Err(invalid("namespace is empty"));
    }
    for segment in namespace.split("::") {
        let mut chars = segment.chars();
        match chars.next() {
            None => return Err(invalid("namespace has an empty path segment")),
            Some(first) if !(first.is_alphabetic() || first == '_') => {
                return Err(invalid("path segment does not start an identifier"));
            }
            Some(_) => {}
        }
        if !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(invalid("path segment is not an identifier"));
        }
    }
    Ok(())
}
