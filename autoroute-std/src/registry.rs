//! Metadata registry.
//!
//! A [`Registry`] maps each [`MetadataKind`] to the declarations of that kind,
//! plus the list of path-group prefixes. The global registry is collected once
//! from everything the attribute macros submitted to [`inventory`]; tests and
//! embedders may also build one by hand.

use autoroute_core::{Declaration, HandlerDescriptor, MetadataKind, PathGroupDecl};
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::collect()));

/// Declarations keyed by metadata kind.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    declarations: BTreeMap<MetadataKind, Vec<Declaration>>,
    path_groups: Vec<PathGroupDecl>,
}

impl Registry {
    /// The registry of every declaration linked into this binary.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Collect a fresh registry from the link-time declarations.
    pub fn collect() -> Self {
        let mut builder = Self::builder();
        for declaration in inventory::iter::<Declaration> {
            builder = builder.declare(*declaration);
        }
        for group in inventory::iter::<PathGroupDecl> {
            builder = builder.path_group(group.container, group.prefix);
        }
        let registry = builder.build();
        debug!(
            declarations = registry.len(),
            path_groups = registry.path_groups.len(),
            "Collected handler declarations"
        );
        registry
    }

    /// Start building a registry by hand.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Every declaration of `kind`, ordered by qualified handler name.
    pub fn declarations(&self, kind: MetadataKind) -> &[Declaration] {
        self.declarations
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every declared path group, ordered by container.
    pub fn path_groups(&self) -> &[PathGroupDecl] {
        &self.path_groups
    }

    /// Iterate over every non-empty kind.
    pub fn kinds(&self) -> impl Iterator<Item = (MetadataKind, &[Declaration])> {
        self.declarations
            .iter()
            .map(|(kind, decls)| (*kind, decls.as_slice()))
    }

    /// Total number of handler declarations.
    pub fn len(&self) -> usize {
        self.declarations.values().map(Vec::len).sum()
    }

    /// Whether nothing at all is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.path_groups.is_empty()
    }

    /// Whether anything is declared at or below `namespace`.
    pub fn declares_within(&self, namespace: &str) -> bool {
        self.path_groups.iter().any(|g| g.is_within(namespace))
            || self
                .declarations
                .values()
                .flatten()
                .any(|d| d.handler.is_within(namespace))
    }
}

/// Builder for constructing a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one annotation occurrence.
    pub fn declare(mut self, declaration: Declaration) -> Self {
        self.registry
            .declarations
            .entry(declaration.annotation.kind())
            .or_default()
            .push(declaration);
        self
    }

    /// Register a path-group prefix for the module `container`.
    pub fn path_group(mut self, container: &'static str, prefix: &'static str) -> Self {
        self.registry
            .path_groups
            .push(PathGroupDecl { container, prefix });
        self
    }

    /// Build the registry.
    pub fn build(mut self) -> Registry {
        // Stable sorts keep repeated declarations in submission order.
        for decls in self.registry.declarations.values_mut() {
            decls.sort_by(|a, b| handler_order(&a.handler, &b.handler));
        }
        self.registry.path_groups.sort_by_key(|g| g.container);
        self.registry
    }
}

fn handler_order(a: &HandlerDescriptor, b: &HandlerDescriptor) -> std::cmp::Ordering {
    (a.container, a.name).cmp(&(b.container, b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use autoroute_core::Verb;

    #[test]
    fn declarations_are_grouped_by_kind_and_sorted() {
        let registry = Registry::builder()
            .declare(fixtures::route("app::b", "zeta", Verb::Get, "/z"))
            .declare(fixtures::route("app::a", "alpha", Verb::Get, "/a"))
            .declare(fixtures::route("app::a", "alpha", Verb::Post, "/a"))
            .declare(fixtures::before("app::a", "guard", None, None))
            .build();

        let gets = registry.declarations(MetadataKind::Route(Verb::Get));
        assert_eq!(gets.len(), 2);
        assert_eq!(gets[0].handler.name, "alpha");
        assert_eq!(gets[1].handler.name, "zeta");
        assert_eq!(registry.declarations(MetadataKind::Route(Verb::Post)).len(), 1);
        assert_eq!(registry.declarations(MetadataKind::Before).len(), 1);
        assert!(registry.declarations(MetadataKind::Exception).is_empty());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn namespace_lookup() {
        let registry = Registry::builder()
            .path_group("app::api", "/api")
            .declare(fixtures::route("app::web", "index", Verb::Get, "/"))
            .build();

        assert!(registry.declares_within("app"));
        assert!(registry.declares_within("app::api"));
        assert!(registry.declares_within("app::web"));
        assert!(!registry.declares_within("app::admin"));
        assert!(!registry.declares_within("ap"));
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::builder().build();
        assert!(registry.is_empty());
        assert_eq!(registry.kinds().count(), 0);
    }
}
