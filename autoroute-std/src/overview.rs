//! Route overview.
//!
//! A read-only JSON model of one [`RouteTable`], meant to be served as a
//! debugging page. Every row names the handler by its qualified name.

use crate::table::{Entry, FilterInfo, RouteTable};
use autoroute_core::{Model, Verb};
use serde::Serialize;

const ANY_PATH: &str = "*";
const ANY_ACCEPT: &str = "*/*";
const NO_TRANSFORMER: &str = "none";

/// One path-group module and its resolved prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathGroupRow {
    /// The declaring module path.
    pub container: String,
    /// The composed prefix.
    pub prefix: String,
}

/// One before or after filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterRow {
    /// The qualified handler name.
    pub handler: String,
    /// The filtered path, `*` when global.
    pub path: String,
    /// The accepted content type, `*/*` when unrestricted.
    pub accept_type: String,
}

/// One after-after filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AfterAfterRow {
    /// The qualified handler name.
    pub handler: String,
    /// The filtered path, `*` when global.
    pub path: String,
}

/// One exception handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExceptionRow {
    /// The qualified handler name.
    pub handler: String,
    /// The caught kind.
    pub exception: String,
}

/// One verb route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    /// The qualified handler name.
    pub handler: String,
    /// The verb.
    pub verb: Verb,
    /// The effective path.
    pub path: String,
    /// The accepted content type, `*/*` when unrestricted.
    pub accept_type: String,
    /// The transformer type name, `none` when absent.
    pub transformer: String,
}

/// The overview of one scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteOverview {
    /// The scanned namespace.
    pub namespace: String,
    /// Path-group modules.
    pub path_groups: Vec<PathGroupRow>,
    /// Before filters.
    pub before: Vec<FilterRow>,
    /// After filters.
    pub after: Vec<FilterRow>,
    /// After-after filters.
    pub after_after: Vec<AfterAfterRow>,
    /// Exception handlers.
    pub exceptions: Vec<ExceptionRow>,
    /// Verb routes.
    pub routes: Vec<RouteRow>,
}

impl RouteOverview {
    /// Resolve the rows of `table`.
    pub fn new(table: &RouteTable) -> Self {
        let filter_row = |entry: &Entry<FilterInfo>| FilterRow {
            handler: entry.qualified_name(),
            path: entry.info.path.as_deref().unwrap_or(ANY_PATH).to_owned(),
            accept_type: entry.info.accept_type.as_deref().unwrap_or(ANY_ACCEPT).to_owned(),
        };

        Self {
            namespace: table.namespace().to_owned(),
            path_groups: table
                .path_group_prefixes()
                .iter()
                .map(|(container, prefix)| PathGroupRow {
                    container: (*container).to_owned(),
                    prefix: prefix.clone(),
                })
                .collect(),
            before: table.before_filters().iter().map(filter_row).collect(),
            after: table.after_filters().iter().map(filter_row).collect(),
            after_after: table
                .after_after_filters()
                .iter()
                .map(|entry| AfterAfterRow {
                    handler: entry.qualified_name(),
                    path: entry.info.path.as_deref().unwrap_or(ANY_PATH).to_owned(),
                })
                .collect(),
            exceptions: table
                .exception_handlers()
                .iter()
                .map(|entry| ExceptionRow {
                    handler: entry.qualified_name(),
                    exception: entry.info.kind.name().to_owned(),
                })
                .collect(),
            routes: table
                .all_routes()
                .map(|(verb, entry)| RouteRow {
                    handler: entry.qualified_name(),
                    verb,
                    path: entry.info.path.clone(),
                    accept_type: entry.info.accept_type.as_deref().unwrap_or(ANY_ACCEPT).to_owned(),
                    transformer: entry
                        .info
                        .transformer
                        .as_ref()
                        .map_or(NO_TRANSFORMER, |t| t.name())
                        .to_owned(),
                })
                .collect(),
        }
    }

    /// The overview as a JSON model.
    pub fn to_model(&self) -> Result<Model, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::scanner::Scanner;
    use crate::testing::fixtures::{self, Uppercase};
    use autoroute_core::{ExceptionKind, TransformerRef};

    #[test]
    fn rows_resolve_defaults() {
        let registry = Registry::builder()
            .path_group("site::api", "/api")
            .declare(fixtures::before("site", "auth", None, None))
            .declare(fixtures::after("site", "stamp", Some("/x"), Some("text/html")))
            .declare(fixtures::after_after("site", "close", None))
            .declare(fixtures::exception("site", "oops", ExceptionKind::any()))
            .declare(fixtures::route("site::api", "list", Verb::Get, "/items"))
            .declare(fixtures::route_with(
                "site::api",
                "create",
                Verb::Post,
                "/items",
                Some("application/json"),
                Some(TransformerRef::of::<Uppercase>("Uppercase")),
            ))
            .build();
        let table = Scanner::new(&registry).search("site").unwrap();
        let overview = RouteOverview::new(&table);

        assert_eq!(overview.path_groups, [PathGroupRow {
            container: "site::api".into(),
            prefix: "/api".into(),
        }]);
        assert_eq!(overview.before[0].path, "*");
        assert_eq!(overview.before[0].accept_type, "*/*");
        assert_eq!(overview.after[0].path, "/x");
        assert_eq!(overview.after_after[0].handler, "site::close");
        assert_eq!(overview.exceptions[0].exception, ExceptionKind::any().name());
        assert_eq!(overview.routes.len(), 2);
        assert_eq!(overview.routes[0].verb, Verb::Get);
        assert_eq!(overview.routes[0].path, "/api/items");
        assert_eq!(overview.routes[0].transformer, "none");
        assert_eq!(overview.routes[1].accept_type, "application/json");
        assert_eq!(overview.routes[1].transformer, "Uppercase");
    }

    #[test]
    fn model_has_every_section() {
        let registry = Registry::builder()
            .declare(fixtures::route("site", "index", Verb::Get, "/"))
            .build();
        let table = Scanner::new(&registry).search("site").unwrap();
        let model = RouteOverview::new(&table).to_model().unwrap();

        for section in ["path_groups", "before", "after", "after_after", "exceptions", "routes"] {
            assert!(model[section].is_array(), "missing section {section}");
        }
        assert_eq!(model["routes"][0]["verb"], "GET");
        assert_eq!(model["routes"][0]["handler"], "site::index");
        assert_eq!(model["namespace"], "site");
    }
}
