//! Discovery through the attribute macros and the global registry.

use autoroute::{ExceptionKind, Registry, RouteTable, Scanner, ScanError, Verb};

mod filterexcept {
    use autoroute::{Request, Response};
    use std::error::Error;

    #[autoroute::before]
    fn before(_request: &Request, _response: &mut Response) -> String {
        "before".into()
    }

    #[autoroute::after("/after", accept_type = "text/html")]
    fn after(_request: &Request, _response: &mut Response) -> String {
        "after".into()
    }

    #[autoroute::after_after]
    fn after_after(_request: &Request, _response: &mut Response) -> String {
        "after_after".into()
    }

    #[autoroute::exception_handler(dyn Error + Send + Sync)]
    fn exception(
        error: &(dyn Error + Send + Sync),
        _request: &Request,
        _response: &mut Response,
    ) -> String {
        error.to_string()
    }
}

mod routes {
    use autoroute::{Request, Response};

    #[autoroute::get("/get")]
    fn get(_request: &Request, _response: &mut Response) -> String {
        "get".into()
    }

    #[autoroute::post("/post")]
    fn post(_request: &Request, _response: &mut Response) -> String {
        "post".into()
    }

    #[autoroute::patch("/patch")]
    fn patch(_request: &Request, _response: &mut Response) -> String {
        "patch".into()
    }

    #[autoroute::put("/put")]
    fn put(_request: &Request, _response: &mut Response) -> String {
        "put".into()
    }

    #[autoroute::head("/head")]
    fn head(_request: &Request, _response: &mut Response) -> String {
        "head".into()
    }

    #[autoroute::options("/options")]
    fn options(_request: &Request, _response: &mut Response) -> String {
        "options".into()
    }

    #[autoroute::delete("/delete")]
    fn delete(_request: &Request, _response: &mut Response) -> String {
        "delete".into()
    }

    #[autoroute::connect("/connect")]
    fn connect(_request: &Request, _response: &mut Response) -> String {
        "connect".into()
    }

    #[autoroute::trace("/trace")]
    fn trace(_request: &Request, _response: &mut Response) -> String {
        "trace".into()
    }
}

mod advroute {
    use autoroute::{BoxError, Model, Request, Response, ResponseTransformer};

    pub struct CustomTransformer;

    impl ResponseTransformer for CustomTransformer {
        fn construct() -> Result<Self, BoxError> {
            Ok(CustomTransformer)
        }

        fn render(&self, model: &Model) -> Result<String, BoxError> {
            Ok(format!("<{model}>"))
        }
    }

    #[autoroute::get(
        "/advroute",
        accept_type = "application/json",
        transformer = CustomTransformer
    )]
    fn advroute(_request: &Request, _response: &mut Response) -> String {
        "advroute".into()
    }
}

mod groups {
    #[autoroute::path_group("/parent")]
    mod parent {
        #[autoroute::path_group("/child")]
        mod child {
            use autoroute::{Request, Response};

            #[autoroute::get("/")]
            fn index(_request: &Request, _response: &mut Response) -> String {
                "child".into()
            }
        }
    }
}

fn scan(namespace: &str) -> RouteTable {
    Scanner::new(&Registry::global()).search(namespace).unwrap()
}

fn names<T>(entries: &[autoroute::Entry<T>]) -> Vec<&'static str> {
    entries.iter().map(|entry| entry.handler.name).collect()
}

// ============================================================================
// Filters and exceptions
// ============================================================================

#[test]
fn finds_filters_and_exception_handlers() {
    let table = scan(concat!(module_path!(), "::filterexcept"));

    assert_eq!(names(table.before_filters()), ["before"]);
    assert_eq!(names(table.after_filters()), ["after"]);
    assert_eq!(names(table.after_after_filters()), ["after_after"]);
    assert_eq!(names(table.exception_handlers()), ["exception"]);
    assert_eq!(table.route_count(), 0);

    let after = &table.after_filters()[0].info;
    assert_eq!(after.path.as_deref(), Some("/after"));
    assert_eq!(after.accept_type.as_deref(), Some("text/html"));
    assert_eq!(table.before_filters()[0].info.path, None);
    assert!(table.exception_handlers()[0].info.kind.is_generic());
    assert_eq!(
        table.exception_handlers()[0].info.kind,
        ExceptionKind::any()
    );
}

// ============================================================================
// Routes
// ============================================================================

#[test]
fn finds_one_route_per_verb() {
    let table = scan(concat!(module_path!(), "::routes"));

    assert_eq!(table.route_count(), Verb::ALL.len());
    for verb in Verb::ALL {
        let routes = table.routes(verb);
        assert_eq!(routes.len(), 1, "{verb}");
        let expected = verb.as_str().to_ascii_lowercase();
        assert_eq!(routes[0].handler.name, expected);
        assert_eq!(routes[0].info.path, format!("/{expected}"));
        assert!(routes[0].info.accept_type.is_none());
        assert!(routes[0].info.transformer.is_none());
    }
}

#[test]
fn advanced_route_keeps_accept_type_and_transformer() {
    let table = scan(concat!(module_path!(), "::advroute"));

    let route = &table.routes(Verb::Get)[0];
    assert_eq!(route.info.path, "/advroute");
    assert_eq!(route.info.accept_type.as_deref(), Some("application/json"));
    let transformer = route.info.transformer.as_ref().unwrap();
    assert!(transformer.is::<advroute::CustomTransformer>());
    assert_eq!(transformer.name(), "CustomTransformer");
}

// ============================================================================
// Path groups
// ============================================================================

#[test]
fn nested_path_groups_compose() {
    let namespace = concat!(module_path!(), "::groups");
    let table = scan(namespace);

    let route = &table.routes(Verb::Get)[0];
    assert_eq!(route.info.path, "/parent/child/");
    assert_eq!(
        table.prefix_of(concat!(module_path!(), "::groups::parent")),
        Some("/parent")
    );
    assert_eq!(
        table.prefix_of(concat!(module_path!(), "::groups::parent::child")),
        Some("/parent/child")
    );
}

#[test]
fn inner_namespace_keeps_outer_groups() {
    let table = scan(concat!(module_path!(), "::groups::parent::child"));
    assert_eq!(table.routes(Verb::Get)[0].info.path, "/parent/child/");
    assert_eq!(table.prefix_of(concat!(module_path!(), "::groups::parent")), None);
}

#[test]
fn scanning_is_namespace_scoped() {
    let table = scan(concat!(module_path!(), "::routes"));
    assert!(table.before_filters().is_empty());
    assert!(table.exception_handlers().is_empty());

    let err = Scanner::new(&Registry::global())
        .search(concat!(module_path!(), "::nowhere"))
        .unwrap_err();
    assert!(matches!(err, ScanError::UnknownNamespace { .. }));
}
