//! End-to-end registration through the attribute macros.

use autoroute::testing::{EngineCall, RecordingEngine};
use autoroute::{
    AlreadyBoundError, AutorouteError, Autorouter, Request, SkipReason, ValidationError, Verb,
};
use std::collections::HashSet;

mod site {
    use autoroute::{Request, Response};
    use std::error::Error;

    #[derive(Debug, thiserror::Error)]
    #[error("forbidden")]
    pub struct Forbidden;

    #[autoroute::before("/admin")]
    fn guard(request: &Request, _response: &mut Response) -> Result<String, Forbidden> {
        match request.header("authorization") {
            Some(_) => Ok(String::new()),
            None => Err(Forbidden),
        }
    }

    #[autoroute::after]
    fn stamp(_request: &Request, response: &mut Response) -> String {
        response.set_header("x-stamped", "yes");
        String::new()
    }

    #[autoroute::after_after]
    fn finish(_request: &Request, response: &mut Response) -> String {
        response.set_header("x-finished", "yes");
        String::new()
    }

    #[autoroute::exception_handler(Forbidden)]
    fn forbidden(_error: &Forbidden, _request: &Request, response: &mut Response) -> String {
        response.set_status(403);
        "go away".into()
    }

    #[autoroute::exception_handler(dyn Error + Send + Sync)]
    fn fallback(
        error: &(dyn Error + Send + Sync),
        _request: &Request,
        response: &mut Response,
    ) -> String {
        response.set_status(500);
        format!("oops: {error}")
    }

    #[autoroute::path_group("/admin")]
    pub mod admin {
        use autoroute::{Request, Response};

        #[autoroute::get("")]
        fn dashboard(_request: &Request, _response: &mut Response) -> String {
            "dashboard".into()
        }
    }

    pub mod api {
        use autoroute::{BoxError, Model, Request, Response, ResponseTransformer};

        pub struct Wrap;

        impl ResponseTransformer for Wrap {
            fn construct() -> Result<Self, BoxError> {
                Ok(Wrap)
            }

            fn render(&self, model: &Model) -> Result<String, BoxError> {
                Ok(serde_json::json!({ "data": model }).to_string())
            }
        }

        #[autoroute::post("/api/echo", accept_type = "application/json", transformer = Wrap)]
        fn echo(request: &Request, _response: &mut Response) -> String {
            request.body().to_owned()
        }

        #[autoroute::get("/api/boom")]
        fn boom(_request: &Request, _response: &mut Response) -> Result<String, std::io::Error> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    pub mod broken {
        use autoroute::{Request, Response};

        #[autoroute::get("/void")]
        fn void(_request: &Request, _response: &mut Response) {}

        #[autoroute::get("/lonely")]
        fn lonely(_request: &Request) -> String {
            String::new()
        }

        #[autoroute::get("/fine")]
        fn fine(_request: &Request, _response: &mut Response) -> &'static str {
            "fine"
        }
    }
}

fn router(namespace: &str) -> Autorouter<RecordingEngine> {
    Autorouter::new(namespace, RecordingEngine::new())
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn binds_hooks_before_routes() {
    let mut router = router(concat!(module_path!(), "::site"));
    let report = router.route().unwrap();

    let calls = router.engine().calls();
    let first_route = calls
        .iter()
        .position(|call| matches!(call, EngineCall::Route { .. }))
        .unwrap();
    assert!(calls[..first_route].iter().all(|call| !matches!(call, EngineCall::Route { .. })));
    assert!(matches!(calls[0], EngineCall::Exception { .. }));
    assert!(matches!(calls[1], EngineCall::Exception { .. }));
    assert_eq!(calls[2], EngineCall::Before {
        path: Some("/admin".into()),
        accept_type: None,
        handler: concat!(module_path!(), "::site::guard").into(),
    });
    assert!(matches!(calls[3], EngineCall::After { path: None, .. }));
    assert!(matches!(calls[4], EngineCall::AfterAfter { path: None, .. }));
    assert_eq!(report.bound, calls.len());
}

#[test]
fn full_form_route_gets_accept_type_and_transformer() {
    let mut router = router(concat!(module_path!(), "::site::api"));
    router.route().unwrap();

    assert!(router.engine().calls().contains(&EngineCall::Route {
        verb: Verb::Post,
        path: "/api/echo".into(),
        accept_type: Some("application/json".into()),
        transformer: Some("Wrap"),
        handler: concat!(module_path!(), "::site::api::echo").into(),
    }));

    let response = router.engine().serve(
        &Request::new(Verb::Post, "/api/echo")
            .with_accept("application/json")
            .with_body("hi"),
    );
    assert_eq!(response.body(), Some(r#"{"data":"hi"}"#));
}

#[test]
fn invalid_handlers_are_skipped_not_fatal() {
    let mut router = router(concat!(module_path!(), "::site::broken"));
    let report = router.route().unwrap();

    assert_eq!(report.bound, 1);
    let reasons: Vec<_> = report.skipped.iter().map(|s| &s.reason).collect();
    assert!(reasons.iter().any(|r| matches!(
        r,
        SkipReason::Validation(ValidationError::UnitOutput { .. })
    )));
    assert!(reasons.iter().any(|r| matches!(
        r,
        SkipReason::Validation(ValidationError::Arity { expected: 2, found: 1, .. })
    )));

    let engine = router.engine();
    assert!(engine.route_adapter(Verb::Get, "/fine").is_some());
    assert!(engine.route_adapter(Verb::Get, "/void").is_none());
    assert!(engine.route_adapter(Verb::Get, "/lonely").is_none());
}

#[test]
fn adapter_identifiers_are_unique() {
    let mut first = router(concat!(module_path!(), "::site"));
    first.route().unwrap();
    let mut second = router(concat!(module_path!(), "::site"));
    second.route().unwrap();

    let ids: Vec<String> = [first.engine(), second.engine()]
        .into_iter()
        .flat_map(|engine| {
            engine
                .route_adapters()
                .map(|a| a.id().to_owned())
                .chain(engine.exception_adapters().map(|a| a.id().to_owned()))
                .collect::<Vec<_>>()
        })
        .collect();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

// ============================================================================
// Binding twice
// ============================================================================

#[test]
fn second_route_call_is_rejected() {
    let mut router = router(concat!(module_path!(), "::site::api"));
    router.route().unwrap();
    let before = router.engine().calls().len();

    let err = router.route().unwrap_err();
    assert!(matches!(
        err,
        AutorouteError::AlreadyBound(AlreadyBoundError::Routes)
    ));
    assert_eq!(router.engine().calls().len(), before);
}

// ============================================================================
// Serving
// ============================================================================

#[test]
fn filters_and_exceptions_cooperate() {
    let mut router = router(concat!(module_path!(), "::site"));
    router.route().unwrap();
    let engine = router.engine();

    let denied = engine.serve(&Request::new(Verb::Get, "/admin"));
    assert_eq!(denied.status(), 403);
    assert_eq!(denied.body(), Some("go away"));
    assert_eq!(denied.header("x-finished"), Some("yes"));
    assert_eq!(denied.header("x-stamped"), None);

    let allowed =
        engine.serve(&Request::new(Verb::Get, "/admin").with_header("Authorization", "token"));
    assert_eq!(allowed.status(), 200);
    assert_eq!(allowed.body(), Some("dashboard"));
    assert_eq!(allowed.header("x-stamped"), Some("yes"));
    assert_eq!(allowed.header("x-finished"), Some("yes"));

    let boom = engine.serve(&Request::new(Verb::Get, "/api/boom"));
    assert_eq!(boom.status(), 500);
    assert_eq!(boom.body(), Some("oops: disk on fire"));
}

#[test]
fn overview_lists_what_was_bound() {
    let mut router = router(concat!(module_path!(), "::site::admin"));
    router.route().unwrap();
    router.enable_route_overview("/_routes").unwrap();

    let response = router.engine().serve(&Request::new(Verb::Get, "/_routes"));
    let model: serde_json::Value = serde_json::from_str(response.body().unwrap()).unwrap();
    assert_eq!(model["routes"][0]["path"], "/admin");
    assert_eq!(model["routes"][0]["accept_type"], "*/*");
    assert_eq!(model["path_groups"][0]["prefix"], "/admin");
}
