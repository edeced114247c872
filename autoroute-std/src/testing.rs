//! Test support.
//!
//! [`fixtures`] builds hand-made declarations without going through the
//! attribute macros. [`RecordingEngine`] is a [`RoutingEngine`] that records
//! every registration call in order and can serve requests through a minimal
//! exact-match pipeline, enough to exercise bound handlers end to end.

use crate::engine::RoutingEngine;
use crate::generator::{ExceptionAdapter, RouteAdapter};
use autoroute_core::{
    BoxError, ErrorRef, ExceptionDispatch, ExceptionKind, Model, Request, Response,
    RouteDispatch, Transformer, Verb,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Hand-built declarations for registry and scanner tests.
pub mod fixtures {
    use autoroute_core::{
        AfterAfterDecl, Annotation, BoxError, Declaration, ErrorRef, ExceptionDecl,
        ExceptionDispatch, ExceptionKind, FilterDecl, HandlerDescriptor, IntoReply, Model, Output,
        Param, Passing, Reply, Request, Response, ResponseTransformer, RouteDecl, RouteDispatch,
        Signature, Stub, TransformerRef, Verb,
    };
    use std::any::TypeId;

    /// `(&Request, &mut Response)`
    pub const ROUTE_PARAMS: &[Param] = &[
        Param {
            type_name: "Request",
            passing: Passing::Ref,
            type_id: Some(TypeId::of::<Request> as fn() -> TypeId),
        },
        Param {
            type_name: "Response",
            passing: Passing::MutRef,
            type_id: Some(TypeId::of::<Response> as fn() -> TypeId),
        },
    ];

    /// `(&(dyn Error + Send + Sync), &Request, &mut Response)`
    pub const EXCEPTION_PARAMS: &[Param] = &[
        Param {
            type_name: "dyn Error + Send + Sync",
            passing: Passing::Ref,
            type_id: Some(TypeId::of::<ErrorRef> as fn() -> TypeId),
        },
        ROUTE_PARAMS[0],
        ROUTE_PARAMS[1],
    ];

    /// `fn(&Request, &mut Response) -> String`
    pub const ROUTE_SIGNATURE: Signature = Signature {
        params: ROUTE_PARAMS,
        output: Output::Value("String"),
        receiver: false,
    };

    /// `fn(&(dyn Error + Send + Sync), &Request, &mut Response) -> String`
    pub const EXCEPTION_SIGNATURE: Signature = Signature {
        params: EXCEPTION_PARAMS,
        output: Output::Value("String"),
        receiver: false,
    };

    /// The handler behind every fixture route: replies with the request path.
    pub fn echo(request: &Request, response: &mut Response) -> String {
        response.set_header("x-handled-by", "echo");
        request.path().to_owned()
    }

    struct Echo;

    impl RouteDispatch for Echo {
        fn dispatch(&self, request: &Request, response: &mut Response) -> Reply {
            echo(request, response).into_reply()
        }
    }

    fn echo_stub() -> Box<dyn RouteDispatch> {
        Box::new(Echo)
    }

    /// The handler behind every fixture exception handler: replies with the
    /// error message.
    pub fn describe(error: &ErrorRef, _request: &Request, response: &mut Response) -> String {
        response.set_status(500);
        error.to_string()
    }

    struct Describe;

    impl ExceptionDispatch for Describe {
        fn dispatch(&self, error: &ErrorRef, request: &Request, response: &mut Response) -> Reply {
            describe(error, request, response).into_reply()
        }
    }

    fn describe_stub() -> Box<dyn ExceptionDispatch> {
        Box::new(Describe)
    }

    /// A route-shaped handler forwarding to [`echo`].
    pub fn route_handler(container: &'static str, name: &'static str) -> HandlerDescriptor {
        HandlerDescriptor {
            container,
            name,
            signature: ROUTE_SIGNATURE,
            stub: Some(Stub::Route(echo_stub)),
        }
    }

    /// An exception-shaped handler forwarding to [`describe`].
    pub fn exception_handler(container: &'static str, name: &'static str) -> HandlerDescriptor {
        HandlerDescriptor {
            container,
            name,
            signature: EXCEPTION_SIGNATURE,
            stub: Some(Stub::Exception(describe_stub)),
        }
    }

    /// A plain verb route.
    pub fn route(
        container: &'static str,
        name: &'static str,
        verb: Verb,
        path: &'static str,
    ) -> Declaration {
        route_with(container, name, verb, path, None, None)
    }

    /// A verb route with every option spelled out.
    pub fn route_with(
        container: &'static str,
        name: &'static str,
        verb: Verb,
        path: &'static str,
        accept_type: Option<&'static str>,
        transformer: Option<TransformerRef>,
    ) -> Declaration {
        Declaration {
            handler: route_handler(container, name),
            annotation: Annotation::Route(RouteDecl {
                verb,
                path,
                accept_type,
                transformer,
            }),
        }
    }

    /// A before filter.
    pub fn before(
        container: &'static str,
        name: &'static str,
        path: Option<&'static str>,
        accept_type: Option<&'static str>,
    ) -> Declaration {
        Declaration {
            handler: route_handler(container, name),
            annotation: Annotation::Before(FilterDecl { path, accept_type }),
        }
    }

    /// An after filter.
    pub fn after(
        container: &'static str,
        name: &'static str,
        path: Option<&'static str>,
        accept_type: Option<&'static str>,
    ) -> Declaration {
        Declaration {
            handler: route_handler(container, name),
            annotation: Annotation::After(FilterDecl { path, accept_type }),
        }
    }

    /// An after-after filter.
    pub fn after_after(
        container: &'static str,
        name: &'static str,
        path: Option<&'static str>,
    ) -> Declaration {
        Declaration {
            handler: route_handler(container, name),
            annotation: Annotation::AfterAfter(AfterAfterDecl { path }),
        }
    }

    /// An exception handler for `kind`.
    pub fn exception(
        container: &'static str,
        name: &'static str,
        kind: ExceptionKind,
    ) -> Declaration {
        Declaration {
            handler: exception_handler(container, name),
            annotation: Annotation::Exception(ExceptionDecl { kind }),
        }
    }

    /// Renders string models in upper case.
    #[derive(Debug)]
    pub struct Uppercase;

    impl ResponseTransformer for Uppercase {
        fn construct() -> Result<Self, BoxError> {
            Ok(Uppercase)
        }

        fn render(&self, model: &Model) -> Result<String, BoxError> {
            Ok(match model {
                Model::String(s) => s.to_uppercase(),
                other => other.to_string().to_uppercase(),
            })
        }
    }

    /// A transformer that can never be constructed.
    #[derive(Debug)]
    pub struct Failing;

    impl ResponseTransformer for Failing {
        fn construct() -> Result<Self, BoxError> {
            Err("missing template directory".into())
        }

        fn render(&self, _model: &Model) -> Result<String, BoxError> {
            Err("never constructed".into())
        }
    }
}

// ============================================================================
// Recording Engine
// ============================================================================

/// One registration call received by a [`RecordingEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    /// Any of the four route forms.
    Route {
        /// The verb.
        verb: Verb,
        /// The full path.
        path: String,
        /// `Some` for `route_accepting` and `route_full`.
        accept_type: Option<String>,
        /// `Some` for `route_transformed` and `route_full`.
        transformer: Option<&'static str>,
        /// The adapter's target handler.
        handler: String,
    },
    /// A before filter.
    Before {
        /// `None` for the global form.
        path: Option<String>,
        /// `Some` for the accepting form.
        accept_type: Option<String>,
        /// The adapter's target handler.
        handler: String,
    },
    /// An after filter.
    After {
        /// `None` for the global form.
        path: Option<String>,
        /// `Some` for the accepting form.
        accept_type: Option<String>,
        /// The adapter's target handler.
        handler: String,
    },
    /// An after-after filter.
    AfterAfter {
        /// `None` for the global form.
        path: Option<String>,
        /// The adapter's target handler.
        handler: String,
    },
    /// An exception handler.
    Exception {
        /// The kind's display name.
        kind: &'static str,
        /// The adapter's target handler.
        handler: String,
    },
}

struct BoundRoute {
    verb: Verb,
    path: String,
    accept_type: Option<String>,
    transformer: Option<Transformer>,
    handler: RouteAdapter,
}

struct BoundFilter {
    path: Option<String>,
    accept_type: Option<String>,
    handler: RouteAdapter,
}

impl BoundFilter {
    fn applies(&self, request: &Request) -> bool {
        self.path.as_deref().is_none_or(|p| p == request.path())
            && self
                .accept_type
                .as_deref()
                .is_none_or(|a| request.accept() == Some(a))
    }
}

/// A [`RoutingEngine`] that records registrations and serves them naively.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Vec<EngineCall>,
    routes: Vec<BoundRoute>,
    before: Vec<BoundFilter>,
    after: Vec<BoundFilter>,
    after_after: Vec<BoundFilter>,
    exceptions: Vec<(ExceptionKind, ExceptionAdapter)>,
}

impl RecordingEngine {
    /// An engine with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registration call, in the order received.
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// The route adapter registered for `verb` and `path`, if any.
    pub fn route_adapter(&self, verb: Verb, path: &str) -> Option<&RouteAdapter> {
        self.routes
            .iter()
            .find(|r| r.verb == verb && r.path == path)
            .map(|r| &r.handler)
    }

    /// Every route adapter, in registration order.
    pub fn route_adapters(&self) -> impl Iterator<Item = &RouteAdapter> {
        self.routes.iter().map(|r| &r.handler)
    }

    /// Every exception adapter, in registration order.
    pub fn exception_adapters(&self) -> impl Iterator<Item = &ExceptionAdapter> {
        self.exceptions.iter().map(|(_, adapter)| adapter)
    }

    /// Serve one request.
    ///
    /// Before filters run first, then the first matching route, then after
    /// filters. Errors from any of them go to the first exception handler
    /// whose specific kind matches, else to the first generic one.
    /// After-after filters always run last. Unmatched
    /// requests get `404`, unhandled errors `500`.
    pub fn serve(&self, request: &Request) -> Response {
        let mut response = Response::new();
        if let Err(error) = self.run_chain(request, &mut response) {
            self.handle_error(error.as_ref(), request, &mut response);
        }
        for filter in self.after_after.iter().filter(|f| f.applies(request)) {
            // After-after output never reaches the client.
            let _ = filter.handler.dispatch(request, &mut response);
        }
        response
    }

    fn run_chain(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), BoxError> {
        for filter in self.before.iter().filter(|f| f.applies(request)) {
            filter.handler.dispatch(request, response)?;
        }

        let route = self.routes.iter().find(|r| {
            r.verb == request.verb()
                && r.path == request.path()
                && r.accept_type
                    .as_deref()
                    .is_none_or(|a| request.accept() == Some(a))
        });
        match route {
            Some(route) => {
                let model = route.handler.dispatch(request, response)?;
                let body = match &route.transformer {
                    Some(transformer) => transformer.render(&model)?,
                    None => render_plain(&model),
                };
                response.set_body(body);
            }
            None => response.set_status(404),
        }

        for filter in self.after.iter().filter(|f| f.applies(request)) {
            filter.handler.dispatch(request, response)?;
        }
        Ok(())
    }

    fn handle_error(&self, error: &ErrorRef, request: &Request, response: &mut Response) {
        let matching = || self.exceptions.iter().filter(|(kind, _)| kind.matches(error));
        let handler = matching()
            .find(|(kind, _)| !kind.is_generic())
            .or_else(|| matching().next())
            .map(|(_, adapter)| adapter);
        match handler.map(|h| h.dispatch(error, request, response)) {
            Some(Ok(model)) => response.set_body(render_plain(&model)),
            Some(Err(_)) | None => {
                response.set_status(500);
                response.set_body(error.to_string());
            }
        }
    }

    fn filter(
        &mut self,
        kind: FilterKind,
        path: Option<&str>,
        accept_type: Option<&str>,
        handler: RouteAdapter,
    ) {
        let path = path.map(str::to_owned);
        let accept_type = accept_type.map(str::to_owned);
        let target = handler.target().to_owned();
        let bound = BoundFilter {
            path: path.clone(),
            accept_type: accept_type.clone(),
            handler,
        };
        match kind {
            FilterKind::Before => {
                self.calls.push(EngineCall::Before {
                    path,
                    accept_type,
                    handler: target,
                });
                self.before.push(bound);
            }
            FilterKind::After => {
                self.calls.push(EngineCall::After {
                    path,
                    accept_type,
                    handler: target,
                });
                self.after.push(bound);
            }
            FilterKind::AfterAfter => {
                self.calls.push(EngineCall::AfterAfter {
                    path,
                    handler: target,
                });
                self.after_after.push(bound);
            }
        }
    }

    fn add_route(
        &mut self,
        verb: Verb,
        path: &str,
        accept_type: Option<&str>,
        handler: RouteAdapter,
        transformer: Option<Transformer>,
    ) {
        self.calls.push(EngineCall::Route {
            verb,
            path: path.to_owned(),
            accept_type: accept_type.map(str::to_owned),
            transformer: transformer.as_ref().map(Transformer::name),
            handler: handler.target().to_owned(),
        });
        self.routes.push(BoundRoute {
            verb,
            path: path.to_owned(),
            accept_type: accept_type.map(str::to_owned),
            transformer,
            handler,
        });
    }
}

#[derive(Clone, Copy)]
enum FilterKind {
    Before,
    After,
    AfterAfter,
}

fn render_plain(model: &Model) -> String {
    match model {
        Model::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RoutingEngine for RecordingEngine {
    fn route(&mut self, verb: Verb, path: &str, handler: RouteAdapter) {
        self.add_route(verb, path, None, handler, None);
    }

    fn route_accepting(&mut self, verb: Verb, path: &str, accept_type: &str, handler: RouteAdapter) {
        self.add_route(verb, path, Some(accept_type), handler, None);
    }

    fn route_transformed(
        &mut self,
        verb: Verb,
        path: &str,
        handler: RouteAdapter,
        transformer: Transformer,
    ) {
        self.add_route(verb, path, None, handler, Some(transformer));
    }

    fn route_full(
        &mut self,
        verb: Verb,
        path: &str,
        accept_type: &str,
        handler: RouteAdapter,
        transformer: Transformer,
    ) {
        self.add_route(verb, path, Some(accept_type), handler, Some(transformer));
    }

    fn before(&mut self, handler: RouteAdapter) {
        self.filter(FilterKind::Before, None, None, handler);
    }

    fn before_path(&mut self, path: &str, handler: RouteAdapter) {
        self.filter(FilterKind::Before, Some(path), None, handler);
    }

    fn before_path_accepting(&mut self, path: &str, accept_type: &str, handler: RouteAdapter) {
        self.filter(FilterKind::Before, Some(path), Some(accept_type), handler);
    }

    fn after(&mut self, handler: RouteAdapter) {
        self.filter(FilterKind::After, None, None, handler);
    }

    fn after_path(&mut self, path: &str, handler: RouteAdapter) {
        self.filter(FilterKind::After, Some(path), None, handler);
    }

    fn after_path_accepting(&mut self, path: &str, accept_type: &str, handler: RouteAdapter) {
        self.filter(FilterKind::After, Some(path), Some(accept_type), handler);
    }

    fn after_after(&mut self, handler: RouteAdapter) {
        self.filter(FilterKind::AfterAfter, None, None, handler);
    }

    fn after_after_path(&mut self, path: &str, handler: RouteAdapter) {
        self.filter(FilterKind::AfterAfter, Some(path), None, handler);
    }

    fn on_exception(&mut self, kind: ExceptionKind, handler: ExceptionAdapter) {
        self.calls.push(EngineCall::Exception {
            kind: kind.name(),
            handler: handler.target().to_owned(),
        });
        self.exceptions.push((kind, handler));
    }
}
