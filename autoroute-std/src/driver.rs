//! # Registration driver
//!
//! [`Autorouter`] ties the pieces together: it scans one namespace of a
//! [`Registry`], generates an adapter per handler and binds each adapter into
//! a [`RoutingEngine`] with the registration form its metadata calls for.
//!
//! ```rust,ignore
//! let mut router = Autorouter::new("my_app::routes", engine);
//! let report = router.route()?;
//! router.enable_route_overview("/_routes")?;
//! ```
//!
//! # Binding order
//!
//! Exception handlers, before filters, after filters, after-after filters,
//! then routes grouped by verb in [`Verb::ALL`] order.
//!
//! # Binding twice
//!
//! A driver binds at most once. Any later [`Autorouter::bind_all`] or
//! [`Autorouter::route`] call fails with [`AlreadyBoundError::Routes`] without
//! touching the engine, even if the first attempt failed midway.

use crate::engine::RoutingEngine;
use crate::generator::{DispatchGenerator, ExceptionAdapter, RouteAdapter};
use crate::overview::RouteOverview;
use crate::registry::Registry;
use crate::scanner::Scanner;
use crate::table::{AfterAfterInfo, Entry, FilterInfo, RouteTable};
use autoroute_core::{
    AlreadyBoundError, AutorouteError, ExceptionKind, HandlerDescriptor, Model, Reply, Request,
    Response, ScanError, SynthesisError, ValidationError, Verb,
};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Module path reported for the built-in overview handler.
const OVERVIEW_CONTAINER: &str = "autoroute::overview";

/// Why a handler in the table was not bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The handler's signature does not fit its shape.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A filter restricts the accept type without naming a path.
    #[error("filter declares an accept type without a path")]
    AcceptWithoutPath,
}

/// One handler left out of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// The qualified handler name.
    pub handler: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// The outcome of one [`Autorouter::bind_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Number of registrations handed to the engine.
    pub bound: usize,
    /// Handlers left out, in binding order.
    pub skipped: Vec<Skipped>,
}

impl BindReport {
    fn skip(&mut self, handler: &HandlerDescriptor, reason: SkipReason) {
        warn!(handler = %handler.qualified_name(), %reason, "Skipping handler");
        self.skipped.push(Skipped {
            handler: handler.qualified_name(),
            reason,
        });
    }
}

#[derive(Clone, Copy)]
enum Hook {
    Before,
    After,
}

/// Discovers handlers in one namespace and binds them into an engine.
pub struct Autorouter<E: RoutingEngine> {
    engine: E,
    registry: Arc<Registry>,
    namespace: String,
    generator: DispatchGenerator,
    last_search: Arc<RwLock<Option<Arc<RouteTable>>>>,
    bound: bool,
    overview: Option<String>,
}

impl<E: RoutingEngine> Autorouter<E> {
    /// A driver over every handler linked into this binary.
    pub fn new(namespace: impl Into<String>, engine: E) -> Self {
        Self::with_registry(namespace, engine, Registry::global())
    }

    /// A driver over an explicit registry.
    pub fn with_registry(namespace: impl Into<String>, engine: E, registry: Arc<Registry>) -> Self {
        Self {
            engine,
            registry,
            namespace: namespace.into(),
            generator: DispatchGenerator::new(),
            last_search: Arc::default(),
            bound: false,
            overview: None,
        }
    }

    /// A driver for the configured namespace over the global registry.
    #[cfg(feature = "config")]
    pub fn from_config(config: &crate::config::AutorouteConfig, engine: E) -> Self {
        Self::new(config.namespace.clone(), engine)
    }

    /// The namespace this driver scans.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Scan the namespace, replacing the last table.
    pub fn search(&mut self) -> Result<Arc<RouteTable>, ScanError> {
        let table = Arc::new(Scanner::new(&self.registry).search(&self.namespace)?);
        *self.last_search.write() = Some(Arc::clone(&table));
        Ok(table)
    }

    /// The table from the last [`search`](Self::search), if any.
    pub fn last_search(&self) -> Option<Arc<RouteTable>> {
        self.last_search.read().clone()
    }

    /// Scan, then bind the result.
    pub fn route(&mut self) -> Result<BindReport, AutorouteError> {
        if self.bound {
            return Err(AlreadyBoundError::Routes.into());
        }
        let table = self.search()?;
        self.bind_all(&table)
    }

    /// Bind every handler of `table` into the engine.
    pub fn bind_all(&mut self, table: &RouteTable) -> Result<BindReport, AutorouteError> {
        if self.bound {
            return Err(AlreadyBoundError::Routes.into());
        }
        self.bound = true;

        let mut report = BindReport::default();
        self.bind_exceptions(table, &mut report)?;
        self.bind_filters(Hook::Before, table.before_filters(), &mut report)?;
        self.bind_filters(Hook::After, table.after_filters(), &mut report)?;
        self.bind_after_after(table.after_after_filters(), &mut report)?;
        self.bind_routes(table, &mut report)?;

        info!(
            namespace = %self.namespace,
            bound = report.bound,
            skipped = report.skipped.len(),
            "Bound discovered handlers"
        );
        Ok(report)
    }

    /// Mount a `GET` route at `path` answering with the overview of the last
    /// table.
    ///
    /// The overview is read at request time, so it follows later searches.
    /// Requests made before any search get status `400`.
    pub fn enable_route_overview(&mut self, path: &str) -> Result<(), AutorouteError> {
        if let Some(mounted) = &self.overview {
            return Err(AlreadyBoundError::Overview(mounted.clone()).into());
        }

        let last_search = Arc::clone(&self.last_search);
        let page = move |_request: &Request, response: &mut Response| -> Reply {
            match last_search.read().as_ref() {
                Some(table) => Ok(RouteOverview::new(table).to_model()?),
                None => {
                    response.set_status(400);
                    Ok(Model::String("no routes have been discovered yet".into()))
                }
            }
        };

        let adapter = self.generator.adapt_route(OVERVIEW_CONTAINER, "route_overview", page);
        self.engine.route(Verb::Get, path, adapter);
        self.overview = Some(path.to_owned());
        debug!(path, "Mounted route overview");
        Ok(())
    }

    /// Where the overview is mounted, if it is.
    pub fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }

    /// Whether routes have been bound.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Give the engine back.
    pub fn into_engine(self) -> E {
        self.engine
    }

    fn route_adapter(
        &self,
        handler: &HandlerDescriptor,
        report: &mut BindReport,
    ) -> Result<Option<RouteAdapter>, SynthesisError> {
        match self.generator.validate_route(handler) {
            Ok(()) => self.generator.synthesize_route_adapter(handler).map(Some),
            Err(err) => {
                report.skip(handler, err.into());
                Ok(None)
            }
        }
    }

    fn exception_adapter(
        &self,
        handler: &HandlerDescriptor,
        kind: &ExceptionKind,
        report: &mut BindReport,
    ) -> Result<Option<ExceptionAdapter>, SynthesisError> {
        match self.generator.validate_exception(handler, kind) {
            Ok(()) => self.generator.synthesize_exception_adapter(handler, kind).map(Some),
            Err(err) => {
                report.skip(handler, err.into());
                Ok(None)
            }
        }
    }

    fn bind_exceptions(
        &mut self,
        table: &RouteTable,
        report: &mut BindReport,
    ) -> Result<(), SynthesisError> {
        for entry in table.exception_handlers() {
            let kind = entry.info.kind;
            let Some(adapter) = self.exception_adapter(&entry.handler, &kind, report)? else {
                continue;
            };
            self.engine.on_exception(kind, adapter);
            report.bound += 1;
        }
        Ok(())
    }

    fn bind_filters(
        &mut self,
        hook: Hook,
        filters: &[Entry<FilterInfo>],
        report: &mut BindReport,
    ) -> Result<(), SynthesisError> {
        for entry in filters {
            let info = &entry.info;
            if info.path.is_none() && info.accept_type.is_some() {
                report.skip(&entry.handler, SkipReason::AcceptWithoutPath);
                continue;
            }
            let Some(adapter) = self.route_adapter(&entry.handler, report)? else {
                continue;
            };

            let engine = &mut self.engine;
            match (hook, info.path.as_deref(), info.accept_type.as_deref()) {
                (Hook::Before, None, _) => engine.before(adapter),
                (Hook::Before, Some(path), None) => engine.before_path(path, adapter),
                (Hook::Before, Some(path), Some(accept)) => {
                    engine.before_path_accepting(path, accept, adapter)
                }
                (Hook::After, None, _) => engine.after(adapter),
                (Hook::After, Some(path), None) => engine.after_path(path, adapter),
                (Hook::After, Some(path), Some(accept)) => {
                    engine.after_path_accepting(path, accept, adapter)
                }
            }
            report.bound += 1;
        }
        Ok(())
    }

    fn bind_after_after(
        &mut self,
        filters: &[Entry<AfterAfterInfo>],
        report: &mut BindReport,
    ) -> Result<(), SynthesisError> {
        for entry in filters {
            let Some(adapter) = self.route_adapter(&entry.handler, report)? else {
                continue;
            };
            match entry.info.path.as_deref() {
                Some(path) => self.engine.after_after_path(path, adapter),
                None => self.engine.after_after(adapter),
            }
            report.bound += 1;
        }
        Ok(())
    }

    fn bind_routes(
        &mut self,
        table: &RouteTable,
        report: &mut BindReport,
    ) -> Result<(), SynthesisError> {
        for verb in Verb::ALL {
            for entry in table.routes(verb) {
                let Some(adapter) = self.route_adapter(&entry.handler, report)? else {
                    continue;
                };
                let info = &entry.info;
                let engine = &mut self.engine;
                match (info.accept_type.as_deref(), info.transformer.clone()) {
                    (None, None) => engine.route(verb, &info.path, adapter),
                    (Some(accept), None) => engine.route_accepting(verb, &info.path, accept, adapter),
                    (None, Some(transformer)) => {
                        engine.route_transformed(verb, &info.path, adapter, transformer)
                    }
                    (Some(accept), Some(transformer)) => {
                        engine.route_full(verb, &info.path, accept, adapter, transformer)
                    }
                }
                report.bound += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{self, Uppercase};
    use crate::testing::{EngineCall, RecordingEngine};
    use autoroute_core::{Output, Signature, TransformerRef};

    fn router(registry: Registry) -> Autorouter<RecordingEngine> {
        Autorouter::with_registry("app", RecordingEngine::new(), Arc::new(registry))
    }

    // ========================================================================
    // Binding
    // ========================================================================

    #[test]
    fn binds_in_fixed_order() {
        let registry = Registry::builder()
            .declare(fixtures::route("app", "index", Verb::Get, "/"))
            .declare(fixtures::after_after("app", "close", None))
            .declare(fixtures::after("app", "stamp", Some("/x"), None))
            .declare(fixtures::before("app", "auth", Some("/x"), Some("text/html")))
            .declare(fixtures::exception("app", "oops", ExceptionKind::any()))
            .declare(fixtures::route("app", "remove", Verb::Delete, "/"))
            .build();

        let mut router = router(registry);
        let report = router.route().unwrap();
        assert_eq!(report.bound, 6);
        assert!(report.skipped.is_empty());

        let calls = router.engine().calls();
        assert!(matches!(calls[0], EngineCall::Exception { .. }));
        assert_eq!(calls[1], EngineCall::Before {
            path: Some("/x".into()),
            accept_type: Some("text/html".into()),
            handler: "app::auth".into(),
        });
        assert_eq!(calls[2], EngineCall::After {
            path: Some("/x".into()),
            accept_type: None,
            handler: "app::stamp".into(),
        });
        assert_eq!(calls[3], EngineCall::AfterAfter {
            path: None,
            handler: "app::close".into(),
        });
        assert!(matches!(&calls[4], EngineCall::Route { verb: Verb::Get, .. }));
        assert!(matches!(&calls[5], EngineCall::Route { verb: Verb::Delete, .. }));
    }

    #[test]
    fn route_form_follows_metadata() {
        let shout = Some(TransformerRef::of::<Uppercase>("Uppercase"));
        let registry = Registry::builder()
            .declare(fixtures::route_with("app", "a_bare", Verb::Get, "/a", None, None))
            .declare(fixtures::route_with("app", "b_typed", Verb::Get, "/b", Some("text/plain"), None))
            .declare(fixtures::route_with("app", "c_loud", Verb::Get, "/c", None, shout))
            .declare(fixtures::route_with("app", "d_full", Verb::Get, "/d", Some("text/plain"), shout))
            .build();

        let mut router = router(registry);
        router.route().unwrap();

        let forms: Vec<_> = router
            .engine()
            .calls()
            .iter()
            .map(|call| match call {
                EngineCall::Route {
                    accept_type,
                    transformer,
                    ..
                } => (accept_type.is_some(), transformer.is_some()),
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(forms, [(false, false), (true, false), (false, true), (true, true)]);
    }

    #[test]
    fn accept_without_path_is_skipped() {
        let registry = Registry::builder()
            .declare(fixtures::before("app", "odd", None, Some("text/html")))
            .build();

        let mut router = router(registry);
        let report = router.route().unwrap();
        assert_eq!(report.bound, 0);
        assert_eq!(report.skipped, [Skipped {
            handler: "app::odd".into(),
            reason: SkipReason::AcceptWithoutPath,
        }]);
        assert!(router.engine().calls().is_empty());
    }

    #[test]
    fn invalid_handlers_never_reach_the_engine() {
        let mut unit = fixtures::route("app", "unit", Verb::Get, "/unit");
        unit.handler.signature = Signature {
            output: Output::Unit,
            ..fixtures::ROUTE_SIGNATURE
        };
        let registry = Registry::builder()
            .declare(unit)
            .declare(fixtures::route("app", "fine", Verb::Get, "/fine"))
            .build();

        let mut router = router(registry);
        let report = router.route().unwrap();
        assert_eq!(report.bound, 1);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::Validation(ValidationError::UnitOutput { .. })
        ));
        assert!(router.engine().route_adapter(Verb::Get, "/unit").is_none());
        assert!(router.engine().route_adapter(Verb::Get, "/fine").is_some());
    }

    #[test]
    fn missing_stub_aborts_binding() {
        let mut broken = fixtures::route("app", "broken", Verb::Get, "/broken");
        broken.handler.stub = None;
        let registry = Registry::builder().declare(broken).build();

        let mut router = router(registry);
        let err = router.route().unwrap_err();
        assert!(matches!(err, AutorouteError::Synthesis(SynthesisError::MissingStub { .. })));
        assert!(router.is_bound());
    }

    #[test]
    fn exception_stub_in_route_position_aborts() {
        let mut crossed = fixtures::route("app", "crossed", Verb::Get, "/x");
        crossed.handler.stub = fixtures::exception_handler("app", "crossed").stub;
        let registry = Registry::builder().declare(crossed).build();

        let err = router(registry).route().unwrap_err();
        assert!(matches!(err, AutorouteError::Synthesis(SynthesisError::ShapeMismatch { .. })));
    }

    // ========================================================================
    // Binding twice
    // ========================================================================

    #[test]
    fn second_bind_is_rejected_before_the_engine() {
        let registry = Registry::builder()
            .declare(fixtures::route("app", "index", Verb::Get, "/"))
            .build();

        let mut router = router(registry);
        router.route().unwrap();
        let table = router.last_search().unwrap();

        assert!(matches!(
            router.route(),
            Err(AutorouteError::AlreadyBound(AlreadyBoundError::Routes))
        ));
        assert!(matches!(
            router.bind_all(&table),
            Err(AutorouteError::AlreadyBound(AlreadyBoundError::Routes))
        ));
        assert_eq!(router.engine().calls().len(), 1);
    }

    #[test]
    fn unknown_namespace_fails_the_search() {
        let registry = Registry::builder()
            .declare(fixtures::route("elsewhere", "index", Verb::Get, "/"))
            .build();

        let err = router(registry).route().unwrap_err();
        assert!(matches!(
            err,
            AutorouteError::Scan(ScanError::UnknownNamespace { .. })
        ));
    }

    // ========================================================================
    // Overview
    // ========================================================================

    #[test]
    fn overview_answers_400_before_any_search() {
        let mut router = router(Registry::builder().build());
        router.enable_route_overview("/_routes").unwrap();

        let response = router
            .engine()
            .serve(&autoroute_core::Request::new(Verb::Get, "/_routes"));
        assert_eq!(response.status(), 400);
    }

    #[test]
    fn overview_reflects_the_last_search() {
        let registry = Registry::builder()
            .declare(fixtures::route("app", "index", Verb::Get, "/"))
            .build();
        let mut router = router(registry);
        router.enable_route_overview("/_routes").unwrap();
        router.route().unwrap();

        let response = router
            .engine()
            .serve(&autoroute_core::Request::new(Verb::Get, "/_routes"));
        assert_eq!(response.status(), 200);
        let model: Model = serde_json::from_str(response.body().unwrap()).unwrap();
        assert_eq!(model["routes"][0]["handler"], "app::index");
        assert_eq!(model["routes"][0]["path"], "/");
    }

    #[test]
    fn overview_mounts_once() {
        let mut router = router(Registry::builder().build());
        router.enable_route_overview("/_routes").unwrap();
        let err = router.enable_route_overview("/other").unwrap_err();
        assert!(matches!(
            err,
            AutorouteError::AlreadyBound(AlreadyBoundError::Overview(ref path)) if path == "/_routes"
        ));
        assert_eq!(router.overview(), Some("/_routes"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn from_config_uses_the_configured_namespace() {
        let config = crate::config::AutorouteConfig {
            namespace: "app::web".to_owned(),
            ..Default::default()
        };
        let router = Autorouter::from_config(&config, RecordingEngine::new());
        assert_eq!(router.namespace(), "app::web");
        assert!(!router.is_bound());
    }
}
