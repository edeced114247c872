//! Discovers the handlers in `shop`, binds them into an engine that prints
//! each registration, and mounts the route overview.
//!
//! ```text
//! AUTOROUTE_LOGGING__LEVEL=debug cargo run --example basic
//! ```

use autoroute::config::{AutorouteConfig, ConfigLoader};
use autoroute::prelude::*;
use autoroute::{ExceptionAdapter, ExceptionKind, RouteAdapter, Transformer};

mod shop {
    use autoroute::{Request, Response};
    use std::error::Error;

    #[autoroute::before]
    fn log_request(request: &Request, _response: &mut Response) -> String {
        tracing::info!(verb = %request.verb(), path = request.path(), "Incoming request");
        String::new()
    }

    #[autoroute::after("/shop/items", accept_type = "application/json")]
    fn add_content_type(_request: &Request, response: &mut Response) -> String {
        response.set_header("content-type", "application/json");
        String::new()
    }

    #[autoroute::after_after]
    fn close(_request: &Request, response: &mut Response) -> String {
        response.set_header("connection", "close");
        String::new()
    }

    #[autoroute::exception_handler(dyn Error + Send + Sync)]
    fn internal_error(
        error: &(dyn Error + Send + Sync),
        _request: &Request,
        response: &mut Response,
    ) -> String {
        response.set_status(500);
        error.to_string()
    }

    #[autoroute::path_group("/shop")]
    pub mod items {
        use autoroute::{BoxError, Model, Request, Response};

        #[autoroute::get("/items", accept_type = "application/json")]
        fn list(_request: &Request, _response: &mut Response) -> Result<Model, BoxError> {
            Ok(serde_json::json!([{ "name": "lamp" }, { "name": "chair" }]))
        }
    }
}

/// An engine that only prints what it is given.
#[derive(Default)]
struct PrintingEngine {
    registrations: usize,
}

impl PrintingEngine {
    fn print(&mut self, what: &str, handler: &str) {
        self.registrations += 1;
        println!("{what:<40} -> {handler}");
    }
}

impl RoutingEngine for PrintingEngine {
    fn route(&mut self, verb: Verb, path: &str, handler: RouteAdapter) {
        self.print(&format!("{verb} {path}"), handler.target());
    }

    fn route_accepting(&mut self, verb: Verb, path: &str, accept_type: &str, handler: RouteAdapter) {
        self.print(&format!("{verb} {path} [{accept_type}]"), handler.target());
    }

    fn route_transformed(
        &mut self,
        verb: Verb,
        path: &str,
        handler: RouteAdapter,
        transformer: Transformer,
    ) {
        self.print(&format!("{verb} {path} via {}", transformer.name()), handler.target());
    }

    fn route_full(
        &mut self,
        verb: Verb,
        path: &str,
        accept_type: &str,
        handler: RouteAdapter,
        transformer: Transformer,
    ) {
        self.print(
            &format!("{verb} {path} [{accept_type}] via {}", transformer.name()),
            handler.target(),
        );
    }

    fn before(&mut self, handler: RouteAdapter) {
        self.print("before *", handler.target());
    }

    fn before_path(&mut self, path: &str, handler: RouteAdapter) {
        self.print(&format!("before {path}"), handler.target());
    }

    fn before_path_accepting(&mut self, path: &str, accept_type: &str, handler: RouteAdapter) {
        self.print(&format!("before {path} [{accept_type}]"), handler.target());
    }

    fn after(&mut self, handler: RouteAdapter) {
        self.print("after *", handler.target());
    }

    fn after_path(&mut self, path: &str, handler: RouteAdapter) {
        self.print(&format!("after {path}"), handler.target());
    }

    fn after_path_accepting(&mut self, path: &str, accept_type: &str, handler: RouteAdapter) {
        self.print(&format!("after {path} [{accept_type}]"), handler.target());
    }

    fn after_after(&mut self, handler: RouteAdapter) {
        self.print("after-after *", handler.target());
    }

    fn after_after_path(&mut self, path: &str, handler: RouteAdapter) {
        self.print(&format!("after-after {path}"), handler.target());
    }

    fn on_exception(&mut self, kind: ExceptionKind, handler: ExceptionAdapter) {
        self.print(&format!("exception {kind}"), handler.target());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::new()
        .merge(AutorouteConfig {
            namespace: concat!(module_path!(), "::shop").to_owned(),
            overview_path: Some("/_routes".to_owned()),
            ..AutorouteConfig::default()
        })
        .load()?;
    autoroute::logging::init(&config.logging)?;

    let mut router = Autorouter::from_config(&config, PrintingEngine::default());
    let report = router.route()?;
    if let Some(path) = &config.overview_path {
        router.enable_route_overview(path)?;
    }

    println!(
        "\n{} handlers bound, {} skipped, {} registrations",
        report.bound,
        report.skipped.len(),
        router.engine().registrations
    );
    Ok(())
}
