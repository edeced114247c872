//! # Routing engine seam
//!
//! The driver never routes requests itself. It hands every resolved handler
//! to a [`RoutingEngine`] through the registration forms below, and the
//! engine owns matching, filter chaining and exception lookup.
//!
//! | handler     | forms                                                        |
//! |-------------|--------------------------------------------------------------|
//! | route       | `route`, `route_accepting`, `route_transformed`, `route_full` |
//! | before      | `before`, `before_path`, `before_path_accepting`              |
//! | after       | `after`, `after_path`, `after_path_accepting`                 |
//! | after-after | `after_after`, `after_after_path`                             |
//! | exception   | `on_exception`                                                |

use crate::generator::{ExceptionAdapter, RouteAdapter};
use autoroute_core::{ExceptionKind, Transformer, Verb};

/// The registration surface of an HTTP routing engine.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot receive discovered routes",
    label = "missing `RoutingEngine` implementation",
    note = "Implement `RoutingEngine` for your server's router to bind discovered handlers into it."
)]
pub trait RoutingEngine {
    /// Register `handler` for `verb` on `path`.
    fn route(&mut self, verb: Verb, path: &str, handler: RouteAdapter);

    /// Register `handler` for `verb` on `path`, restricted to `accept_type`.
    fn route_accepting(&mut self, verb: Verb, path: &str, accept_type: &str, handler: RouteAdapter);

    /// Register `handler` for `verb` on `path`, rendering through `transformer`.
    fn route_transformed(
        &mut self,
        verb: Verb,
        path: &str,
        handler: RouteAdapter,
        transformer: Transformer,
    );

    /// Register `handler` with both an accept type and a transformer.
    fn route_full(
        &mut self,
        verb: Verb,
        path: &str,
        accept_type: &str,
        handler: RouteAdapter,
        transformer: Transformer,
    );

    /// Register a before filter for every path.
    fn before(&mut self, handler: RouteAdapter);

    /// Register a before filter for `path`.
    fn before_path(&mut self, path: &str, handler: RouteAdapter);

    /// Register a before filter for `path` and `accept_type`.
    fn before_path_accepting(&mut self, path: &str, accept_type: &str, handler: RouteAdapter);

    /// Register an after filter for every path.
    fn after(&mut self, handler: RouteAdapter);

    /// Register an after filter for `path`.
    fn after_path(&mut self, path: &str, handler: RouteAdapter);

    /// Register an after filter for `path` and `accept_type`.
    fn after_path_accepting(&mut self, path: &str, accept_type: &str, handler: RouteAdapter);

    /// Register an after-after filter for every path.
    fn after_after(&mut self, handler: RouteAdapter);

    /// Register an after-after filter for `path`.
    fn after_after_path(&mut self, path: &str, handler: RouteAdapter);

    /// Register `handler` for errors of `kind`.
    fn on_exception(&mut self, kind: ExceptionKind, handler: ExceptionAdapter);
}
