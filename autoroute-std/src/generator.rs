//! # Dispatch generator
//!
//! Turns a discovered handler into an adapter with a fixed call shape.
//!
//! The forwarding code itself is compiled ahead of time: the attribute macros
//! emit one stub type per handler. This module validates the handler's
//! recorded signature against the requested shape, instantiates the stub
//! exactly once and wraps it under a process-unique identifier.
//!
//! | shape     | signature                                      |
//! |-----------|------------------------------------------------|
//! | route     | `fn(&Request, &mut Response) -> T`             |
//! | exception | `fn(&Kind, &Request, &mut Response) -> T`      |
//!
//! Validation failures are per handler: they are logged and the handler is
//! skipped. A handler that validates but has no usable stub is a
//! [`SynthesisError`], which aborts registration.

use autoroute_core::{
    ErrorRef, ExceptionDispatch, ExceptionKind, HandlerDescriptor, Output, Param, Passing, Reply,
    Request, Response, RouteDispatch, Stub, SynthesisError, ValidationError,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{trace, warn};

/// Identifiers handed out so far, across every generator in the process.
static RESERVED_IDS: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(Default::default);

/// Reserve `base`, or the first free `base_N`.
fn reserve_id(base: String) -> String {
    let mut ids = RESERVED_IDS.lock();
    let mut candidate = base.clone();
    let mut suffix = 0usize;
    while !ids.insert(candidate.clone()) {
        suffix += 1;
        candidate = format!("{base}_{suffix}");
    }
    candidate
}

fn base_id(shape: &str, container: &str, name: &str) -> String {
    format!(
        "Generated{shape}Dispatch_{}_{name}",
        container.replace("::", "_")
    )
}

/// A route-shaped adapter bound to one handler.
#[derive(Clone)]
pub struct RouteAdapter {
    id: Arc<str>,
    target: Arc<str>,
    stub: Arc<dyn RouteDispatch>,
}

impl RouteAdapter {
    /// The process-unique identifier of this adapter.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The qualified name of the target handler.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl RouteDispatch for RouteAdapter {
    fn dispatch(&self, request: &Request, response: &mut Response) -> Reply {
        self.stub.dispatch(request, response)
    }
}

impl fmt::Debug for RouteAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteAdapter")
            .field("id", &self.id)
            .field("target", &self.target)
            .finish()
    }
}

/// An exception-shaped adapter bound to one handler.
#[derive(Clone)]
pub struct ExceptionAdapter {
    id: Arc<str>,
    target: Arc<str>,
    kind: ExceptionKind,
    stub: Arc<dyn ExceptionDispatch>,
}

impl ExceptionAdapter {
    /// The process-unique identifier of this adapter.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The qualified name of the target handler.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The kind this adapter was generated for.
    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }
}

impl ExceptionDispatch for ExceptionAdapter {
    fn dispatch(&self, error: &ErrorRef, request: &Request, response: &mut Response) -> Reply {
        self.stub.dispatch(error, request, response)
    }
}

impl fmt::Debug for ExceptionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionAdapter")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Validates handlers and produces their adapters.
#[derive(Clone, Copy, Debug, Default)]
pub struct DispatchGenerator;

impl DispatchGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self
    }

    /// Check `handler` against the route shape.
    pub fn validate_route(&self, handler: &HandlerDescriptor) -> Result<(), ValidationError> {
        check_common(handler, 2)?;
        let params = handler.signature.params;
        check_param::<Request>(handler, params, 0, Passing::Ref, "&Request")?;
        check_param::<Response>(handler, params, 1, Passing::MutRef, "&mut Response")
    }

    /// Check `handler` against the exception shape for `kind`.
    pub fn validate_exception(
        &self,
        handler: &HandlerDescriptor,
        kind: &ExceptionKind,
    ) -> Result<(), ValidationError> {
        check_common(handler, 3)?;
        let params = handler.signature.params;

        let first = &params[0];
        let compatible = first.passing == Passing::Ref
            && first
                .type_id
                .is_some_and(|id| kind.accepts_param(id()));
        if !compatible {
            return Err(ValidationError::IncompatibleException {
                handler: handler.qualified_name(),
                kind: kind.name(),
                found: first.display(),
            });
        }

        check_param::<Request>(handler, params, 1, Passing::Ref, "&Request")?;
        check_param::<Response>(handler, params, 2, Passing::MutRef, "&mut Response")
    }

    /// Produce the route adapter for `handler`.
    ///
    /// Returns `Ok(None)` when the handler fails validation; the reason is
    /// logged.
    pub fn generate_route_adapter(
        &self,
        handler: &HandlerDescriptor,
    ) -> Result<Option<RouteAdapter>, SynthesisError> {
        if let Err(err) = self.validate_route(handler) {
            warn!(handler = %handler.qualified_name(), reason = %err, "The route handler will be skipped");
            return Ok(None);
        }
        self.synthesize_route_adapter(handler).map(Some)
    }

    /// Instantiate the route stub of an already validated handler.
    pub(crate) fn synthesize_route_adapter(
        &self,
        handler: &HandlerDescriptor,
    ) -> Result<RouteAdapter, SynthesisError> {
        let factory = match handler.stub {
            Some(Stub::Route(factory)) => factory,
            other => return Err(stub_error(handler, "route", other)),
        };

        let id = reserve_id(base_id("Route", handler.container, handler.name));
        trace!(handler = %handler.qualified_name(), id = %id, "Generated route adapter");
        Ok(RouteAdapter {
            id: id.into(),
            target: handler.qualified_name().into(),
            stub: Arc::from(factory()),
        })
    }

    /// Produce the exception adapter for `handler` bound to `kind`.
    ///
    /// Returns `Ok(None)` when the handler fails validation; the reason is
    /// logged.
    pub fn generate_exception_adapter(
        &self,
        handler: &HandlerDescriptor,
        kind: &ExceptionKind,
    ) -> Result<Option<ExceptionAdapter>, SynthesisError> {
        if let Err(err) = self.validate_exception(handler, kind) {
            warn!(handler = %handler.qualified_name(), reason = %err, "The exception handler will be skipped");
            return Ok(None);
        }
        self.synthesize_exception_adapter(handler, kind).map(Some)
    }

    /// Instantiate the exception stub of an already validated handler.
    pub(crate) fn synthesize_exception_adapter(
        &self,
        handler: &HandlerDescriptor,
        kind: &ExceptionKind,
    ) -> Result<ExceptionAdapter, SynthesisError> {
        let factory = match handler.stub {
            Some(Stub::Exception(factory)) => factory,
            other => return Err(stub_error(handler, "exception", other)),
        };

        let id = reserve_id(base_id("Exception", handler.container, handler.name));
        trace!(handler = %handler.qualified_name(), id = %id, "Generated exception adapter");
        Ok(ExceptionAdapter {
            id: id.into(),
            target: handler.qualified_name().into(),
            kind: *kind,
            stub: Arc::from(factory()),
        })
    }

    /// Wrap a dispatcher that was not discovered, such as a built-in page,
    /// under a reserved identifier.
    pub fn adapt_route<D: RouteDispatch>(
        &self,
        container: &str,
        name: &str,
        dispatch: D,
    ) -> RouteAdapter {
        RouteAdapter {
            id: reserve_id(base_id("Route", container, name)).into(),
            target: format!("{container}::{name}").into(),
            stub: Arc::new(dispatch),
        }
    }
}

fn check_common(handler: &HandlerDescriptor, arity: usize) -> Result<(), ValidationError> {
    let signature = &handler.signature;
    if signature.receiver {
        return Err(ValidationError::Receiver {
            handler: handler.qualified_name(),
        });
    }
    if signature.params.len() != arity {
        return Err(ValidationError::Arity {
            handler: handler.qualified_name(),
            expected: arity,
            found: signature.params.len(),
        });
    }
    if signature.output == Output::Unit {
        return Err(ValidationError::UnitOutput {
            handler: handler.qualified_name(),
        });
    }
    Ok(())
}

fn check_param<T: 'static>(
    handler: &HandlerDescriptor,
    params: &[Param],
    index: usize,
    passing: Passing,
    expected: &'static str,
) -> Result<(), ValidationError> {
    if params[index].is::<T>(passing) {
        return Ok(());
    }
    Err(ValidationError::ParamType {
        handler: handler.qualified_name(),
        index,
        expected,
        found: params[index].display(),
    })
}

fn stub_error(handler: &HandlerDescriptor, expected: &'static str, found: Option<Stub>) -> SynthesisError {
    match found {
        None => SynthesisError::MissingStub {
            handler: handler.qualified_name(),
        },
        Some(stub) => SynthesisError::ShapeMismatch {
            handler: handler.qualified_name(),
            expected,
            found: stub.shape(),
        },
    }
}
