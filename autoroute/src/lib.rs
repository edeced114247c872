//! # autoroute - Annotation-Driven Route Discovery
//!
//! `autoroute` finds HTTP handlers by their attributes and registers them
//! with a routing engine, so no route table has to be written by hand.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use autoroute::prelude::*;
//!
//! #[autoroute::path_group("/api")]
//! mod api {
//!     use autoroute::{Request, Response};
//!
//!     #[autoroute::get("/hello")]
//!     fn hello(_request: &Request, _response: &mut Response) -> String {
//!         "hello".to_owned()
//!     }
//! }
//!
//! let mut router = Autorouter::new(module_path!(), my_engine);
//! router.route()?;                          // GET /api/hello
//! router.enable_route_overview("/_routes")?;
//! ```
//!
//! ## Handler shapes
//!
//! | attribute                      | signature                                   |
//! |--------------------------------|---------------------------------------------|
//! | `#[get]` .. `#[trace]`         | `fn(&Request, &mut Response) -> T`          |
//! | `#[before]`, `#[after]`        | `fn(&Request, &mut Response) -> T`          |
//! | `#[after_after]`               | `fn(&Request, &mut Response) -> T`          |
//! | `#[exception_handler(Kind)]`   | `fn(&Kind, &Request, &mut Response) -> T`   |
//!
//! `T` is anything implementing [`IntoReply`]. Handlers with another shape
//! are logged and skipped at registration.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use autoroute_core::{
    // Declarations
    AfterAfterDecl,
    // Errors
    AlreadyBoundError,
    Annotation,
    AutorouteError,
    BoxError,
    // Exceptions
    Catchable,
    Declaration,
    DispatchError,
    ErrorRef,
    ExceptionDecl,
    // Dispatch
    ExceptionDispatch,
    ExceptionKind,
    FilterDecl,
    HandlerDescriptor,
    IntoReply,
    MetadataKind,
    Model,
    Output,
    Param,
    Passing,
    PathGroupDecl,
    Reply,
    // Carriers
    Request,
    Response,
    // Transformers
    ResponseTransformer,
    RouteDecl,
    RouteDispatch,
    ScanError,
    Signature,
    Stub,
    SynthesisError,
    Transformer,
    TransformerConstructionError,
    TransformerRef,
    ValidationError,
    Verb,
};

// Discovery and registration
pub use autoroute_std::{
    AfterAfterInfo, Autorouter, BindReport, DispatchGenerator, Entry, ExceptionAdapter,
    ExceptionBinding, FilterInfo, Registry, RegistryBuilder, RejectReason, Rejection,
    RouteAdapter, RouteInfo, RouteOverview, RouteTable, RoutingEngine, Scanner, SkipReason,
    Skipped,
};

/// Configuration loading.
#[cfg(feature = "config")]
pub mod config {
    pub use autoroute_std::config::{
        AutorouteConfig, ConfigError, ConfigLoader, DEFAULT_CONFIG_FILE, LogFormat, LogLevel,
        LoggingConfig,
    };
}

/// Logging setup.
#[cfg(feature = "config")]
pub mod logging {
    pub use autoroute_std::logging::init;
}

/// Testing utilities.
pub mod testing {
    pub use autoroute_std::testing::{EngineCall, RecordingEngine, fixtures};
}

/// Prelude module - common imports for autoroute.
///
/// # Usage
///
/// ```rust,ignore
/// use autoroute::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Autorouter, AutorouteError, BoxError, IntoReply, Model, Reply, Request, Response,
        ResponseTransformer, RoutingEngine, Verb,
    };
}

#[cfg(feature = "macros")]
pub use autoroute_macros::{
    after, after_after, before, connect, delete, exception_handler, get, head, options, patch,
    path_group, path_group_here, post, put, trace,
};

#[doc(hidden)]
pub use autoroute_core::inventory;
