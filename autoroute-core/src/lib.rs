//! # autoroute-core
//!
//! Metadata model and dispatch traits for the autoroute handler discovery
//! framework.
//!
//! This crate has minimal dependencies and is what generated code and
//! routing-engine integrations link against. The discovery and registration
//! machinery lives in `autoroute-std`.
//!
//! # Layers
//!
//! ## Carriers ([`Request`], [`Response`])
//!
//! The two framework types every handler receives. A route-shaped handler is
//! `fn(&Request, &mut Response) -> impl IntoReply`; an exception-shaped
//! handler additionally receives the caught error first.
//!
//! ## Dispatch ([`RouteDispatch`], [`ExceptionDispatch`])
//!
//! The narrow call interfaces every discovered handler is adapted to. The
//! attribute macros emit one stub type per handler implementing exactly one
//! of them by forwarding straight to the function.
//!
//! ## Metadata ([`Declaration`], [`PathGroupDecl`])
//!
//! Static descriptors submitted to the link-time [`inventory`] registry:
//! which function, which signature, and which routing role it declared.
//!
//! # Error Types
//!
//! - [`AutorouteError`] - Top-level error type
//! - [`ScanError`] - Namespace enumeration errors
//! - [`ValidationError`] - Handler signature mismatches
//! - [`SynthesisError`] - Missing or mismatched dispatch stubs

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod dispatch;
mod error;
mod exception;
mod http;
mod metadata;
mod transform;
mod verb;

// Re-exports
pub use dispatch::{ErrorRef, ExceptionDispatch, IntoReply, Model, Reply, RouteDispatch};
pub use error::{
    AlreadyBoundError, AutorouteError, BoxError, DispatchError, ScanError, SynthesisError,
    TransformerConstructionError, ValidationError,
};
pub use exception::{Catchable, ExceptionKind};
pub use http::{Request, Response};
pub use metadata::{
    AfterAfterDecl, Annotation, Declaration, ExceptionDecl, FilterDecl, HandlerDescriptor,
    MetadataKind, Output, Param, Passing, PathGroupDecl, RouteDecl, Signature, Stub,
};
pub use transform::{ResponseTransformer, Transformer, TransformerRef};
pub use verb::Verb;

pub use inventory;
