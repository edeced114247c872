//! # Dispatch interfaces
//!
//! Every discovered handler is invoked through one of two fixed call shapes:
//!
//! - [`RouteDispatch`]: `dispatch(request, response)`, used by verb routes and
//!   by before/after/after-after filters
//! - [`ExceptionDispatch`]: `dispatch(error, request, response)`, used by
//!   exception handlers
//!
//! Implementations produced by the attribute macros do nothing but forward to
//! the target function and convert its return value with [`IntoReply`].

use crate::error::BoxError;
use crate::http::{Request, Response};

/// The value a handler produces, before any transformer renders it.
pub type Model = serde_json::Value;

/// The result of one dispatch.
pub type Reply = Result<Model, BoxError>;

/// The error type handed to exception handlers.
pub type ErrorRef = dyn std::error::Error + Send + Sync + 'static;

/// Conversion of a handler's return value into a [`Reply`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a handler",
    label = "handlers must return a value convertible into a reply",
    note = "Return a `serde_json::Value`, a `String`, a `&'static str`, or a `Result` of one of those."
)]
pub trait IntoReply {
    /// Perform the conversion.
    fn into_reply(self) -> Reply;
}

impl IntoReply for Model {
    fn into_reply(self) -> Reply {
        Ok(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Reply {
        Ok(Model::String(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Reply {
        Ok(Model::String(self.to_owned()))
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<BoxError>,
{
    fn into_reply(self) -> Reply {
        self.map_err(Into::into).and_then(IntoReply::into_reply)
    }
}

/// The two-argument call shape shared by routes and filters.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a route dispatcher",
    label = "missing `RouteDispatch` implementation",
    note = "Closures of type `Fn(&Request, &mut Response) -> Reply` implement this trait."
)]
pub trait RouteDispatch: Send + Sync + 'static {
    /// Invoke the target handler.
    fn dispatch(&self, request: &Request, response: &mut Response) -> Reply;
}

impl<F> RouteDispatch for F
where
    F: Fn(&Request, &mut Response) -> Reply + Send + Sync + 'static,
{
    fn dispatch(&self, request: &Request, response: &mut Response) -> Reply {
        (self)(request, response)
    }
}

/// The three-argument call shape used by exception handlers.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an exception dispatcher",
    label = "missing `ExceptionDispatch` implementation"
)]
pub trait ExceptionDispatch: Send + Sync + 'static {
    /// Invoke the target handler with the error that was raised.
    fn dispatch(&self, error: &ErrorRef, request: &Request, response: &mut Response) -> Reply;
}

impl<F> ExceptionDispatch for F
where
    F: Fn(&ErrorRef, &Request, &mut Response) -> Reply + Send + Sync + 'static,
{
    fn dispatch(&self, error: &ErrorRef, request: &Request, response: &mut Response) -> Reply {
        (self)(error, request, response)
    }
}
