//! Output transformers.
//!
//! A route may name a transformer type that renders its [`Model`] into the
//! response body. The type is referenced statically through a
//! [`TransformerRef`] and constructed once, with no arguments, when the route
//! table is built.

use crate::dispatch::Model;
use crate::error::{BoxError, TransformerConstructionError};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Renders a handler's model into a response body.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a response transformer",
    label = "missing `ResponseTransformer` implementation"
)]
pub trait ResponseTransformer: Send + Sync + 'static {
    /// Construct the transformer with no arguments.
    fn construct() -> Result<Self, BoxError>
    where
        Self: Sized;

    /// Render `model` into a body.
    fn render(&self, model: &Model) -> Result<String, BoxError>;
}

type Constructor = fn() -> Result<Box<dyn ResponseTransformer>, BoxError>;

fn construct_boxed<T: ResponseTransformer>() -> Result<Box<dyn ResponseTransformer>, BoxError> {
    T::construct().map(|t| Box::new(t) as Box<dyn ResponseTransformer>)
}

/// A static reference to a transformer type, suitable for link-time
/// registration.
#[derive(Clone, Copy)]
pub struct TransformerRef {
    name: &'static str,
    type_id: fn() -> TypeId,
    construct: Constructor,
}

impl TransformerRef {
    /// Reference the transformer type `T` under a display name.
    pub const fn of<T: ResponseTransformer>(name: &'static str) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>,
            construct: construct_boxed::<T>,
        }
    }

    /// The display name (usually the type path as written).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The referenced type's id.
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Construct a fresh instance.
    pub fn instantiate(&self) -> Result<Transformer, TransformerConstructionError> {
        let instance = (self.construct)().map_err(|source| TransformerConstructionError {
            transformer: self.name,
            source,
        })?;
        Ok(Transformer {
            name: self.name,
            type_id: self.type_id(),
            instance: Arc::from(instance),
        })
    }
}

impl fmt::Debug for TransformerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransformerRef").field(&self.name).finish()
    }
}

/// A constructed transformer instance, shared by every request on its route.
#[derive(Clone)]
pub struct Transformer {
    name: &'static str,
    type_id: TypeId,
    instance: Arc<dyn ResponseTransformer>,
}

impl Transformer {
    /// The display name of the transformer type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the instance is of type `T`.
    pub fn is<T: ResponseTransformer>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Render `model` with the instance.
    pub fn render(&self, model: &Model) -> Result<String, BoxError> {
        self.instance.render(model)
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transformer").field(&self.name).finish()
    }
}
