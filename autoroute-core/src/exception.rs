//! Exception kinds.
//!
//! An exception handler declares the kind of error it catches. A kind is a
//! concrete error type, or the generic `dyn Error + Send + Sync` family that
//! catches everything.

use crate::dispatch::ErrorRef;
use std::any::TypeId;
use std::error::Error;
use std::fmt;

/// A type an exception handler can catch.
///
/// Implemented for every sized error type through downcasting, and for
/// `dyn Error + Send + Sync`, which matches any error.
pub trait Catchable: 'static {
    /// Borrow `error` as `Self` if it is of this kind.
    fn catch(error: &ErrorRef) -> Option<&Self>;
}

impl<E: Error + Send + Sync + 'static> Catchable for E {
    fn catch(error: &ErrorRef) -> Option<&Self> {
        error.downcast_ref::<E>()
    }
}

impl Catchable for dyn Error + Send + Sync {
    fn catch(error: &ErrorRef) -> Option<&Self> {
        Some(error)
    }
}

fn catches<K: Catchable + ?Sized>(error: &ErrorRef) -> bool {
    K::catch(error).is_some()
}

/// A static tag for one exception category.
#[derive(Clone, Copy)]
pub struct ExceptionKind {
    name: &'static str,
    id: fn() -> TypeId,
    matches: fn(&ErrorRef) -> bool,
}

impl ExceptionKind {
    /// The kind for type `K`, displayed as `name`.
    pub const fn of<K: Catchable + ?Sized>(name: &'static str) -> Self {
        Self {
            name,
            id: TypeId::of::<K>,
            matches: catches::<K>,
        }
    }

    /// The generic kind that catches every error.
    pub const fn any() -> Self {
        Self::of::<dyn Error + Send + Sync>("dyn Error + Send + Sync")
    }

    /// The display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type id of the kind.
    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    /// Whether this is the generic kind.
    pub fn is_generic(&self) -> bool {
        is_generic_error(self.type_id())
    }

    /// Whether `error` belongs to this kind.
    pub fn matches(&self, error: &ErrorRef) -> bool {
        (self.matches)(error)
    }

    /// Whether a handler whose first parameter is `&P` (with `P` identified by
    /// `param`) can receive errors of this kind.
    pub fn accepts_param(&self, param: TypeId) -> bool {
        param == self.type_id() || is_generic_error(param)
    }
}

/// Whether `id` names one of the `dyn Error` trait objects.
pub(crate) fn is_generic_error(id: TypeId) -> bool {
    id == TypeId::of::<dyn Error + Send + Sync>()
        || id == TypeId::of::<dyn Error + Send>()
        || id == TypeId::of::<dyn Error>()
}

impl PartialEq for ExceptionKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for ExceptionKind {}

impl fmt::Debug for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExceptionKind").field(&self.name).finish()
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
