//! # Metadata model
//!
//! Static descriptors for annotated handlers. The attribute macros build these
//! as constants and submit them to [`inventory`], one [`Declaration`] per
//! annotation occurrence and one [`PathGroupDecl`] per path-group module.
//! They can also be built by hand and fed to a registry directly.
//!
//! | attribute                    | annotation                  |
//! |------------------------------|-----------------------------|
//! | `#[get]` .. `#[trace]`       | [`Annotation::Route`]       |
//! | `#[before]`                  | [`Annotation::Before`]      |
//! | `#[after]`                   | [`Annotation::After`]       |
//! | `#[after_after]`             | [`Annotation::AfterAfter`]  |
//! | `#[exception_handler(Kind)]` | [`Annotation::Exception`]   |
//! | `#[path_group]`              | [`PathGroupDecl`]           |

use crate::dispatch::{ExceptionDispatch, RouteDispatch};
use crate::exception::ExceptionKind;
use crate::transform::TransformerRef;
use crate::verb::Verb;
use std::any::TypeId;
use std::fmt;

/// How a parameter is passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Passing {
    /// `T`
    Value,
    /// `&T`
    Ref,
    /// `&mut T`
    MutRef,
}

/// One declared parameter.
#[derive(Clone, Copy)]
pub struct Param {
    /// The referent type as written.
    pub type_name: &'static str,
    /// How it is passed.
    pub passing: Passing,
    /// The referent's type id, when the type is nameable as `'static`.
    pub type_id: Option<fn() -> TypeId>,
}

impl Param {
    /// Whether this parameter is `&T` (or `&mut T`, per `passing`) for exactly `T`.
    pub fn is<T: ?Sized + 'static>(&self, passing: Passing) -> bool {
        self.passing == passing && self.type_id.is_some_and(|id| id() == TypeId::of::<T>())
    }

    /// The parameter type as written, including the reference.
    pub fn display(&self) -> String {
        match self.passing {
            Passing::Value => self.type_name.to_owned(),
            Passing::Ref => format!("&{}", self.type_name),
            Passing::MutRef => format!("&mut {}", self.type_name),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A declared return type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    /// No return type, or `()`.
    Unit,
    /// Some value type, as written.
    Value(&'static str),
}

/// A handler's signature.
#[derive(Clone, Copy, Debug)]
pub struct Signature {
    /// Parameters, in order, excluding any receiver.
    pub params: &'static [Param],
    /// The return type.
    pub output: Output,
    /// Whether the function needs an instance.
    pub receiver: bool,
}

/// A compiled dispatch stub factory.
#[derive(Clone, Copy)]
pub enum Stub {
    /// Produces a route-shaped dispatcher.
    Route(fn() -> Box<dyn RouteDispatch>),
    /// Produces an exception-shaped dispatcher.
    Exception(fn() -> Box<dyn ExceptionDispatch>),
}

impl Stub {
    /// `"route"` or `"exception"`.
    pub fn shape(&self) -> &'static str {
        match self {
            Stub::Route(_) => "route",
            Stub::Exception(_) => "exception",
        }
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stub::{}", self.shape())
    }
}

/// Identifies a discovered handler function.
#[derive(Clone, Copy, Debug)]
pub struct HandlerDescriptor {
    /// The module path of the declaring module.
    pub container: &'static str,
    /// The function name.
    pub name: &'static str,
    /// The function signature.
    pub signature: Signature,
    /// The compiled stub, if the signature had a dispatchable shape.
    pub stub: Option<Stub>,
}

impl HandlerDescriptor {
    /// `container::name`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.container, self.name)
    }

    /// Whether the handler is declared at or below `namespace`.
    pub fn is_within(&self, namespace: &str) -> bool {
        is_within(self.container, namespace)
    }
}

/// A verb route declaration.
#[derive(Clone, Copy, Debug)]
pub struct RouteDecl {
    /// The verb.
    pub verb: Verb,
    /// The declared path segment, before path-group prefixing.
    pub path: &'static str,
    /// The accepted content type, if restricted.
    pub accept_type: Option<&'static str>,
    /// The output transformer, if any.
    pub transformer: Option<TransformerRef>,
}

/// A before or after filter declaration.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterDecl {
    /// The path the filter applies to, or `None` for every path.
    pub path: Option<&'static str>,
    /// The accepted content type, if restricted.
    pub accept_type: Option<&'static str>,
}

/// An after-after filter declaration.
#[derive(Clone, Copy, Debug, Default)]
pub struct AfterAfterDecl {
    /// The path the filter applies to, or `None` for every path.
    pub path: Option<&'static str>,
}

/// An exception handler declaration.
#[derive(Clone, Copy, Debug)]
pub struct ExceptionDecl {
    /// The exception kind handled.
    pub kind: ExceptionKind,
}

/// The routing role a handler declared.
#[derive(Clone, Copy, Debug)]
pub enum Annotation {
    /// A verb route.
    Route(RouteDecl),
    /// A before filter.
    Before(FilterDecl),
    /// An after filter.
    After(FilterDecl),
    /// An after-after filter.
    AfterAfter(AfterAfterDecl),
    /// An exception handler.
    Exception(ExceptionDecl),
}

impl Annotation {
    /// The registry key for this annotation.
    pub fn kind(&self) -> MetadataKind {
        match self {
            Annotation::Route(route) => MetadataKind::Route(route.verb),
            Annotation::Before(_) => MetadataKind::Before,
            Annotation::After(_) => MetadataKind::After,
            Annotation::AfterAfter(_) => MetadataKind::AfterAfter,
            Annotation::Exception(_) => MetadataKind::Exception,
        }
    }
}

/// Registry key: one per annotation shape, with routes split by verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKind {
    /// Exception handlers.
    Exception,
    /// Before filters.
    Before,
    /// After filters.
    After,
    /// After-after filters.
    AfterAfter,
    /// Routes for one verb.
    Route(Verb),
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKind::Exception => f.write_str("exception"),
            MetadataKind::Before => f.write_str("before"),
            MetadataKind::After => f.write_str("after"),
            MetadataKind::AfterAfter => f.write_str("after-after"),
            MetadataKind::Route(verb) => write!(f, "{verb} route"),
        }
    }
}

/// One annotation occurrence on one handler.
#[derive(Clone, Copy, Debug)]
pub struct Declaration {
    /// The annotated function.
    pub handler: HandlerDescriptor,
    /// What it declared.
    pub annotation: Annotation,
}

inventory::collect!(Declaration);

/// A path-group prefix declared by a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathGroupDecl {
    /// The module path of the declaring module.
    pub container: &'static str,
    /// The prefix its handlers inherit.
    pub prefix: &'static str,
}

impl PathGroupDecl {
    /// Whether the declaring module is `namespace` or nested inside it.
    pub fn is_within(&self, namespace: &str) -> bool {
        is_within(self.container, namespace)
    }
}

inventory::collect!(PathGroupDecl);

/// Whether module path `container` is `namespace` or nested inside it.
pub(crate) fn is_within(container: &str, namespace: &str) -> bool {
    match container.strip_prefix(namespace) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}
