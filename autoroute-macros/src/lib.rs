//! Attribute macros declaring autoroute handlers.
//!
//! Use these through the `autoroute` facade crate; the generated code refers
//! to `::autoroute` paths.

use proc_macro::TokenStream;
use syn::{ItemFn, ItemMod, parse_macro_input};

mod args;
mod handler;
mod path_group;
mod signature;

use args::{AfterAfterArgs, ExceptionArgs, FilterArgs, PathGroupArgs, RouteArgs};
use handler::Role;

fn route(verb: &'static str, attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as RouteArgs);
    let input = parse_macro_input!(item as ItemFn);
    handler::expand(Role::Route { verb, args }, input).into()
}

macro_rules! verb_attribute {
    ($($name:ident => $variant:literal),* $(,)?) => {
        $(
            #[doc = concat!("Declare a `", stringify!($name), "` route.")]
            ///
            /// Takes a required path (`"/path"` or `path = "/path"`), an optional
            /// `accept_type = "..."` and an optional `transformer = Type`.
            #[proc_macro_attribute]
            pub fn $name(attr: TokenStream, item: TokenStream) -> TokenStream {
                route($variant, attr, item)
            }
        )*
    };
}

verb_attribute! {
    get => "Get",
    post => "Post",
    patch => "Patch",
    put => "Put",
    head => "Head",
    options => "Options",
    delete => "Delete",
    connect => "Connect",
    trace => "Trace",
}

/// Declare a before filter, with an optional `path` and `accept_type`.
#[proc_macro_attribute]
pub fn before(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as FilterArgs);
    let input = parse_macro_input!(item as ItemFn);
    handler::expand(Role::Before(args), input).into()
}

/// Declare an after filter, with an optional `path` and `accept_type`.
#[proc_macro_attribute]
pub fn after(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as FilterArgs);
    let input = parse_macro_input!(item as ItemFn);
    handler::expand(Role::After(args), input).into()
}

/// Declare an after-after filter, with an optional `path`.
#[proc_macro_attribute]
pub fn after_after(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AfterAfterArgs);
    let input = parse_macro_input!(item as ItemFn);
    handler::expand(Role::AfterAfter(args), input).into()
}

/// Declare an exception handler for the given kind.
///
/// `#[exception_handler(MyError)]` catches `MyError` only;
/// `#[exception_handler(dyn Error + Send + Sync)]` catches everything.
#[proc_macro_attribute]
pub fn exception_handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ExceptionArgs);
    let input = parse_macro_input!(item as ItemFn);
    handler::expand(Role::Exception(args), input).into()
}

/// Declare a path-group prefix for a module.
///
/// Every route declared in the module, or in a module nested inside it,
/// has the prefix prepended.
#[proc_macro_attribute]
pub fn path_group(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as PathGroupArgs);
    let module = match syn::parse::<ItemMod>(item) {
        Ok(module) => module,
        Err(err) => {
            return syn::Error::new(err.span(), "#[path_group] can only be used on modules")
                .to_compile_error()
                .into();
        }
    };
    path_group::attribute(args, module).into()
}

/// Declare a path-group prefix for the enclosing module, for file modules.
///
/// ```rust,ignore
/// // src/api/mod.rs
/// autoroute::path_group_here!("/api");
/// ```
#[proc_macro]
pub fn path_group_here(input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(input as PathGroupArgs);
    path_group::inline(args).into()
}
