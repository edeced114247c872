//! Path-group macros.
//!
//! - `#[path_group("/prefix")]` on a `mod` item declares the prefix for that module
//! - `path_group_here!("/prefix");` declares it for the module it is invoked in

use crate::args::PathGroupArgs;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemMod;

/// Implementation of `#[path_group]`.
pub(crate) fn attribute(args: PathGroupArgs, module: ItemMod) -> TokenStream {
    let name = &module.ident;
    let prefix = &args.prefix;

    quote! {
        #module

        const _: () = {
            ::autoroute::inventory::submit! {
                ::autoroute::PathGroupDecl {
                    container: concat!(module_path!(), "::", stringify!(#name)),
                    prefix: #prefix,
                }
            }
        };
    }
}

/// Implementation of `path_group_here!`.
pub(crate) fn inline(args: PathGroupArgs) -> TokenStream {
    let prefix = &args.prefix;

    quote! {
        const _: () = {
            ::autoroute::inventory::submit! {
                ::autoroute::PathGroupDecl {
                    container: module_path!(),
                    prefix: #prefix,
                }
            }
        };
    }
}
