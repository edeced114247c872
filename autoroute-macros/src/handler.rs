//! Handler attribute expansion.
//!
//! Each handler attribute keeps the function untouched and appends an
//! anonymous `const _` block holding:
//! - the handler's signature constant
//! - a dispatch stub type forwarding to the function, when the signature has
//!   a dispatchable shape
//! - the `inventory::submit!` of its `Declaration`

use crate::args::{AfterAfterArgs, ExceptionArgs, FilterArgs, RouteArgs};
use crate::signature::HandlerSignature;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, ItemFn, LitStr, Type};

/// The routing role an attribute assigns.
pub(crate) enum Role {
    Route { verb: &'static str, args: RouteArgs },
    Before(FilterArgs),
    After(FilterArgs),
    AfterAfter(AfterAfterArgs),
    Exception(ExceptionArgs),
}

/// Implementation of every handler attribute.
pub(crate) fn expand(role: Role, input: ItemFn) -> TokenStream {
    let signature = match HandlerSignature::parse(&input) {
        Ok(signature) => signature,
        Err(err) => {
            let err = err.to_compile_error();
            return quote! { #err #input };
        }
    };

    let fn_name = &input.sig.ident;
    let signature_items = signature.to_items();

    let (stub_items, stub) = match &role {
        Role::Exception(args) if signature.is_exception_shape() => {
            (exception_stub(fn_name, &args.kind), quote! {
                ::core::option::Option::Some(::autoroute::Stub::Exception(__autoroute_stub))
            })
        }
        Role::Exception(_) => (TokenStream::new(), quote! { ::core::option::Option::None }),
        _ if signature.is_route_shape() => (route_stub(fn_name), quote! {
            ::core::option::Option::Some(::autoroute::Stub::Route(__autoroute_stub))
        }),
        _ => (TokenStream::new(), quote! { ::core::option::Option::None }),
    };

    let annotation = annotation(&role);

    quote! {
        #input

        const _: () = {
            #signature_items
            #stub_items

            ::autoroute::inventory::submit! {
                ::autoroute::Declaration {
                    handler: ::autoroute::HandlerDescriptor {
                        container: module_path!(),
                        name: stringify!(#fn_name),
                        signature: __AUTOROUTE_SIGNATURE,
                        stub: #stub,
                    },
                    annotation: #annotation,
                }
            }
        };
    }
}

fn route_stub(fn_name: &Ident) -> TokenStream {
    quote! {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #[doc = concat!("Route dispatch stub generated for `", stringify!(#fn_name), "`")]
        struct __AutorouteStub;

        impl ::autoroute::RouteDispatch for __AutorouteStub {
            #[inline]
            fn dispatch(
                &self,
                __request: &::autoroute::Request,
                __response: &mut ::autoroute::Response,
            ) -> ::autoroute::Reply {
                ::autoroute::IntoReply::into_reply(#fn_name(__request, __response))
            }
        }

        fn __autoroute_stub() -> ::std::boxed::Box<dyn ::autoroute::RouteDispatch> {
            ::std::boxed::Box::new(__AutorouteStub)
        }
    }
}

fn exception_stub(fn_name: &Ident, kind: &Type) -> TokenStream {
    quote! {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #[doc = concat!("Exception dispatch stub generated for `", stringify!(#fn_name), "`")]
        struct __AutorouteStub;

        impl ::autoroute::ExceptionDispatch for __AutorouteStub {
            #[inline]
            fn dispatch(
                &self,
                __error: &::autoroute::ErrorRef,
                __request: &::autoroute::Request,
                __response: &mut ::autoroute::Response,
            ) -> ::autoroute::Reply {
                match <#kind as ::autoroute::Catchable>::catch(__error) {
                    ::core::option::Option::Some(__caught) => {
                        ::autoroute::IntoReply::into_reply(#fn_name(__caught, __request, __response))
                    }
                    ::core::option::Option::None => ::core::result::Result::Err(
                        ::std::boxed::Box::new(::autoroute::DispatchError::ExceptionMismatch {
                            handler: concat!(module_path!(), "::", stringify!(#fn_name)),
                            expected: stringify!(#kind),
                        }),
                    ),
                }
            }
        }

        fn __autoroute_stub() -> ::std::boxed::Box<dyn ::autoroute::ExceptionDispatch> {
            ::std::boxed::Box::new(__AutorouteStub)
        }
    }
}

fn optional(lit: &Option<LitStr>) -> TokenStream {
    match lit {
        Some(lit) => quote! { ::core::option::Option::Some(#lit) },
        None => quote! { ::core::option::Option::None },
    }
}

fn annotation(role: &Role) -> TokenStream {
    match role {
        Role::Route { verb, args } => {
            let verb = format_ident!("{}", verb);
            let path = &args.path;
            let accept_type = optional(&args.accept_type);
            let transformer = match &args.transformer {
                Some(ty) => quote! {
                    ::core::option::Option::Some(
                        ::autoroute::TransformerRef::of::<#ty>(stringify!(#ty))
                    )
                },
                None => quote! { ::core::option::Option::None },
            };
            quote! {
                ::autoroute::Annotation::Route(::autoroute::RouteDecl {
                    verb: ::autoroute::Verb::#verb,
                    path: #path,
                    accept_type: #accept_type,
                    transformer: #transformer,
                })
            }
        }
        Role::Before(args) | Role::After(args) => {
            let variant = if matches!(role, Role::Before(_)) {
                format_ident!("Before")
            } else {
                format_ident!("After")
            };
            let path = optional(&args.path);
            let accept_type = optional(&args.accept_type);
            quote! {
                ::autoroute::Annotation::#variant(::autoroute::FilterDecl {
                    path: #path,
                    accept_type: #accept_type,
                })
            }
        }
        Role::AfterAfter(args) => {
            let path = optional(&args.path);
            quote! {
                ::autoroute::Annotation::AfterAfter(::autoroute::AfterAfterDecl { path: #path })
            }
        }
        Role::Exception(args) => {
            let kind = &args.kind;
            quote! {
                ::autoroute::Annotation::Exception(::autoroute::ExceptionDecl {
                    kind: ::autoroute::ExceptionKind::of::<#kind>(stringify!(#kind)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(role: Role, item: &str) -> String {
        expand(role, syn::parse_str(item).unwrap()).to_string()
    }

    fn get(args: &str) -> Role {
        Role::Route {
            verb: "Get",
            args: syn::parse_str(args).unwrap(),
        }
    }

    #[test]
    fn route_shaped_handler_gets_a_stub() {
        let out = expand_str(
            get(r#""/get""#),
            "fn get(req: &Request, res: &mut Response) -> String { String::new() }",
        );
        assert!(out.contains("RouteDispatch for __AutorouteStub"));
        assert!(out.contains("Stub :: Route"));
        assert!(out.contains("Verb :: Get"));
    }

    #[test]
    fn unit_handler_is_declared_without_stub() {
        let out = expand_str(get(r#""/void""#), "fn void(req: &Request, res: &mut Response) {}");
        assert!(!out.contains("__AutorouteStub"));
        assert!(out.contains("Output :: Unit"));
    }

    #[test]
    fn exception_handler_catches_declared_kind() {
        let out = expand_str(
            Role::Exception(syn::parse_str("MyError").unwrap()),
            "fn oops(e: &MyError, req: &Request, res: &mut Response) -> String { e.to_string() }",
        );
        assert!(out.contains("MyError as :: autoroute :: Catchable"));
        assert!(out.contains("ExceptionDispatch for __AutorouteStub"));
    }

    #[test]
    fn async_handler_is_a_compile_error() {
        let out = expand_str(
            get(r#""/a""#),
            "async fn a(req: &Request, res: &mut Response) -> String { String::new() }",
        );
        assert!(out.contains("compile_error"));
    }

    #[test]
    fn transformer_is_referenced_statically() {
        let out = expand_str(
            get(r#""/json", accept_type = "application/json", transformer = JsonOut"#),
            "fn json(req: &Request, res: &mut Response) -> String { String::new() }",
        );
        assert!(out.contains("TransformerRef :: of"));
        assert!(out.contains("JsonOut"));
        assert!(out.contains("\"application/json\""));
    }
}
