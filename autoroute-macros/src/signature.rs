//! Handler signature analysis.
//!
//! Records what a handler looks like so the runtime validator can judge it,
//! and decides whether a dispatch stub can be emitted at all. Only shapes that
//! are syntactically dispatchable get a stub; the rest are still declared so
//! they show up, and get skipped, at registration time.

use proc_macro2::{TokenStream, TokenTree};
use quote::{ToTokens, quote};
use syn::{FnArg, ItemFn, ReturnType, Type};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Passing {
    Value,
    Ref,
    MutRef,
}

pub(crate) struct ParamInfo {
    pub passing: Passing,
    pub elem: Type,
}

pub(crate) struct HandlerSignature {
    pub params: Vec<ParamInfo>,
    pub output: Option<Type>,
}

impl HandlerSignature {
    /// Inspect `item`, rejecting forms that can never be handlers.
    pub fn parse(item: &ItemFn) -> syn::Result<Self> {
        let sig = &item.sig;

        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "handler functions must not be async",
            ));
        }
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "handler functions must not be generic",
            ));
        }
        if let Some(variadic) = &sig.variadic {
            return Err(syn::Error::new_spanned(
                variadic,
                "handler functions must not be variadic",
            ));
        }

        let mut params = Vec::with_capacity(sig.inputs.len());
        for input in &sig.inputs {
            match input {
                FnArg::Receiver(receiver) => {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "handlers must be free functions; move the handler out of the impl block",
                    ));
                }
                FnArg::Typed(pat_type) => params.push(ParamInfo::new(&pat_type.ty)),
            }
        }

        let output = match &sig.output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) => match &**ty {
                Type::Tuple(tuple) if tuple.elems.is_empty() => None,
                Type::Never(_) => None,
                ty => Some(ty.clone()),
            },
        };

        Ok(HandlerSignature { params, output })
    }

    fn has_shape(&self, passing: &[Passing]) -> bool {
        self.output.is_some()
            && self.params.len() == passing.len()
            && self.params.iter().zip(passing).all(|(p, want)| p.passing == *want)
    }

    /// `fn(&Request, &mut Response) -> T`
    pub fn is_route_shape(&self) -> bool {
        self.has_shape(&[Passing::Ref, Passing::MutRef])
    }

    /// `fn(&Kind, &Request, &mut Response) -> T`
    pub fn is_exception_shape(&self) -> bool {
        self.has_shape(&[Passing::Ref, Passing::Ref, Passing::MutRef])
    }

    /// Items defining `__AUTOROUTE_SIGNATURE`, the `::autoroute::Signature`
    /// constant for this handler.
    pub fn to_items(&self) -> TokenStream {
        let params = self.params.iter().map(ParamInfo::to_descriptor);
        let output = match &self.output {
            Some(ty) => quote! { ::autoroute::Output::Value(stringify!(#ty)) },
            None => quote! { ::autoroute::Output::Unit },
        };

        quote! {
            const __AUTOROUTE_PARAMS: &[::autoroute::Param] = &[#(#params),*];
            const __AUTOROUTE_SIGNATURE: ::autoroute::Signature = ::autoroute::Signature {
                params: __AUTOROUTE_PARAMS,
                output: #output,
                receiver: false,
            };
        }
    }
}

impl ParamInfo {
    fn new(ty: &Type) -> Self {
        match ty {
            Type::Reference(reference) => ParamInfo {
                passing: if reference.mutability.is_some() {
                    Passing::MutRef
                } else {
                    Passing::Ref
                },
                elem: unparen(&reference.elem).clone(),
            },
            ty => ParamInfo {
                passing: Passing::Value,
                elem: unparen(ty).clone(),
            },
        }
    }

    fn to_descriptor(&self) -> TokenStream {
        let elem = &self.elem;
        let passing = match self.passing {
            Passing::Value => quote! { ::autoroute::Passing::Value },
            Passing::Ref => quote! { ::autoroute::Passing::Ref },
            Passing::MutRef => quote! { ::autoroute::Passing::MutRef },
        };
        let type_id = if is_nameable(elem.to_token_stream()) {
            quote! {
                ::core::option::Option::Some(
                    ::std::any::TypeId::of::<#elem> as fn() -> ::std::any::TypeId
                )
            }
        } else {
            quote! { ::core::option::Option::None }
        };

        quote! {
            ::autoroute::Param {
                type_name: stringify!(#elem),
                passing: #passing,
                type_id: #type_id,
            }
        }
    }
}

fn unparen(ty: &Type) -> &Type {
    match ty {
        Type::Paren(paren) => unparen(&paren.elem),
        Type::Group(group) => unparen(&group.elem),
        ty => ty,
    }
}

/// Whether a type can be named outside the function: no lifetimes, no
/// `impl Trait`, no `Self`, no inferred parts.
fn is_nameable(tokens: TokenStream) -> bool {
    tokens.into_iter().all(|tree| match tree {
        TokenTree::Group(group) => is_nameable(group.stream()),
        TokenTree::Punct(punct) => punct.as_char() != '\'',
        TokenTree::Ident(ident) => ident != "impl" && ident != "Self" && ident != "_",
        TokenTree::Literal(_) => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> syn::Result<HandlerSignature> {
        HandlerSignature::parse(&syn::parse_str::<ItemFn>(src).unwrap())
    }

    #[test]
    fn route_shape() {
        let sig = parse("fn get(req: &Request, res: &mut Response) -> String { todo!() }").unwrap();
        assert!(sig.is_route_shape());
        assert!(!sig.is_exception_shape());
    }

    #[test]
    fn unit_output_has_no_shape() {
        let sig = parse("fn get(req: &Request, res: &mut Response) {}").unwrap();
        assert!(!sig.is_route_shape());
        let sig = parse("fn get(req: &Request, res: &mut Response) -> () {}").unwrap();
        assert!(!sig.is_route_shape());
    }

    #[test]
    fn wrong_arity_or_passing_has_no_shape() {
        let sig = parse("fn get(req: &Request) -> String { todo!() }").unwrap();
        assert!(!sig.is_route_shape());
        let sig = parse("fn get(req: Request, res: &mut Response) -> String { todo!() }").unwrap();
        assert!(!sig.is_route_shape());
    }

    #[test]
    fn exception_shape() {
        let sig = parse(
            "fn oops(e: &(dyn Error + Send + Sync), req: &Request, res: &mut Response) -> String { todo!() }",
        )
        .unwrap();
        assert!(sig.is_exception_shape());
        assert!(matches!(sig.params[0].elem, Type::TraitObject(_)));
    }

    #[test]
    fn async_and_generic_handlers_are_rejected() {
        assert!(parse("async fn get(req: &Request, res: &mut Response) -> String { todo!() }").is_err());
        assert!(parse("fn get<T>(req: &Request, res: &mut Response) -> T { todo!() }").is_err());
    }

    #[test]
    fn lifetimes_are_not_nameable() {
        let ty: Type = syn::parse_str("Cow<'a, str>").unwrap();
        assert!(!is_nameable(ty.to_token_stream()));
        let ty: Type = syn::parse_str("Vec<impl Display>").unwrap();
        assert!(!is_nameable(ty.to_token_stream()));
        let ty: Type = syn::parse_str("std::collections::HashMap<String, u8>").unwrap();
        assert!(is_nameable(ty.to_token_stream()));
    }
}
