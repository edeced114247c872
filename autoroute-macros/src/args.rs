//! Attribute argument parsing.
//!
//! All attributes accept `ident = value` pairs separated by commas. Routes and
//! path groups also take a leading string literal as shorthand for the path or
//! prefix, and exception handlers a leading type as shorthand for the kind.

use syn::{
    Ident, LitStr, Token, Type,
    parse::{Parse, ParseStream},
};

/// Arguments for the nine verb attributes.
pub(crate) struct RouteArgs {
    pub path: LitStr,
    pub accept_type: Option<LitStr>,
    pub transformer: Option<Type>,
}

/// Arguments for `#[before]` and `#[after]`.
pub(crate) struct FilterArgs {
    pub path: Option<LitStr>,
    pub accept_type: Option<LitStr>,
}

/// Arguments for `#[after_after]`.
pub(crate) struct AfterAfterArgs {
    pub path: Option<LitStr>,
}

/// Arguments for `#[exception_handler]`.
pub(crate) struct ExceptionArgs {
    pub kind: Type,
}

/// Arguments for `#[path_group]` and `path_group_here!`.
pub(crate) struct PathGroupArgs {
    pub prefix: LitStr,
}

/// Parse an optional leading string literal, consuming a trailing comma.
fn leading_lit(input: ParseStream) -> syn::Result<Option<LitStr>> {
    if !input.peek(LitStr) {
        return Ok(None);
    }
    let lit: LitStr = input.parse()?;
    if input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
    }
    Ok(Some(lit))
}

/// Drive an `ident = value` loop, handing each key to `field`.
fn key_values(
    input: ParseStream,
    mut field: impl FnMut(&Ident, ParseStream) -> syn::Result<bool>,
) -> syn::Result<()> {
    while !input.is_empty() {
        let ident: Ident = input.parse()?;
        input.parse::<Token![=]>()?;

        if !field(&ident, input)? {
            return Err(syn::Error::new(
                ident.span(),
                format!("unknown attribute: {}", ident),
            ));
        }

        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
    }
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, ident: &Ident, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(
            ident.span(),
            format!("duplicate attribute: {}", ident),
        ));
    }
    *slot = Some(value);
    Ok(())
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = leading_lit(input)?;
        let mut accept_type = None;
        let mut transformer = None;

        key_values(input, |ident, input| {
            match ident.to_string().as_str() {
                "path" => set_once(&mut path, ident, input.parse()?)?,
                "accept_type" => set_once(&mut accept_type, ident, input.parse()?)?,
                "transformer" => set_once(&mut transformer, ident, input.parse()?)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        let path = path.ok_or_else(|| {
            syn::Error::new(
                input.span(),
                "route attributes require a path: #[get(\"/path\")] or #[get(path = \"/path\")]",
            )
        })?;

        Ok(RouteArgs {
            path,
            accept_type,
            transformer,
        })
    }
}

impl Parse for FilterArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = leading_lit(input)?;
        let mut accept_type = None;

        key_values(input, |ident, input| {
            match ident.to_string().as_str() {
                "path" => set_once(&mut path, ident, input.parse()?)?,
                "accept_type" => set_once(&mut accept_type, ident, input.parse()?)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(FilterArgs { path, accept_type })
    }
}

impl Parse for AfterAfterArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = leading_lit(input)?;

        key_values(input, |ident, input| {
            match ident.to_string().as_str() {
                "path" => set_once(&mut path, ident, input.parse()?)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(AfterAfterArgs { path })
    }
}

impl Parse for ExceptionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut kind = None;

        // `kind = ...` form; anything else is the kind type itself.
        if input.peek(Ident) && input.peek2(Token![=]) {
            key_values(input, |ident, input| {
                match ident.to_string().as_str() {
                    "kind" => set_once(&mut kind, ident, input.parse()?)?,
                    _ => return Ok(false),
                }
                Ok(true)
            })?;
        } else if !input.is_empty() {
            kind = Some(input.parse::<Type>()?);
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        let kind = kind.ok_or_else(|| {
            syn::Error::new(
                input.span(),
                "exception handlers require a kind: #[exception_handler(MyError)]",
            )
        })?;

        Ok(ExceptionArgs { kind })
    }
}

impl Parse for PathGroupArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut prefix = leading_lit(input)?;

        key_values(input, |ident, input| {
            match ident.to_string().as_str() {
                "prefix" => set_once(&mut prefix, ident, input.parse()?)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        let prefix = prefix.ok_or_else(|| {
            syn::Error::new(
                input.span(),
                "path groups require a prefix: #[path_group(\"/prefix\")]",
            )
        })?;

        Ok(PathGroupArgs { prefix })
    }
}
