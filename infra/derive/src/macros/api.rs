use super::derived_traits;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token};

/// Arguments accepted by `#[api_model(...)]`.
#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

/// Serde settings already present on the struct.
#[derive(Default)]
struct ExistingSerde {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match build_model(args, &input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn build_model(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let args = parse_model_args(args)?;
    let existing = existing_serde(&input.attrs)?;
    let derives = derived_traits(&input.attrs);

    let mut derive_list = Vec::new();
    for (name, path) in [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
    ] {
        if !derives.contains(name) {
            derive_list.push(path);
        }
    }
    let derive_attr =
        if derive_list.is_empty() { quote! {} } else { quote! { #[derive(#(#derive_list),*)] } };

    let schema_attr = if derives.contains("ToSchema") {
        quote! {}
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    let wanted_case =
        args.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename_attr = match &existing.rename_all {
        Some(current) if current.value() != wanted_case.value() => {
            return Err(syn::Error::new_spanned(
                current,
                "conflicting serde rename_all; drop it or pass the same value to api_model",
            ));
        },
        Some(_) => quote! {},
        None => quote! { #[serde(rename_all = #wanted_case)] },
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (existing.deny_unknown_fields, deny) {
        (true, false) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "serde(deny_unknown_fields) is already set; remove it before disabling",
            ));
        },
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote! {},
    };

    Ok(quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #deny_attr
        #input
    })
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ModelArgs::default();

    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(
                meta,
                "expected name-value arguments like `rename_all = \"snake_case\"`",
            ));
        };

        if nv.path.is_ident("rename_all") {
            if parsed.rename_all.is_some() {
                return Err(syn::Error::new_spanned(&nv, "duplicate argument"));
            }
            parsed.rename_all = Some(string_value(&nv)?);
        } else if nv.path.is_ident("deny_unknown_fields") {
            if parsed.deny_unknown_fields.is_some() {
                return Err(syn::Error::new_spanned(&nv, "duplicate argument"));
            }
            parsed.deny_unknown_fields = Some(bool_value(&nv)?);
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "unsupported argument; expected rename_all or deny_unknown_fields",
            ));
        }
    }

    Ok(parsed)
}

fn string_value(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match &nv.value {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.clone()),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
    }
}

fn bool_value(nv: &MetaNameValue) -> syn::Result<bool> {
    match &nv.value {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Bool(b) => Ok(b.value),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
    }
}

fn existing_serde(attrs: &[Attribute]) -> syn::Result<ExistingSerde> {
    let mut found = ExistingSerde::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                found.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                found.deny_unknown_fields = true;
            } else if meta.input.peek(Token![=]) {
                // other key = value pairs (tag, default = "...") are left to serde
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }

    Ok(found)
}

/// Wraps an axum handler so that `utoipa::path` metadata is only generated for server builds.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}
