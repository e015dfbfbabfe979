use super::derived_traits;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, LitInt, Type};

/// What the generator needs to know about a single error variant.
struct ErrorVariant {
    ident: Ident,
    source: Option<(Ident, Type)>,
    has_context: bool,
    status: Option<LitInt>,
    cfg_attrs: Vec<Attribute>,
}

pub fn expand_error(mut input: DeriveInput) -> TokenStream {
    let name = input.ident.clone();
    let ext_trait = format_ident!("{name}Ext");

    let Data::Enum(data) = &mut input.data else {
        return syn::Error::new_spanned(&input.ident, "brite_error can only be applied to enums")
            .to_compile_error();
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &mut data.variants {
        match inspect_variant(variant) {
            Ok(meta) => variants.push(meta),
            Err(err) => return err.to_compile_error(),
        }
    }

    if let Some(orphan) = variants.iter().find(|v| v.source.is_some() && !v.has_context) {
        return syn::Error::new_spanned(
            &orphan.ident,
            "brite_error requires `context: Option<Cow<'static, str>>` on variants with a source",
        )
        .to_compile_error();
    }

    let derives = derive_attr(&input.attrs);
    let context_ext = context_ext(&name, &ext_trait, &variants);
    let conversions = variants.iter().filter_map(|v| source_conversion(&name, &ext_trait, v));
    let internal = internal_conversions(&name, &variants);
    let status = status_codes(&name, &variants);

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #derives
        #input

        #context_ext
        #(#conversions)*
        #internal
        #status

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

/// Parses a variant and strips the `#[status(..)]` helper attribute from it.
fn inspect_variant(variant: &mut syn::Variant) -> syn::Result<ErrorVariant> {
    let mut status = None;
    let mut kept = Vec::with_capacity(variant.attrs.len());
    for attr in variant.attrs.drain(..) {
        if attr.path().is_ident("status") {
            status = Some(attr.parse_args::<LitInt>()?);
        } else {
            kept.push(attr);
        }
    }
    variant.attrs = kept;

    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new(
            variant.span(),
            "brite_error variants must use named fields (`message`, `source`, `context`)",
        ));
    };

    let mut has_context = false;
    for field in &fields.named {
        if field.ident.as_ref().is_some_and(|i| i == "context") {
            if !is_optional_cow_str(&field.ty) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "context field must be Option<Cow<'static, str>>",
                ));
            }
            has_context = true;
        }
    }

    let source = fields.named.iter().find(|f| is_source(f)).and_then(|f| {
        let ident = f.ident.clone()?;
        Some((ident, f.ty.clone()))
    });

    Ok(ErrorVariant {
        ident: variant.ident.clone(),
        source,
        has_context,
        status,
        cfg_attrs: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
    })
}

fn is_source(field: &Field) -> bool {
    field.ident.as_ref().is_some_and(|i| i == "source")
        || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
}

fn derive_attr(attrs: &[Attribute]) -> TokenStream {
    let existing = derived_traits(attrs);
    let mut missing = Vec::new();
    if !existing.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !existing.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }
    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

fn context_ext(name: &Ident, ext_trait: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = &v.ident;
        let cfg = &v.cfg_attrs;
        quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    quote! {
        /// Attaches human readable context to a failed result.
        pub trait #ext_trait<T> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext_trait<T> for Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#arms)*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

fn source_conversion(name: &Ident, ext_trait: &Ident, v: &ErrorVariant) -> Option<TokenStream> {
    if v.ident == "Internal" {
        return None;
    }
    let (field, ty) = v.source.as_ref()?;
    let ident = &v.ident;
    let cfg = &v.cfg_attrs;

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self {
                Self::#ident { #field, context: None }
            }
        }

        #(#cfg)*
        impl<T> #ext_trait<T> for std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn internal_conversions(name: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let Some(internal) = variants.iter().find(|v| v.ident == "Internal") else {
        return quote! {};
    };
    let cfg = &internal.cfg_attrs;

    quote! {
        #(#cfg)*
        impl From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfg)*
        impl From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}

/// Generates `status_code()`; variants without `#[status(..)]` map to 500.
fn status_codes(name: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let arms = variants.iter().filter_map(|v| {
        let code = v.status.as_ref()?;
        let ident = &v.ident;
        let cfg = &v.cfg_attrs;
        Some(quote! { #(#cfg)* Self::#ident { .. } => #code, })
    });

    quote! {
        impl #name {
            /// HTTP status code associated with this error.
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn status_code(&self) -> u16 {
                match self {
                    #(#arms)*
                    _ => 500,
                }
            }
        }
    }
}

fn is_optional_cow_str(ty: &Type) -> bool {
    let Some(option) = last_segment(ty).filter(|s| s.ident == "Option") else {
        return false;
    };
    let syn::PathArguments::AngleBracketed(args) = &option.arguments else {
        return false;
    };
    let Some(syn::GenericArgument::Type(inner)) = args.args.first() else {
        return false;
    };
    let Some(cow) = last_segment(inner).filter(|s| s.ident == "Cow") else {
        return false;
    };
    let syn::PathArguments::AngleBracketed(cow_args) = &cow.arguments else {
        return false;
    };

    let mut iter = cow_args.args.iter();
    let lifetime_ok =
        matches!(iter.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        iter.next(),
        Some(syn::GenericArgument::Type(t)) if last_segment(t).is_some_and(|s| s.ident == "str")
    );
    lifetime_ok && str_ok
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) => path.path.segments.last(),
        _ => None,
    }
}
