use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ItemStruct;

/// Splits a struct into `<Name>Inner` (the data) and `<Name>` (a cheap `Arc` handle).
pub fn expand_slice(input: ItemStruct) -> TokenStream {
    let ItemStruct { attrs, vis, ident, generics, fields, semi_token, .. } = input;
    let inner = format_ident!("{ident}Inner");

    if !generics.params.is_empty() {
        return syn::Error::new_spanned(generics, "feature slices cannot be generic")
            .to_compile_error();
    }

    quote! {
        #(#attrs)*
        #[derive(Debug)]
        #vis struct #inner #fields #semi_token

        #[derive(Debug, Clone)]
        #vis struct #ident {
            inner: ::std::sync::Arc<#inner>,
        }

        impl #ident {
            #[must_use]
            pub fn new(inner: #inner) -> Self {
                Self { inner: ::std::sync::Arc::new(inner) }
            }

            /// Wraps the handle for registration in the API state.
            #[must_use]
            pub fn into_slice(self) -> ::brite_kernel::domain::registry::InitializedSlice {
                ::brite_kernel::domain::registry::InitializedSlice::new(self)
            }
        }

        impl ::std::ops::Deref for #ident {
            type Target = #inner;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::brite_kernel::domain::registry::FeatureSlice for #ident {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    }
}
