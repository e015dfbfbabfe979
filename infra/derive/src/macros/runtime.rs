use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Error, Expr, ItemFn, Meta, ReturnType, Token, Type};

/// Expands `#[brite_runtime::main(profile, worker_threads = N)]`.
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            &input.sig.fn_token,
            "#[brite_runtime::main] can only be used on async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[brite_runtime::main] requires the function to return a Result",
        )
        .to_compile_error();
    }

    let config = match runtime_config(args) {
        Ok(config) => config,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #config;
            let runtime = ::brite_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async #block)
        }
    }
}

/// Turns the macro arguments into an expression building a `RuntimeConfig`.
fn runtime_config(args: TokenStream) -> syn::Result<TokenStream> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;

    let mut preset = quote! { ::brite_runtime::RuntimeConfig::default() };
    let mut overrides = Vec::new();

    for meta in metas {
        match meta {
            Meta::Path(path) => {
                let Some(ident) = path.get_ident() else {
                    return Err(Error::new_spanned(path, "expected a runtime profile name"));
                };
                preset = match ident.to_string().as_str() {
                    "high_performance" => {
                        quote! { ::brite_runtime::RuntimeConfig::high_performance() }
                    },
                    "memory_efficient" => {
                        quote! { ::brite_runtime::RuntimeConfig::memory_efficient() }
                    },
                    "default" => quote! { ::brite_runtime::RuntimeConfig::default() },
                    _ => {
                        return Err(Error::new_spanned(
                            ident,
                            "unknown runtime profile; use high_performance, memory_efficient or default",
                        ));
                    },
                };
            },
            Meta::NameValue(nv) if nv.path.is_ident("worker_threads") => {
                let value: &Expr = &nv.value;
                overrides.push(quote! { .with_worker_threads(#value) });
            },
            Meta::NameValue(nv) if nv.path.is_ident("thread_name") => {
                let value: &Expr = &nv.value;
                overrides.push(quote! { .with_thread_name(#value) });
            },
            other => {
                return Err(Error::new_spanned(
                    other,
                    "unsupported argument; expected a profile, worker_threads = N or thread_name = \"..\"",
                ));
            },
        }
    }

    Ok(quote! { #preset #(#overrides)* })
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = ty.as_ref() else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
