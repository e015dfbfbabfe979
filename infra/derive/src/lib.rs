#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every crate of the workspace: error enums, API data models,
//! axum handlers with `OpenAPI` metadata, feature slices and the runtime entry point.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own macros
//! in doctests; see the `tests/` directory for compiled usage.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Bootstraps the tuned Tokio runtime from `brite-runtime` around an `async fn main`.
///
/// # Arguments
///
/// * `high_performance` | `memory_efficient` | `default` - runtime profile.
/// * `worker_threads = N` - overrides the profile's worker count.
/// * `thread_name = "..."` - overrides the worker thread name.
///
/// The function must return a `Result` whose error type accepts `anyhow::Error`.
///
/// ```rust,ignore
/// #[brite_runtime::main(memory_efficient, worker_threads = 2)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares an API data transfer object.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when missing, `utoipa::ToSchema` for
/// `server` builds, `rename_all = "camelCase"` and `deny_unknown_fields`.
///
/// # Arguments
///
/// * `rename_all = "..."` - overrides the serde rename policy.
/// * `deny_unknown_fields = false` - accepts unknown fields.
///
/// ```rust,ignore
/// #[api_model(deny_unknown_fields = false)]
/// pub struct CheckoutRequest {
///     pub price_id: Option<String>,
///     pub success_url: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Marks an axum handler and forwards its arguments to `utoipa::path` in `server` builds.
///
/// ```rust,ignore
/// #[api_handler(
///     post,
///     path = "/send-data",
///     responses((status = OK, body = AcceptedResponse)),
///     tag = RELAY_TAG
/// )]
/// pub async fn send_data(/* extractors */) -> Result<Json<AcceptedResponse>, ApiError> {
///     Ok(Json(AcceptedResponse::queued()))
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a workspace error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` when missing.
/// * A `<Name>Ext` trait adding `.context(..)` to `Result<T, Name>` and to results of
///   every wrapped source error.
/// * `From<Source>` for each variant with a `source` field.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * `const fn status_code(&self) -> u16` driven by `#[status(N)]` on variants
///   (500 when absent).
///
/// # Requirements
///
/// Variants use named fields; a variant with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[brite_derive::brite_error]
/// pub enum RelayError {
///     #[status(400)]
///     #[error("Invalid submission{}: {message}", format_context(.context))]
///     InvalidSubmission { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Webhook transport error{}: {source}", format_context(.context))]
///     Transport { source: reqwest::Error, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn brite_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Declares a feature slice: the struct becomes `<Name>Inner`, and `<Name>` is an
/// `Arc` handle with `Deref`, `FeatureSlice` and `into_slice()`.
///
/// ```rust,ignore
/// #[brite_derive::brite_slice]
/// pub struct Relay {
///     pub forwarder: Forwarder,
/// }
///
/// let slice = Relay::new(RelayInner { forwarder }).into_slice();
/// ```
#[proc_macro_attribute]
pub fn brite_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
