use std::borrow::Cow;

/// Error types of the payment slice.
#[brite_derive::brite_error]
pub enum PaymentError {
    /// Stripe answered with a non-success status.
    #[status(502)]
    #[error("Stripe API error {status}{}: {message}", format_context(.context))]
    Api { status: u16, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The request never got a usable answer (connect, timeout, body decoding).
    #[status(502)]
    #[error("Stripe transport error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[status(400)]
    #[error("Invalid checkout session id{}: {message}", format_context(.context))]
    InvalidSession { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(400)]
    #[error("Missing price{}: {message}", format_context(.context))]
    MissingPrice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// `successUrl` or `cancelUrl` was not sent.
    #[status(400)]
    #[error("Missing redirect URL{}: {message}", format_context(.context))]
    MissingRedirect { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Payment state unavailable{}: {source}", format_context(.context))]
    State { source: brite_kernel::server::ApiStateError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal payment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
