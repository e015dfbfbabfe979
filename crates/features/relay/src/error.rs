use std::borrow::Cow;

/// Error types of the relay slice.
#[brite_derive::brite_error]
pub enum RelayError {
    #[status(400)]
    #[error("Missing payment session ID{}: {message}", format_context(.context))]
    MissingSession { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The multipart body or one of its JSON fields could not be read, or a required
    /// field is missing.
    #[status(400)]
    #[error("Invalid form data{}: {message}", format_context(.context))]
    InvalidForm { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(402)]
    #[error("Payment not verified{}: {message}", format_context(.context))]
    PaymentRequired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(404)]
    #[error("Dead letter not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Dead-letter storage error{}: {source}", format_context(.context))]
    Storage { source: brite_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Webhook transport error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Relay state unavailable{}: {source}", format_context(.context))]
    State { source: brite_kernel::server::ApiStateError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal relay error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
