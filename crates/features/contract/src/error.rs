use std::borrow::Cow;

/// Error types of the contract slice.
#[brite_derive::brite_error]
pub enum ContractError {
    /// The signature is not a PNG or JPEG this renderer can embed.
    #[status(400)]
    #[error("Unsupported signature image{}: {message}", format_context(.context))]
    Image { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(400)]
    #[error("Invalid base64 data{}: {source}", format_context(.context))]
    Base64 { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// The agreement template is malformed.
    #[error("Template error{}: {message}", format_context(.context))]
    Template { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Compression or file access failed.
    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Contract state unavailable{}: {source}", format_context(.context))]
    State { source: brite_kernel::server::ApiStateError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal contract error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
