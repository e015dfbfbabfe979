use std::borrow::Cow;

#[brite_derive::brite_error]
pub enum StorageError {
    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
