use brite_derive::brite_error;
use std::borrow::Cow;

#[brite_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_missing() -> Result<Vec<u8>, DemoError> {
    let bytes = std::fs::read("/definitely/not/here").context("reading fixture")?;
    Ok(bytes)
}

fn main() {
    let err = read_missing().unwrap_err();
    assert!(err.to_string().starts_with("IO error (reading fixture)"));

    let internal: DemoError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");
    assert_eq!(internal.status_code(), 500);
}
