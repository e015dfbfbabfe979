use brite_derive::brite_error;
use std::borrow::Cow;

#[brite_error]
pub enum GateError {
    #[status(402)]
    #[error("Payment not verified{}: {message}", format_context(.context))]
    Unpaid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(400)]
    #[error("Invalid input{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unexpected{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let unpaid = GateError::Unpaid { message: "cs_test".into(), context: None };
    assert_eq!(unpaid.status_code(), 402);

    let invalid: Result<(), GateError> =
        Err(GateError::Invalid { message: "practiceName".into(), context: None });
    let invalid = invalid.context("multipart intake").unwrap_err();
    assert_eq!(invalid.status_code(), 400);
    assert_eq!(invalid.to_string(), "Invalid input (multipart intake): practiceName");

    assert_eq!(GateError::from("x").status_code(), 500);
}
