use crate::{CheckoutRequest, Payment, PaymentError};
use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use brite_derive::{api_handler, api_model};
use brite_domain::constants::PAYMENT_TAG;
use brite_domain::submission::FormData;
use brite_kernel::server::{ApiError, ApiState, ErrorBody};

/// Checkout for the onboarding fee
#[api_model(deny_unknown_fields = false)]
pub(crate) struct CheckoutSessionRequest {
    /// Stripe price; the configured default is used when absent
    #[serde(default)]
    price_id: Option<String>,
    /// Where Stripe returns after payment
    #[serde(default)]
    success_url: Option<String>,
    /// Where Stripe returns when the customer backs out
    #[serde(default)]
    cancel_url: Option<String>,
    /// Answers collected by the wizard, checked before any charge is prepared
    #[serde(default)]
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    form_data: Option<FormData>,
}

/// Outcome of a checkout request
#[api_model]
pub(crate) struct CheckoutSessionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingPrice { message, .. } | Self::MissingRedirect { message, .. } => {
                ApiError::bad_request(message).into_response()
            },
            other => {
                tracing::error!(error = %other, "Create checkout session error");
                ApiError::from_status(500, "Failed to create checkout session").into_response()
            },
        }
    }
}

#[api_handler(
    post,
    path = "/create-checkout-session",
    request_body = CheckoutSessionRequest,
    responses(
        (status = OK, description = "Session created, or form rejected with success false", body = CheckoutSessionResponse),
        (status = BAD_REQUEST, description = "No price configured or a redirect URL is missing", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Stripe failure", body = ErrorBody),
    ),
    tag = PAYMENT_TAG,
)]
pub(crate) async fn create_checkout_session_handler(
    State(state): State<ApiState>,
    Json(request): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, PaymentError> {
    let missing = request
        .form_data
        .as_ref()
        .map_or(Some("formData"), FormData::first_missing_required);
    if let Some(field) = missing {
        tracing::warn!(field, "Checkout refused: incomplete form");
        return Ok(Json(CheckoutSessionResponse {
            success: false,
            session_id: None,
            message: Some("Invalid Form Data".to_owned()),
        }));
    }

    let success_url = redirect(request.success_url, "successUrl")?;
    let cancel_url = redirect(request.cancel_url, "cancelUrl")?;

    let payment = state.try_get_slice::<Payment>()?;
    let price_id = payment.price_for(request.price_id.as_deref()).ok_or_else(|| {
        PaymentError::MissingPrice { message: "Missing price ID".into(), context: None }
    })?;

    let session = payment
        .gateway()
        .create_checkout_session(&CheckoutRequest {
            price_id,
            success_url,
            cancel_url,
        })
        .await?;

    Ok(Json(CheckoutSessionResponse {
        success: true,
        session_id: Some(session.id),
        message: None,
    }))
}

fn redirect(url: Option<String>, field: &'static str) -> Result<String, PaymentError> {
    url.filter(|u| !u.trim().is_empty()).ok_or_else(|| PaymentError::MissingRedirect {
        message: format!("Missing {field}").into(),
        context: None,
    })
}
