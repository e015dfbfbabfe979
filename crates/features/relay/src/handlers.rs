use crate::{Relay, RelayError, RelayErrorExt, Submission, Upload, validation_failure};
use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use brite_derive::{api_handler, api_model};
use brite_domain::constants::{RELAY_TAG, SESSION_HEADER};
use brite_kernel::server::{ApiError, ApiState, ErrorBody};
use brite_payment::Payment;
use tracing::{info, warn};

const PAYMENT_NOT_VERIFIED: &str = "Payment not verified";

/// Submission queued for delivery
#[api_model]
pub(crate) struct AcceptedResponse {
    success: bool,
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSession { .. } => ApiError::bad_request("Missing payment session ID").into_response(),
            Self::InvalidForm { .. } | Self::Json { .. } => {
                warn!(error = %self, "Rejected submission");
                ApiError::bad_request("Invalid form data").into_response()
            },
            Self::PaymentRequired { .. } => ApiError::payment_required(PAYMENT_NOT_VERIFIED).into_response(),
            other => {
                tracing::error!(error = %other, "Error in send-data route");
                ApiError::internal().into_response()
            },
        }
    }
}

fn invalid(message: impl ToString) -> RelayError {
    RelayError::InvalidForm { message: message.to_string().into(), context: None }
}

async fn read_submission(mut multipart: Multipart) -> Result<Submission, RelayError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if Submission::is_file_field(&name) {
            let filename = field.file_name().unwrap_or_default().to_owned();
            let mimetype = field.content_type().unwrap_or("application/octet-stream").to_owned();
            let bytes = field.bytes().await.map_err(invalid)?;
            submission.add_file(&name, Upload { filename, mimetype, bytes: bytes.to_vec() });
        } else {
            let text = field.text().await.map_err(invalid).context(name.clone())?;
            submission.add_text(&name, &text)?;
        }
    }

    Ok(submission)
}

#[api_handler(
    post,
    path = "/send-data",
    params(("x-session-id" = String, Header, description = "Stripe checkout session id")),
    request_body(content_type = "multipart/form-data", description = "Form fields plus `logo` and `pdf` files"),
    responses(
        (status = OK, description = "Accepted; delivery continues in the background", body = AcceptedResponse),
        (status = BAD_REQUEST, description = "Missing session id or invalid form data", body = ErrorBody),
        (status = PAYMENT_REQUIRED, description = "Checkout session is not paid", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorBody),
    ),
    tag = RELAY_TAG,
)]
pub(crate) async fn send_data_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AcceptedResponse>, RelayError> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RelayError::MissingSession { message: "header is absent or blank".into(), context: None })?;

    let multipart = multipart.map_err(|e| invalid(e.body_text()))?;
    let submission = read_submission(multipart).await?;

    let relay = state.try_get_slice::<Relay>()?;
    let payment = state.try_get_slice::<Payment>()?;

    if !payment.verify(Some(session_id)).await {
        warn!(session = %session_id, "Payment verification failed");
        relay.dead_letters().record_or_log(&submission.to_value(), &[PAYMENT_NOT_VERIFIED.to_owned()]).await;
        return Err(RelayError::PaymentRequired { message: session_id.to_owned().into(), context: None });
    }

    if let Some(field) = validation_failure(&submission.form) {
        return Err(invalid(format!("{field} is required")));
    }
    let payload = submission.into_payload()?;
    let payload = serde_json::to_value(&payload).context("relay payload")?;

    relay.submit(payload);
    info!(session = %session_id, "Submission accepted");

    Ok(Json(AcceptedResponse {
        success: true,
        message: "Request accepted. Background task queued.".to_owned(),
    }))
}
