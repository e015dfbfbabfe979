use crate::{Contract, ContractData, ContractError, FILE_NAME};
use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use brite_derive::{api_handler, api_model};
use brite_domain::constants::CONTRACT_TAG;
use brite_domain::submission::FormData;
use brite_kernel::server::{ApiError, ApiState, ErrorBody};

/// Agreement to render
#[api_model(deny_unknown_fields = false)]
pub(crate) struct ContractRequest {
    #[serde(default)]
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    form_data: FormData,
    /// Provider signature as an image data URL
    #[serde(default)]
    signature: Option<String>,
}

impl IntoResponse for ContractError {
    fn into_response(self) -> Response {
        match self {
            Self::Image { .. } | Self::Base64 { .. } => {
                tracing::warn!(error = %self, "Rejected signature image");
                ApiError::bad_request(self.to_string()).into_response()
            },
            other => {
                tracing::error!(error = %other, "Contract rendering failed");
                ApiError::from_status(500, "Failed to render contract").into_response()
            },
        }
    }
}

#[api_handler(
    post,
    path = "/contract",
    request_body = ContractRequest,
    responses(
        (status = OK, description = "Signed agreement", content_type = "application/pdf", body = Vec<u8>),
        (status = BAD_REQUEST, description = "Signature is not a PNG or JPEG data URL", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Rendering failed", body = ErrorBody),
    ),
    tag = CONTRACT_TAG,
)]
pub(crate) async fn contract_handler(
    State(state): State<ApiState>,
    Json(request): Json<ContractRequest>,
) -> Result<Response, ContractError> {
    let contract = state.try_get_slice::<Contract>()?.clone();
    let data = ContractData::from_form(&request.form_data, request.signature.as_deref())?;

    let bytes = tokio::task::spawn_blocking(move || contract.render(&data))
        .await
        .map_err(|e| ContractError::Internal { message: e.to_string().into(), context: Some("render task".into()) })??;

    tracing::info!(size = bytes.len(), "Agreement rendered");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{FILE_NAME}\"")),
        ],
        bytes,
    )
        .into_response())
}
