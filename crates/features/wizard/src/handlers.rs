use crate::{FieldError, Step, TOTAL_STEPS, Wizard, WizardError};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brite_derive::{api_handler, api_model};
use brite_domain::constants::WIZARD_TAG;
use brite_domain::submission::FormData;
use brite_kernel::server::{ApiError, ApiState, ErrorBody};
use strum::IntoEnumIterator;

/// Screen of the onboarding wizard
#[api_model]
pub(crate) struct StepInfo {
    /// Position, starting at 1
    number: u8,
    /// Machine name
    key: String,
    /// Heading shown on the screen
    title: String,
}

/// Answers collected so far
#[api_model(deny_unknown_fields = false)]
pub(crate) struct AdvanceRequest {
    #[serde(default)]
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    form_data: FormData,
    /// Whether a logo file has been picked in the browser
    #[serde(default)]
    has_logo: bool,
}

/// Accepted step with the updated answers
#[api_model]
pub(crate) struct AdvanceResponse {
    step: u8,
    /// Absent after the last step
    next_step: Option<u8>,
    total_steps: u8,
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    form_data: FormData,
}

/// Rejected step
#[api_model]
pub(crate) struct InvalidStepResponse {
    error: String,
    fields: Vec<FieldError>,
}

impl IntoResponse for WizardError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid { errors, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(InvalidStepResponse {
                    error: "Invalid form data".to_owned(),
                    fields: errors.into_vec(),
                }),
            )
                .into_response(),
            Self::UnknownStep { message, .. } => ApiError::not_found(message).into_response(),
            other => {
                tracing::error!(error = %other, "Wizard request failed");
                ApiError::internal().into_response()
            },
        }
    }
}

#[api_handler(
    get,
    path = "/wizard/steps",
    responses((status = OK, description = "Step catalogue", body = [StepInfo])),
    tag = WIZARD_TAG,
)]
pub(crate) async fn steps_handler() -> Json<Vec<StepInfo>> {
    let steps = Step::iter()
        .map(|step| StepInfo {
            number: step.number(),
            key: step.key().to_owned(),
            title: step.title().to_owned(),
        })
        .collect();
    Json(steps)
}

#[api_handler(
    post,
    path = "/wizard/steps/{step}/advance",
    params(("step" = String, Path, description = "Step number, 1 to 19")),
    request_body = AdvanceRequest,
    responses(
        (status = OK, description = "Step accepted", body = AdvanceResponse),
        (status = NOT_FOUND, description = "No such step", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid fields", body = InvalidStepResponse),
    ),
    tag = WIZARD_TAG,
)]
pub(crate) async fn advance_handler(
    State(state): State<ApiState>,
    Path(number): Path<String>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, WizardError> {
    let step = number.parse::<u8>().ok().and_then(Step::from_number).ok_or_else(|| {
        WizardError::UnknownStep { message: format!("Unknown step {number}").into(), context: None }
    })?;

    let wizard = state.try_get_slice::<Wizard>()?;
    let advance = wizard.advance(step, request.form_data, request.has_logo)?;

    Ok(Json(AdvanceResponse {
        step: advance.step.number(),
        next_step: advance.next.map(Step::number),
        total_steps: TOTAL_STEPS,
        form_data: advance.form,
    }))
}
