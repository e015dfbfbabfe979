use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, header};
use brite::domain::constants::{BODY_LIMIT_BYTES, SESSION_HEADER};
use brite::kernel::server::ApiState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "BRITE onboarding API"))]
struct ApiDoc;

/// Browser access is limited to the configured wizard origin, with credentials.
fn cors(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin.trim())
        .with_context(|| format!("Invalid CORS origin '{origin}'"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)]))
}

/// Builds the application router: every slice, the Scalar UI at `/api` and the shared
/// layers.
///
/// # Errors
/// Fails when `cors.allowed_origin` is not a valid header value.
pub fn init(state: ApiState) -> Result<Router> {
    let cors = cors(&state.config.cors.allowed_origin)?;

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(brite::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    Ok(Router::new().merge(openapi_routes).merge(scalar_routes).layer(cors))
}
