use axum::http::header;
use axum::{Json, response::IntoResponse};
use brite_derive::{api_handler, api_model};
use brite_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Liveness report
struct HealthResponse {
    /// Always `up` while the process serves requests
    status: String,
    /// Server version
    version: String,
    /// Seconds since the first health probe
    uptime: u64,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime: START_TIME.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
