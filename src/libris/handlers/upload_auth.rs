use crate::libris::{
    handlers::AuthResponse,
    upload::{AuthorizationProvider, UploadAuthorization},
};
use axum::{
    extract::Extension,
    http::{header::CACHE_CONTROL, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    get,
    path = "/api/auth/upload",
    responses (
        (status = 200, description = "Fresh signed upload parameters", body = UploadAuthorization),
        (status = 500, description = "Upload authorization unavailable", body = AuthResponse),
    ),
    tag = "upload"
)]
// axum handler minting upload authorizations; consumed by the client-side
// upload widget before the registration form is submitted
#[instrument(skip_all)]
pub async fn upload_authorization(
    provider: Extension<Arc<dyn AuthorizationProvider>>,
) -> impl IntoResponse {
    match provider.authorize() {
        Ok(authorization) => {
            // single-use parameters, caching one would break the next upload
            let mut headers = HeaderMap::new();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            (StatusCode::OK, headers, Json(authorization)).into_response()
        }
        Err(err) => {
            error!("Error minting upload authorization: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResponse::new(false, "Upload authorization unavailable")),
            )
                .into_response()
        }
    }
}
