use crate::libris::{
    auth::{session::session_cookie, AuthService, Credentials, SignInError},
    handlers::{valid_email, valid_password, AuthResponse},
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginPayload {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses (
        (status = 200, description = "Sign in successful", body = AuthResponse),
        (status = 400, description = "Missing or invalid payload", body = AuthResponse),
        (status = 401, description = "Sign in failed", body = AuthResponse),
    ),
    tag = "auth"
)]
// axum handler for sign-in; payload is never logged, it carries the plaintext
// password
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginPayload>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(AuthResponse::new(false, "Missing payload")),
        )
            .into_response();
    };

    if !valid_email(&payload.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(AuthResponse::new(false, "Invalid email")),
        )
            .into_response();
    }

    if !valid_password(&payload.password) {
        return (
            StatusCode::BAD_REQUEST,
            Json(AuthResponse::new(false, "Invalid password")),
        )
            .into_response();
    }

    let credentials = Credentials {
        email: payload.email,
        password: payload.password,
    };

    // Every failure cause collapses into the same response; only the log
    // keeps the distinction.
    match service.sign_in(&credentials).await {
        Ok(session) => {
            let mut headers = HeaderMap::new();
            if let Ok(cookie) = session_cookie(&session) {
                headers.insert(SET_COOKIE, cookie);
            }
            (
                StatusCode::OK,
                headers,
                Json(AuthResponse::new(true, "Sign in successful")),
            )
                .into_response()
        }
        Err(err) => {
            match &err {
                SignInError::InvalidCredentials => debug!("Sign in failed: invalid credentials"),
                SignInError::Session(err) => error!("Sign in failed: {err}"),
                SignInError::Unknown(err) => error!("Sign in failed: {err:?}"),
            }
            (
                StatusCode::UNAUTHORIZED,
                Json(AuthResponse::new(false, "Sign in failed")),
            )
                .into_response()
        }
    }
}
