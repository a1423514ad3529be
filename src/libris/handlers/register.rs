use crate::libris::{
    auth::{session::session_cookie, AuthService, RegisterError, RegisterRequest},
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
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Registration form payload. `university_card` is the path the upload widget
/// got back from the image host, stored as-is.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    full_name: String,
    email: String,
    password: String,
    university_id: String,
    university_card: String,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses (
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Missing or invalid payload", body = AuthResponse),
        (status = 409, description = "User already exists with this email", body = AuthResponse),
        (status = 500, description = "Failed to create user", body = AuthResponse),
    ),
    tag = "auth"
)]
// axum handler for registration; payload is never logged, it carries the
// plaintext password
#[instrument(skip_all)]
pub async fn register(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterPayload>>,
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

    let request = RegisterRequest {
        full_name: payload.full_name,
        email: payload.email,
        password: payload.password,
        university_id: payload.university_id,
        university_card: payload.university_card,
    };

    match service.register(request).await {
        Ok(registration) => {
            let mut headers = HeaderMap::new();
            if let Ok(cookie) = session_cookie(&registration.session) {
                headers.insert(SET_COOKIE, cookie);
            }
            (
                StatusCode::CREATED,
                headers,
                Json(AuthResponse::new(true, "User created successfully")),
            )
                .into_response()
        }
        Err(RegisterError::DuplicateEmail) => (
            StatusCode::CONFLICT,
            Json(AuthResponse::new(false, "User already exists with this email")),
        )
            .into_response(),
        Err(RegisterError::Persistence(err)) => {
            error!("Error creating user: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResponse::new(false, "Failed to create user")),
            )
                .into_response()
        }
        Err(RegisterError::Session(err)) => {
            // The record exists; only the session phase failed. The caller
            // still gets the generic failure.
            error!("Error creating session for new user: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResponse::new(false, "Failed to create user")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libris::auth::session::SESSION_COOKIE_NAME;
    use crate::libris::auth::store::UserStore;
    use crate::libris::auth::test_support::{
        FailingSessionIssuer, FailingUserStore, MemorySessionIssuer, MemoryUserStore,
    };
    use axum::{body::to_bytes, response::Response};
    use serde_json::Value;

    fn payload() -> RegisterPayload {
        RegisterPayload {
            full_name: "Ada".to_string(),
            email: "ada@lib.edu".to_string(),
            password: "Secret123".to_string(),
            university_id: "U1".to_string(),
            university_card: "/ids/ada.png".to_string(),
        }
    }

    fn service(
        store: Arc<dyn UserStore>,
        sessions: Arc<dyn crate::libris::auth::session::SessionIssuer>,
    ) -> Extension<Arc<AuthService>> {
        Extension(Arc::new(AuthService::new(store, sessions)))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 4096).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn missing_payload_returns_400() {
        let service = service(
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemorySessionIssuer),
        );
        let response = register(service, None).await.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Missing payload");
    }

    #[tokio::test]
    async fn invalid_email_returns_400() {
        let service = service(
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemorySessionIssuer),
        );
        let mut payload = payload();
        payload.email = "not-an-email".to_string();
        let response = register(service, Some(Json(payload))).await.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid email");
    }

    #[tokio::test]
    async fn invalid_password_returns_400() {
        let service = service(
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemorySessionIssuer),
        );
        let mut payload = payload();
        payload.password = "short".to_string();
        let response = register(service, Some(Json(payload))).await.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid password");
    }

    #[tokio::test]
    async fn success_returns_201_with_session_cookie() {
        let service = service(
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemorySessionIssuer),
        );
        let response = register(service, Some(Json(payload())))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("session cookie");
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "User created successfully");
    }

    #[tokio::test]
    async fn duplicate_email_returns_409() {
        let store = Arc::new(MemoryUserStore::default());
        let service = service(store, Arc::new(MemorySessionIssuer));

        let first = register(service.clone(), Some(Json(payload())))
            .await
            .into_response();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = register(service, Some(Json(payload())))
            .await
            .into_response();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let json = body_json(second).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "User already exists with this email");
    }

    #[tokio::test]
    async fn persistence_failure_returns_500() {
        let service = service(Arc::new(FailingUserStore), Arc::new(MemorySessionIssuer));
        let response = register(service, Some(Json(payload())))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Failed to create user");
    }

    #[tokio::test]
    async fn session_failure_returns_500_but_keeps_record() {
        let store = Arc::new(MemoryUserStore::default());
        let service = service(store.clone(), Arc::new(FailingSessionIssuer));
        let response = register(service, Some(Json(payload())))
            .await
            .into_response();

        // Same generic failure as a persistence error, while the record stays.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Failed to create user");
        assert_eq!(store.len(), 1);
    }
}
