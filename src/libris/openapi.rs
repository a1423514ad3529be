use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::libris::{handlers, upload};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "libris",
        description = "Library membership and authentication service"
    ),
    paths(
        handlers::health::health,
        handlers::register::register,
        handlers::login::login,
        handlers::upload_auth::upload_authorization,
    ),
    components(schemas(
        handlers::AuthResponse,
        handlers::register::RegisterPayload,
        handlers::login::LoginPayload,
        upload::UploadAuthorization,
    )),
    tags(
        (name = "auth", description = "Registration and sign-in"),
        (name = "upload", description = "Upload authorization for the image host"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

/// Swagger UI serving the generated `OpenAPI` document.
pub(crate) fn swagger() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
