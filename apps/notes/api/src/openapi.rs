use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Notes API",
        version = "0.1.0",
        description = "Multi-tenant notes with JWT authentication, user management and row-level ownership"
    ),
    modifiers(&SecurityAddon),
    nest(
        (path = "/authentication", api = domain_users::AuthApiDoc),
        (path = "/user", api = domain_users::ApiDoc),
        (path = "/note", api = domain_notes::ApiDoc)
    )
)]
pub struct ApiDoc;
