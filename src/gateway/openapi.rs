//! OpenAPI / Swagger UI documentation for the drinks API.
//!
//! - Swagger UI: `http://localhost:5000/docs`
//! - OpenAPI JSON: `http://localhost:5000/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::drink::{DrinkLong, DrinkShort, ShortIngredient};
use crate::error::ErrorEnvelope;
use crate::gateway::types::{DeleteResponse, DrinkRequest, HealthResponse};

/// Bearer JWT issued by the identity provider
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "RS256 access token. The `permissions` claim must list the route's permission, e.g. `post:drinks`.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Drink Menu API",
        version = "1.0.0",
        description = "Coffee shop drinks menu. Browsing is public; the full recipe and changes to the menu require permissions."
    ),
    paths(
        crate::gateway::handlers::drinks::list_drinks,
        crate::gateway::handlers::drinks::list_drinks_detail,
        crate::gateway::handlers::drinks::create_drink,
        crate::gateway::handlers::drinks::update_drink,
        crate::gateway::handlers::drinks::delete_drink,
        crate::gateway::handlers::health::health_check,
    ),
    components(schemas(
        DrinkShort,
        DrinkLong,
        ShortIngredient,
        DrinkRequest,
        DeleteResponse,
        HealthResponse,
        ErrorEnvelope,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Drinks", description = "Menu browsing and management"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Drink Menu API");
        assert!(spec.to_json().is_ok());
    }

    #[test]
    fn test_drink_paths_registered() {
        let paths = ApiDoc::openapi().paths.paths;
        assert!(paths.contains_key("/drinks"));
        assert!(paths.contains_key("/drinks-detail"));
        assert!(paths.contains_key("/drinks/{id}"));
        assert!(paths.contains_key("/health"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
