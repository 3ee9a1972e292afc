//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; the health
//! check lives at the root. With the `swagger-ui` feature enabled the
//! interactive documentation is served at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;

use crate::app_state::AppState;

/// Upper bound on multipart submissions (listings carry up to 30
/// full-resolution photos).
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// OpenAPI document collecting every annotated endpoint.
#[cfg(feature = "swagger-ui")]
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::register,
        handlers::auth::ping,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::listings::search_listings,
        handlers::listings::get_listing,
        handlers::listings::create_listing,
        handlers::listings::update_listing,
        handlers::listings::delete_listing,
        handlers::sell_orders::create_order,
        handlers::sell_orders::list_orders,
        handlers::sell_orders::get_order,
        handlers::sell_orders::update_order,
        handlers::sell_orders::delete_order,
        handlers::feedbacks::create_feedback,
        handlers::feedbacks::list_feedbacks,
        handlers::feedbacks::get_feedback,
        handlers::feedbacks::update_feedback,
        handlers::feedbacks::delete_feedback,
        handlers::system::health_handler,
        handlers::system::failed_uploads_handler,
    ),
    info(
        title = "estate-api",
        description = "REST backend for a real-estate listing and lead-management platform"
    )
)]
#[derive(Debug)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::root_routes());
    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
    router.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// CORS for the browser-based admin panel. The refresh cookie forces
/// credentials, which in turn forces an explicit origin list; the
/// method list must cover every registered verb, PATCH included.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-service-id"),
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::patch;
    use tower::ServiceExt;

    const ORIGIN: &str = "https://admin.example.com";

    async fn preflight(method: &str) -> Option<String> {
        let app: Router = Router::new()
            .route("/api/v1/orders/sell/{id}", patch(|| async { "ok" }))
            .layer(cors_layer(&[ORIGIN.to_owned()]));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/orders/sell/1")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
            .body(Body::empty())
            .ok()?;
        let response = app.oneshot(request).await.ok()?;
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    #[tokio::test]
    async fn preflight_permits_patch_for_order_updates() {
        let allowed = preflight("PATCH").await.unwrap_or_default();
        assert!(allowed.contains("PATCH"), "allow-methods was {allowed:?}");
    }

    #[tokio::test]
    async fn preflight_covers_every_registered_verb() {
        let allowed = preflight("GET").await.unwrap_or_default();
        for verb in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
            assert!(allowed.contains(verb), "missing {verb} in {allowed:?}");
        }
    }
}
