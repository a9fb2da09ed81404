//! # Vidora Server
//!
//! REST backend for a video-sharing platform.
//!
//! ## Overview
//!
//! - **Accounts**: registration with avatar upload, JWT access/refresh
//!   tokens delivered as cookies and in the body, password changes
//! - **Videos**: publishing to an external media host, a searchable
//!   published feed, per-viewer detail with view counting and watch history
//! - **Social**: comments, likes on videos/comments/tweets, channel
//!   subscriptions, playlists and tweets
//! - **Dashboard**: per-channel totals and the creator's own video list
//!
//! ## Architecture
//!
//! Handlers talk to the repository bundle in [`vidora_core::application::AppUnitOfWork`]
//! and to a [`media::MediaStore`]; both live in [`AppState`]. Every failure is
//! an [`infra::errors::AppError`], rendered once into the failure envelope.

pub mod auth;
pub mod extract;
pub mod handlers;
pub mod infra;
pub mod media;
pub mod routes;

pub use infra::app_state::AppState;

use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Uri, header},
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::infra::{config::Config, errors::AppError};

/// Assemble the full application: versioned routes, fallback, body limits
/// and the CORS/trace/panic layers.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let json_limit = state.config.json_body_limit_bytes;

    routes::create_api_router(state.clone())
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(json_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {} not found", uri.path()))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "request handler panicked");
    AppError::internal("Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use vidora_core::{
        api::routes::v1, api_types::ApiErrorResponse, application::AppUnitOfWork,
        database::InMemoryStore,
    };

    use super::*;
    use crate::media::{MediaStore, ResourceKind, TempUpload, UploadedAsset};

    #[derive(Debug)]
    struct NoMedia;

    #[async_trait]
    impl MediaStore for NoMedia {
        async fn upload(&self, file: TempUpload, _kind: ResourceKind) -> Option<UploadedAsset> {
            file.close();
            None
        }

        async fn delete(&self, _public_id: &str, _kind: ResourceKind) {}
    }

    fn app(cors_origin: Option<&'static str>) -> Router {
        let mut env = HashMap::from([
            ("DATABASE_URL", "postgres://vidora@localhost/vidora"),
            ("ACCESS_TOKEN_SECRET", "access-secret"),
            ("REFRESH_TOKEN_SECRET", "refresh-secret"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ]);
        if let Some(origin) = cors_origin {
            env.insert("CORS_ORIGIN", origin);
        }
        let config = Config::from_lookup(|key| env.get(key).map(|value| value.to_string()))
            .expect("test config should load");
        let store = InMemoryStore::new();
        let state = AppState::new(
            Arc::new(AppUnitOfWork::in_memory(&store)),
            Arc::new(config),
            Arc::new(NoMedia),
        );
        create_app(state)
    }

    #[tokio::test]
    async fn unknown_routes_get_the_failure_envelope() {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.status_code, 404);
        assert!(!envelope.success);
        assert_eq!(envelope.message, "Route /api/v1/nowhere not found");
    }

    #[tokio::test]
    async fn configured_origins_may_send_credentials() {
        let response = app(Some("https://app.example"))
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(v1::HEALTHCHECK)
                    .header(header::ORIGIN, "https://app.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.message, "Internal server error");
    }
}
