use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use vidora_core::api_types::ApiResponse;

/// Success envelope whose HTTP status mirrors its `statusCode` field.
#[derive(Debug)]
pub struct Envelope<T>(pub ApiResponse<T>);

impl<T> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self(ApiResponse::ok(data, message))
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self(ApiResponse::created(data, message))
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self.0)).into_response()
    }
}
