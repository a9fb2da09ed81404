//! Request extractors whose rejections render as failure envelopes, plus
//! the small parsing helpers every handler shares.

use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Parses a path identifier, naming the resource in the 400 message.
pub fn parse_id(raw: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request(format!("Invalid {resource} id")))
}

/// Trimmed value, or `None` when missing or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn required<'a>(value: Option<&'a str>, message: &str) -> AppResult<&'a str> {
    non_blank(value).ok_or_else(|| AppError::bad_request(message))
}
