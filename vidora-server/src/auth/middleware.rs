use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::cookies::{ACCESS_TOKEN_COOKIE, read_cookie};
use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Attach the authenticated [`vidora_core::domain::User`] to the request.
///
/// The `accessToken` cookie takes precedence over an `Authorization: Bearer`
/// header. Any failure (no token, bad signature, expiry, deleted account)
/// is a 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = extract_access_token(request.headers())
        .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;
    let claims = state.tokens.verify_access(&token)?;

    let user = state
        .unit_of_work
        .users
        .get_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| {
            debug!(user_id = %claims.sub, "token subject no longer exists");
            AppError::unauthorized("Invalid access token")
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, ACCESS_TOKEN_COOKIE).or_else(|| extract_bearer_token(headers))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_access_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_header_is_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_access_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_access_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_access_token(&headers), None);
    }
}
