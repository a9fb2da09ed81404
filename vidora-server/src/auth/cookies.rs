use axum::{
    http::{HeaderMap, HeaderName, header},
    response::AppendHeaders,
};
use cookie::Cookie;

use super::token::TokenPair;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

pub type SetCookies = AppendHeaders<[(HeaderName, String); 2]>;

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

/// `Set-Cookie` headers carrying both tokens.
pub fn set_session_cookies(tokens: &TokenPair) -> SetCookies {
    AppendHeaders([
        (
            header::SET_COOKIE,
            session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone()).to_string(),
        ),
        (
            header::SET_COOKIE,
            session_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone()).to_string(),
        ),
    ])
}

/// `Set-Cookie` headers expiring both tokens.
pub fn clear_session_cookies() -> SetCookies {
    let removal = |name| {
        let mut cookie = session_cookie(name, String::new());
        cookie.make_removal();
        cookie.to_string()
    };
    AppendHeaders([
        (header::SET_COOKIE, removal(ACCESS_TOKEN_COOKIE)),
        (header::SET_COOKIE, removal(REFRESH_TOKEN_COOKIE)),
    ])
}

/// Value of a request cookie; empty values count as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookies_are_http_only_and_secure() {
        let rendered = session_cookie(ACCESS_TOKEN_COOKIE, "abc".into()).to_string();
        assert!(rendered.starts_with("accessToken=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));
    }

    #[test]
    fn reads_named_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=tok; refreshToken=ref"),
        );
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE).as_deref(), Some("tok"));
        assert_eq!(read_cookie(&headers, REFRESH_TOKEN_COOKIE).as_deref(), Some("ref"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn cleared_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken="));
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE), None);
    }
}
