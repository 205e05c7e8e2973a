//! Cookie helpers for the session and OAuth state cookies

use axum::http::{header::COOKIE, HeaderMap};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "session_token";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
pub const OAUTH_STATE_TTL: Duration = Duration::from_secs(600);

/// `Set-Cookie` value for an HttpOnly cookie scoped to the whole site.
pub fn build_cookie(name: &str, value: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name,
        value,
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", Duration::ZERO, secure)
}

/// Value of the first cookie called `name` across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Compare two secrets without short-circuiting on the first differing byte.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_build_cookie_attributes() {
        let cookie = build_cookie(SESSION_COOKIE, "abc", Duration::from_secs(86_400), false);
        assert_eq!(
            cookie,
            "session_token=abc; Path=/; Max-Age=86400; HttpOnly; SameSite=Lax"
        );

        let secure = build_cookie(SESSION_COOKIE, "abc", Duration::from_secs(60), true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie(SESSION_COOKIE, false);
        assert!(cookie.starts_with("session_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie_from_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        headers.append(COOKIE, HeaderValue::from_static("session_token=tok.en.value"));

        assert_eq!(
            read_cookie(&headers, SESSION_COOKIE).as_deref(),
            Some("tok.en.value")
        );
        assert_eq!(read_cookie(&headers, "lang").as_deref(), Some("en"));
        assert_eq!(read_cookie(&headers, OAUTH_STATE_COOKIE), None);
    }

    #[test]
    fn test_empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session_token="));

        assert_eq!(read_cookie(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
