//! Session cookie management.
//!
//! Admin and user sessions live in separate HTTP-only cookies holding the
//! backend-issued bearer token. The cookie expires together with the token.

use crate::utils::jwt::{JwtUtils, SessionClaims, SessionError};
use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use chrono::{DateTime, Utc};
use tracing::debug;

pub const ADMIN_COOKIE: &str = "admin-auth-cookie-name";
pub const USER_COOKIE: &str = "user-auth-cookie-name";

/// Which of the two session cookies a request or response concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Admin,
    User,
}

impl SessionKind {
    pub fn cookie_name(&self) -> &'static str {
        match self {
            SessionKind::Admin => ADMIN_COOKIE,
            SessionKind::User => USER_COOKIE,
        }
    }

    pub fn sign_in_path(&self) -> &'static str {
        match self {
            SessionKind::Admin => "/auth/admin/sign-in",
            SessionKind::User => "/auth/sign-in",
        }
    }

    /// Where a fresh sign-in lands when no `redirect` was requested.
    pub fn landing_path(&self) -> &'static str {
        match self {
            SessionKind::Admin => "/admin",
            SessionKind::User => "/dashboard",
        }
    }
}

/// An authenticated session attached to request extensions by the route guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub kind: SessionKind,
    pub token: String,
    pub claims: SessionClaims,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin
    }
}

/// Builds the `Set-Cookie` value for a freshly issued token. The token is
/// verified first; its `exp` drives both `Expires` and `Max-Age`.
pub fn create_cookie(
    jwt: &JwtUtils,
    kind: SessionKind,
    token: &str,
    secure: bool,
    now: i64,
) -> Result<(HeaderValue, SessionClaims), SessionError> {
    let claims = jwt.verify(token, now)?;
    let expires = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or(SessionError::Expired(claims.exp))?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly;{} SameSite=Lax; Expires={}; Max-Age={}",
        kind.cookie_name(),
        token,
        if secure { " Secure;" } else { "" },
        expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        claims.seconds_remaining(now)
    );

    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| SessionError::Malformed(format!("token is not cookie-safe: {}", e)))?;
    Ok((value, claims))
}

/// Reads a cookie by name from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .map(|pair| pair.trim())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key.trim() == name).then_some(value.trim())
        })
        .filter(|value| !value.is_empty())
}

/// Reads the session token for `kind`, if present.
pub fn get_cookie(headers: &HeaderMap, kind: SessionKind) -> Option<&str> {
    read_cookie(headers, kind.cookie_name())
}

/// `Set-Cookie` value that removes the session cookie.
pub fn delete_cookie(kind: SessionKind) -> HeaderValue {
    HeaderValue::from_static(match kind {
        SessionKind::Admin => {
            "admin-auth-cookie-name=; Path=/; HttpOnly; SameSite=Lax; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0"
        }
        SessionKind::User => {
            "user-auth-cookie-name=; Path=/; HttpOnly; SameSite=Lax; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0"
        }
    })
}

/// Typed session lookup: distinguishes a missing cookie from a malformed or
/// expired token.
pub fn decode_session(
    jwt: &JwtUtils,
    headers: &HeaderMap,
    kind: SessionKind,
    now: i64,
) -> Result<Session, SessionError> {
    let token = get_cookie(headers, kind).ok_or(SessionError::Missing)?;
    let claims = jwt.verify(token, now)?;
    Ok(Session {
        kind,
        token: token.to_string(),
        claims,
    })
}

/// Session lookup for callers that only care whether a usable session exists.
/// Malformed and expired tokens are treated exactly like an absent cookie.
pub fn get_session(
    jwt: &JwtUtils,
    headers: &HeaderMap,
    kind: SessionKind,
    now: i64,
) -> Option<Session> {
    match decode_session(jwt, headers, kind, now) {
        Ok(session) => Some(session),
        Err(SessionError::Missing) => None,
        Err(e) => {
            debug!("Ignoring {} session: {}", kind.cookie_name(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::test_tokens::{SECRET, claims, sign, token};

    const NOW: i64 = 1_700_000_000;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_create_cookie_matches_token_expiry() {
        let jwt = JwtUtils::new(SECRET);
        let token = token(false, NOW + 7200);
        let (value, claims) = create_cookie(&jwt, SessionKind::User, &token, true, NOW).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with(&format!("user-auth-cookie-name={};", token)));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Max-Age=7200"));
        assert!(value.contains("Expires=Wed, 15 Nov 2023 00:13:20 GMT"));
        assert_eq!(claims.exp, NOW + 7200);
    }

    #[test]
    fn test_create_cookie_rejects_expired_token() {
        let jwt = JwtUtils::new(SECRET);
        let result = create_cookie(&jwt, SessionKind::Admin, &token(true, NOW - 5), false, NOW);
        assert_eq!(result.unwrap_err(), SessionError::Expired(NOW - 5));
    }

    #[test]
    fn test_get_cookie_picks_named_cookie() {
        let headers = headers_with("theme=dark; user-auth-cookie-name=abc.def.ghi; other=1");
        assert_eq!(get_cookie(&headers, SessionKind::User), Some("abc.def.ghi"));
        assert_eq!(get_cookie(&headers, SessionKind::Admin), None);
    }

    #[test]
    fn test_empty_cookie_counts_as_missing() {
        let headers = headers_with("admin-auth-cookie-name=");
        assert_eq!(get_cookie(&headers, SessionKind::Admin), None);
    }

    #[test]
    fn test_get_session_with_past_exp_is_none() {
        let jwt = JwtUtils::new(SECRET);
        let headers = headers_with(&format!("user-auth-cookie-name={}", token(false, NOW - 1)));
        assert!(get_session(&jwt, &headers, SessionKind::User, NOW).is_none());
        assert_eq!(
            decode_session(&jwt, &headers, SessionKind::User, NOW).unwrap_err(),
            SessionError::Expired(NOW - 1)
        );
    }

    #[test]
    fn test_malformed_and_missing_both_yield_no_session() {
        let jwt = JwtUtils::new(SECRET);
        let malformed = headers_with("user-auth-cookie-name=garbage");
        let missing = HeaderMap::new();

        assert!(get_session(&jwt, &malformed, SessionKind::User, NOW).is_none());
        assert!(get_session(&jwt, &missing, SessionKind::User, NOW).is_none());

        // The typed lookup keeps them apart.
        assert!(matches!(
            decode_session(&jwt, &malformed, SessionKind::User, NOW),
            Err(SessionError::Malformed(_))
        ));
        assert_eq!(
            decode_session(&jwt, &missing, SessionKind::User, NOW).unwrap_err(),
            SessionError::Missing
        );
    }

    #[test]
    fn test_tampered_signature_yields_no_session() {
        let jwt = JwtUtils::new(SECRET);
        let forged = sign(&claims(true, NOW + 60), "not-the-backend");
        let headers = headers_with(&format!("admin-auth-cookie-name={}", forged));
        assert!(get_session(&jwt, &headers, SessionKind::Admin, NOW).is_none());
    }

    #[test]
    fn test_delete_cookie_expires_immediately() {
        let value = delete_cookie(SessionKind::Admin);
        let value = value.to_str().unwrap();
        assert!(value.starts_with("admin-auth-cookie-name=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
