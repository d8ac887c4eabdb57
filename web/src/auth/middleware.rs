//! Route guard for the admin and dashboard areas.
//!
//! Every request under `/admin` or `/dashboard` is checked against the matching
//! session cookie. Requests without a usable session are redirected to the
//! right sign-in page with the original path in `redirect`; signed-in users
//! without the admin claim are sent home instead.

use crate::auth::session::{Session, SessionKind, get_session};
use crate::state::AppState;
use crate::utils::jwt::JwtUtils;
use crate::utils::local_url;
use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::debug;

pub const ADMIN_PREFIX: &str = "/admin";
pub const DASHBOARD_PREFIX: &str = "/dashboard";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Admin,
    Dashboard,
    Public,
}

impl RouteClass {
    pub fn classify(path: &str) -> Self {
        if has_prefix(path, ADMIN_PREFIX) {
            RouteClass::Admin
        } else if has_prefix(path, DASHBOARD_PREFIX) {
            RouteClass::Dashboard
        } else {
            RouteClass::Public
        }
    }

    fn session_kind(&self) -> Option<SessionKind> {
        match self {
            RouteClass::Admin => Some(SessionKind::Admin),
            RouteClass::Dashboard => Some(SessionKind::User),
            RouteClass::Public => None,
        }
    }
}

// "/administrator" is not under "/admin".
fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Let the request through, with the session when the route required one.
    Pass(Option<Session>),
    Redirect(String),
}

/// Decides what happens to a request for `path` given its headers.
pub fn guard_decision(jwt: &JwtUtils, path: &str, headers: &HeaderMap, now: i64) -> GuardDecision {
    let class = RouteClass::classify(path);
    let Some(kind) = class.session_kind() else {
        return GuardDecision::Pass(None);
    };

    let Some(session) = get_session(jwt, headers, kind, now) else {
        debug!("No valid {:?} session for {}, redirecting to sign-in", kind, path);
        return GuardDecision::Redirect(local_url(kind.sign_in_path(), &[("redirect", path)]));
    };

    if class == RouteClass::Admin && !session.is_admin() {
        debug!("User {} lacks admin claim for {}", session.claims.sub, path);
        return GuardDecision::Redirect(HOME_PATH.to_string());
    }

    GuardDecision::Pass(Some(session))
}

/// Session-cookie route guard middleware.
pub async fn route_guard(mut request: Request, next: Next) -> Response {
    let Some(state) = request.extensions().get::<AppState>().cloned() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let now = Utc::now().timestamp();
    let path = request.uri().path().to_string();

    match guard_decision(&state.jwt, &path, request.headers(), now) {
        GuardDecision::Pass(session) => {
            if let Some(session) = session {
                // Add the session to request extensions for use in handlers
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        GuardDecision::Redirect(target) => Redirect::temporary(&target).into_response(),
    }
}

/// Optional user session for public pages (doesn't redirect if missing).
pub async fn optional_session(mut request: Request, next: Next) -> Response {
    let session = request.extensions().get::<AppState>().and_then(|state| {
        get_session(
            &state.jwt,
            request.headers(),
            SessionKind::User,
            Utc::now().timestamp(),
        )
    });

    // Always insert the Option<Session>, even if it's None
    request.extensions_mut().insert(session);
    next.run(request).await
}
