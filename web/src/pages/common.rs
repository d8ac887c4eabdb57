//! Shared helpers for page handlers.
//!
//! Provides the mapping from `ServiceError` to what the visitor sees:
//! - a stale or rejected session becomes a redirect to the right sign-in page,
//!   with the dead cookie cleared
//! - a missing record becomes a 404 page
//! - everything else is shown as an error alert on the page that failed
//!
//! Also builds the post-mutation redirects that carry a notice back to the
//! list being refreshed.

use crate::auth::session::{Session, SessionKind, delete_cookie};
use crate::backend::models::PageQuery;
use crate::errors::ServiceError;
use crate::utils::local_url;
use crate::views::ui_state::SidebarState;
use crate::views::{Flash, FlashLevel, Layout, Page, empty_state};
use axum::http::{HeaderMap, StatusCode, header::SET_COOKIE};
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, warn};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// HTTP status for a page that could not be rendered normally.
pub fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Validation { .. } | ServiceError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        ServiceError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Backend { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ServiceError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        ServiceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Redirect to the sign-in page for `kind`, clearing its cookie.
pub fn sign_in_again(kind: SessionKind, return_to: &str) -> Response {
    let target = local_url(kind.sign_in_path(), &[("redirect", return_to)]);
    (
        [(SET_COOKIE, delete_cookie(kind))],
        Redirect::to(&target),
    )
        .into_response()
}

/// Renders `page` for a failed load, or sends the visitor back to sign in
/// when the backend no longer accepts their token.
pub fn load_failed(error: ServiceError, kind: SessionKind, path: &str, page: Page) -> Response {
    if error.is_unauthorized() {
        warn!("Backend rejected {:?} session on {}", kind, path);
        return sign_in_again(kind, path);
    }

    match &error {
        ServiceError::ExternalService { .. } | ServiceError::Internal { .. } => {
            error!("Failed to load {}: {}", path, error)
        }
        _ => warn!("Failed to load {}: {}", path, error),
    }

    let status = status_for(&error);
    let messages = error.user_messages();
    let body = empty_state(messages.first().map(String::as_str).unwrap_or("Unavailable"));
    let page = messages
        .into_iter()
        .fold(page.body(body), |page, m| page.flash(Some(Flash::error(m))));
    (status, page.render()).into_response()
}

/// Sends the visitor back to `back_to` with the failure as an error notice,
/// or to sign in when the session was rejected.
pub fn mutation_failed(error: ServiceError, kind: SessionKind, back_to: &str) -> Response {
    if error.is_unauthorized() {
        warn!("Backend rejected {:?} session while updating {}", kind, back_to);
        return sign_in_again(kind, back_to);
    }
    warn!("Update from {} failed: {}", back_to, error);
    let message = error.user_messages().join(" ");
    redirect_with_notice(back_to, Flash::error(message))
}

/// `303 See Other` back to `path` with a notice for the refreshed page.
pub fn redirect_with_notice(path: &str, flash: Flash) -> Response {
    let level = match flash.level {
        FlashLevel::Success => "success",
        FlashLevel::Error => "error",
        FlashLevel::Info => "info",
    };
    Redirect::to(&local_url(path, &[("notice", &flash.message), ("level", level)])).into_response()
}

/// `?page=` on list pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
}

impl ListQuery {
    pub fn to_page_query(&self, limit: u32) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1).max(1),
            limit,
        }
    }
}

pub fn dashboard_layout(session: &Session, headers: &HeaderMap) -> Layout {
    Layout::Dashboard {
        name: display_name(session),
        sidebar: SidebarState::from_headers(headers),
    }
}

pub fn admin_layout(session: &Session, headers: &HeaderMap) -> Layout {
    Layout::Admin {
        name: display_name(session),
        sidebar: SidebarState::from_headers(headers),
    }
}

fn display_name(session: &Session) -> String {
    if session.claims.name.is_empty() {
        session.claims.email.clone()
    } else {
        session.claims.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ServiceError::not_found("Property", "p1")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ServiceError::backend(409, "Already booked")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ServiceError::external_service("timeout")),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_unauthorized_load_redirects_and_clears_cookie() {
        let page = Page::new("Bookings", Layout::Public { signed_in: false }, "/dashboard/bookings");
        let response = load_failed(
            ServiceError::backend(401, "Token expired"),
            SessionKind::User,
            "/dashboard/bookings",
            page,
        );
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[LOCATION],
            "/auth/sign-in?redirect=%2Fdashboard%2Fbookings"
        );
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("user-auth-cookie-name=;"));
    }

    #[test]
    fn test_other_failures_render_alert() {
        let page = Page::new("Bookings", Layout::Public { signed_in: false }, "/admin/bookings");
        let response = load_failed(
            ServiceError::external_service("connection refused"),
            SessionKind::Admin,
            "/admin/bookings",
            page,
        );
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_mutation_failure_becomes_error_notice() {
        let response = mutation_failed(
            ServiceError::backend(400, "Booking already confirmed"),
            SessionKind::Admin,
            "/admin/bookings",
        );
        assert_eq!(
            response.headers()[LOCATION],
            "/admin/bookings?notice=Booking+already+confirmed&level=error"
        );
    }

    #[test]
    fn test_list_query_defaults_to_first_page() {
        assert_eq!(ListQuery::default().to_page_query(10), PageQuery { page: 1, limit: 10 });
        let query = ListQuery { page: Some(0) };
        assert_eq!(query.to_page_query(20).page, 1);
    }

    #[test]
    fn test_redirect_with_notice() {
        let response = redirect_with_notice("/admin/bookings", Flash::success("Booking confirmed"));
        assert_eq!(
            response.headers()[LOCATION],
            "/admin/bookings?notice=Booking+confirmed&level=success"
        );
    }
}
