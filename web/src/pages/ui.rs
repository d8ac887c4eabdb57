//! Sidebar collapse toggle shared by the dashboard and admin layouts.

use crate::utils::sanitize_redirect;
use crate::views::ui_state::{SidebarAction, SidebarState};
use axum::{
    Router,
    extract::Form,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SidebarForm {
    pub action: SidebarAction,
    pub back: Option<String>,
}

pub async fn sidebar(headers: HeaderMap, Form(form): Form<SidebarForm>) -> Response {
    let state = SidebarState::from_headers(&headers).reduce(form.action);
    let back = sanitize_redirect(form.back.as_deref(), "/");
    ([(SET_COOKIE, state.to_cookie())], Redirect::to(&back)).into_response()
}

pub fn ui_router() -> Router {
    Router::new().route("/ui/sidebar", post(sidebar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::COOKIE, header::LOCATION},
    };
    use tower::ServiceExt;

    async fn toggle(cookie: Option<&str>, body: &'static str) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri("/ui/sidebar")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        ui_router()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_flips_cookie_and_returns() {
        let response = toggle(None, "action=toggle&back=%2Fadmin%2Fbookings").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/admin/bookings");
        assert!(
            response.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .starts_with("sidebar-collapsed=true")
        );

        let response = toggle(Some("sidebar-collapsed=true"), "action=toggle&back=%2Fdashboard").await;
        assert!(
            response.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .starts_with("sidebar-collapsed=false")
        );
    }

    #[tokio::test]
    async fn test_offsite_back_link_is_ignored() {
        let response = toggle(None, "action=expand&back=https%3A%2F%2Fevil.example").await;
        assert_eq!(response.headers()[LOCATION], "/");
    }
}
