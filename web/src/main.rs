//! Main entry point for the EdgeHomes web frontend.
//!
//! This file loads configuration, builds the shared application state and
//! serves the server-rendered pages. Every page talks to the backend REST API
//! through `backend::client::BackendClient`.

mod auth;
mod backend;
mod config;
mod errors;
mod pages;
mod services;
mod state;
mod utils;
mod views;

use anyhow::Context;
use auth::middleware::{optional_session, route_guard};
use axum::{Extension, Router, middleware};
use config::Config;
use state::AppState;
use tracing::info;
use tracing_subscriber::fmt::init;

/// All page routers merged at the root.
fn app_router() -> Router {
    Router::new()
        .merge(pages::public::routes::public_router())
        .merge(pages::dashboard::routes::dashboard_router())
        .merge(pages::admin::routes::admin_router())
        .merge(auth::routes::auth_router())
        .merge(pages::ui::ui_router())
        .merge(pages::assets::assets_router())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env()?;
    let port = config.server_port;
    let backend_url = config.backend_url.clone();
    let state = AppState::new(config).context("Failed to build application state")?;

    let app = app_router()
        .layer(middleware::from_fn(optional_session))
        .layer(middleware::from_fn(route_guard))
        .layer(Extension(state));

    let bind_address = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!(
        "Starting EdgeHomes web on port {} (backend {})",
        port, backend_url
    );
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::test_tokens::token;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::COOKIE, header::LOCATION},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        app_router()
            .layer(middleware::from_fn(optional_session))
            .layer(middleware::from_fn(route_guard))
            .layer(Extension(AppState::new(Config::for_tests()).unwrap()))
    }

    fn get(uri: &str, cookie: Option<String>) -> Request<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        request.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_guard_sends_anonymous_dashboard_visit_to_sign_in() {
        let response = app()
            .oneshot(get("/dashboard/bookings", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[LOCATION],
            "/auth/sign-in?redirect=%2Fdashboard%2Fbookings"
        );
    }

    #[tokio::test]
    async fn test_signed_in_user_reaches_dashboard_page() {
        let cookie = format!("user-auth-cookie-name={}", token(false, i64::MAX / 2));
        let response = app()
            .oneshot(get("/dashboard/notifications", Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_public_sign_in_page_is_open() {
        let response = app().oneshot(get("/auth/sign-in", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
