//! Routes for the sign-in, registration and password reset pages.

use crate::auth::handlers::*;
use axum::{Router, routing::get, routing::post};

/// Creates the authentication router. Paths are absolute so the router can be
/// merged at the root.
pub fn auth_router() -> Router {
    Router::new()
        .route("/auth/sign-in", get(sign_in_page).post(sign_in))
        .route("/auth/admin/sign-in", get(admin_sign_in_page).post(admin_sign_in))
        .route("/auth/register", get(register_page).post(register))
        .route(
            "/auth/forgot-password",
            get(forgot_password_page).post(forgot_password),
        )
        .route("/auth/verify-otp", get(verify_otp_page).post(verify_otp))
        .route(
            "/auth/reset-password",
            get(reset_password_page).post(reset_password),
        )
        .route("/auth/logout", post(logout))
        .route("/auth/admin/logout", post(admin_logout))
}
