//! Handler functions for the authentication pages.
//!
//! These functions render and process sign-in (user and admin), registration,
//! the OTP password reset flow and logout. Input is validated before any
//! backend call; a successful sign-in stores the backend's token in the
//! HTTP-only cookie for its session kind.

use crate::auth::models::*;
use crate::auth::otp::OtpCountdown;
use crate::auth::session::{SessionKind, create_cookie, delete_cookie};
use crate::backend::models::{
    OtpRequestPayload, OtpVerifyPayload, RegisterPayload, ResetPasswordPayload, SignInPayload,
};
use crate::pages::common::{now, redirect_with_notice, status_for};
use crate::state::AppState;
use crate::utils::jwt::{JwtUtils, SessionClaims};
use crate::utils::{local_url, sanitize_redirect};
use crate::views::forms::{
    forgot_password_form, register_form, reset_password_form, sign_in_form, verify_otp_form,
};
use crate::views::{Flash, FlashQuery, Layout, Page};
use axum::{
    extract::{Extension, Form, Query},
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

fn auth_page(title: &str, path: &str, body: String) -> Page {
    Page::new(title, Layout::Public { signed_in: false }, path).body(body)
}

fn form_response(status: StatusCode, page: Page) -> Response {
    (status, page.render()).into_response()
}

fn sign_in_title(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::Admin => "Admin sign in",
        SessionKind::User => "Sign in",
    }
}

/// Turns a freshly issued backend token into the session cookie for `kind`.
/// Admin sign-in refuses tokens without the admin claim.
pub fn establish_session(
    jwt: &JwtUtils,
    kind: SessionKind,
    token: &str,
    secure: bool,
    now: i64,
) -> Result<(HeaderValue, SessionClaims), String> {
    let (cookie, claims) = create_cookie(jwt, kind, token, secure, now).map_err(|e| {
        warn!("Backend issued an unusable token: {}", e);
        "We could not start your session. Please try again.".to_string()
    })?;

    if kind == SessionKind::Admin && !claims.is_admin {
        warn!("Non-admin user {} tried the admin sign-in", claims.sub);
        return Err("This account does not have admin access".to_string());
    }
    Ok((cookie, claims))
}

fn render_sign_in(kind: SessionKind, page_query: SignInPageQuery, notice: FlashQuery) -> Response {
    let body = sign_in_form(kind, "", page_query.redirect.as_deref(), &[]);
    auth_page(sign_in_title(kind), kind.sign_in_path(), body)
        .flash(notice.flash())
        .render()
        .into_response()
}

async fn sign_in_as(state: &AppState, kind: SessionKind, form: SignInForm) -> Response {
    let rerender = |status: StatusCode, errors: &[String]| {
        let body = sign_in_form(kind, &form.email, form.redirect.as_deref(), errors);
        form_response(status, auth_page(sign_in_title(kind), kind.sign_in_path(), body))
    };

    let errors = form_errors(&form);
    if !errors.is_empty() {
        return rerender(StatusCode::UNPROCESSABLE_ENTITY, &errors);
    }

    let payload = SignInPayload {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };
    let token = match state.backend.sign_in(&payload).await {
        Ok(token) => token,
        Err(e) => {
            warn!("Sign-in for {} failed: {}", payload.email, e);
            return rerender(status_for(&e), &e.user_messages());
        }
    };

    match establish_session(&state.jwt, kind, &token, state.config.cookie_secure, now()) {
        Ok((cookie, claims)) => {
            info!("{:?} session started for user {}", kind, claims.sub);
            let target = sanitize_redirect(form.redirect.as_deref(), kind.landing_path());
            ([(SET_COOKIE, cookie)], Redirect::to(&target)).into_response()
        }
        Err(message) => rerender(StatusCode::FORBIDDEN, &[message]),
    }
}

pub async fn sign_in_page(
    Query(page_query): Query<SignInPageQuery>,
    Query(notice): Query<FlashQuery>,
) -> Response {
    render_sign_in(SessionKind::User, page_query, notice)
}

#[axum::debug_handler]
pub async fn sign_in(
    Extension(state): Extension<AppState>,
    Form(form): Form<SignInForm>,
) -> Response {
    sign_in_as(&state, SessionKind::User, form).await
}

pub async fn admin_sign_in_page(
    Query(page_query): Query<SignInPageQuery>,
    Query(notice): Query<FlashQuery>,
) -> Response {
    render_sign_in(SessionKind::Admin, page_query, notice)
}

#[axum::debug_handler]
pub async fn admin_sign_in(
    Extension(state): Extension<AppState>,
    Form(form): Form<SignInForm>,
) -> Response {
    sign_in_as(&state, SessionKind::Admin, form).await
}

pub async fn register_page() -> Response {
    auth_page(
        "Create an account",
        "/auth/register",
        register_form(&RegisterForm::default(), &[]),
    )
    .render()
    .into_response()
}

#[axum::debug_handler]
pub async fn register(
    Extension(state): Extension<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let rerender = |status: StatusCode, errors: &[String]| {
        form_response(
            status,
            auth_page("Create an account", "/auth/register", register_form(&form, errors)),
        )
    };

    let errors = form_errors(&form);
    if !errors.is_empty() {
        return rerender(StatusCode::UNPROCESSABLE_ENTITY, &errors);
    }

    let payload = RegisterPayload {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone_number: form.phone_number.trim().to_string(),
        password: form.password.clone(),
    };
    match state.backend.register(&payload).await {
        Ok(_) => {
            info!("Registered account for {}", payload.email);
            redirect_with_notice(
                SessionKind::User.sign_in_path(),
                Flash::success("Account created. Please sign in."),
            )
        }
        Err(e) => {
            warn!("Registration for {} failed: {}", payload.email, e);
            rerender(status_for(&e), &e.user_messages())
        }
    }
}

pub async fn forgot_password_page() -> Response {
    auth_page(
        "Reset your password",
        "/auth/forgot-password",
        forgot_password_form("", &[]),
    )
    .render()
    .into_response()
}

/// Sends (or re-sends) the reset code and moves on to code entry.
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(state): Extension<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let rerender = |status: StatusCode, errors: &[String]| {
        form_response(
            status,
            auth_page(
                "Reset your password",
                "/auth/forgot-password",
                forgot_password_form(&form.email, errors),
            ),
        )
    };

    let errors = form_errors(&form);
    if !errors.is_empty() {
        return rerender(StatusCode::UNPROCESSABLE_ENTITY, &errors);
    }

    let email = form.email.trim().to_string();
    match state
        .backend
        .send_otp(&OtpRequestPayload {
            email: email.clone(),
        })
        .await
    {
        Ok(_) => {
            info!("Password reset code sent to {}", email);
            let sent_at = now().to_string();
            Redirect::to(&local_url(
                "/auth/verify-otp",
                &[("email", &email), ("sent_at", &sent_at)],
            ))
            .into_response()
        }
        Err(e) => {
            warn!("Sending reset code to {} failed: {}", email, e);
            rerender(status_for(&e), &e.user_messages())
        }
    }
}

pub async fn verify_otp_page(Query(query): Query<OtpPageQuery>) -> Response {
    let Some(email) = query.email.filter(|e| !e.trim().is_empty()) else {
        return Redirect::to("/auth/forgot-password").into_response();
    };
    let now = now();
    let sent_at = query.sent_at.unwrap_or(now);
    auth_page(
        "Enter your code",
        "/auth/verify-otp",
        verify_otp_form(&email, sent_at, OtpCountdown::new(Some(sent_at), now), &[]),
    )
    .render()
    .into_response()
}

/// Checks the code; on success the reset form is rendered directly so the
/// reset token never appears in a URL.
#[axum::debug_handler]
pub async fn verify_otp(
    Extension(state): Extension<AppState>,
    Form(form): Form<VerifyOtpForm>,
) -> Response {
    let now = now();
    let sent_at = form.sent_at.unwrap_or(now);
    let rerender = |status: StatusCode, errors: &[String]| {
        form_response(
            status,
            auth_page(
                "Enter your code",
                "/auth/verify-otp",
                verify_otp_form(
                    &form.email,
                    sent_at,
                    OtpCountdown::new(Some(sent_at), now),
                    errors,
                ),
            ),
        )
    };

    let errors = form_errors(&form);
    if !errors.is_empty() {
        return rerender(StatusCode::UNPROCESSABLE_ENTITY, &errors);
    }

    let payload = OtpVerifyPayload {
        email: form.email.trim().to_string(),
        otp: form.otp.trim().to_string(),
    };
    match state.backend.verify_otp(&payload).await {
        Ok(verified) => auth_page(
            "Choose a new password",
            "/auth/reset-password",
            reset_password_form(&verified.reset_token, &[]),
        )
        .render()
        .into_response(),
        Err(e) => {
            warn!("Code verification for {} failed: {}", payload.email, e);
            rerender(status_for(&e), &e.user_messages())
        }
    }
}

pub async fn reset_password_page(Query(query): Query<ResetPageQuery>) -> Response {
    match query.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => auth_page(
            "Choose a new password",
            "/auth/reset-password",
            reset_password_form(&token, &[]),
        )
        .render()
        .into_response(),
        None => Redirect::to("/auth/forgot-password").into_response(),
    }
}

#[axum::debug_handler]
pub async fn reset_password(
    Extension(state): Extension<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let rerender = |status: StatusCode, errors: &[String]| {
        form_response(
            status,
            auth_page(
                "Choose a new password",
                "/auth/reset-password",
                reset_password_form(&form.reset_token, errors),
            ),
        )
    };

    let errors = form_errors(&form);
    if !errors.is_empty() {
        return rerender(StatusCode::UNPROCESSABLE_ENTITY, &errors);
    }

    let payload = ResetPasswordPayload {
        reset_token: form.reset_token.clone(),
        password: form.password.clone(),
    };
    match state.backend.reset_password(&payload).await {
        Ok(_) => redirect_with_notice(
            SessionKind::User.sign_in_path(),
            Flash::success("Password updated. Please sign in."),
        ),
        Err(e) => {
            warn!("Password reset failed: {}", e);
            rerender(status_for(&e), &e.user_messages())
        }
    }
}

/// Handle logout request: the session cookie is removed and the visitor sent
/// back to the public site.
pub async fn logout() -> Response {
    (
        [(SET_COOKIE, delete_cookie(SessionKind::User))],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn admin_logout() -> Response {
    (
        [(SET_COOKIE, delete_cookie(SessionKind::Admin))],
        Redirect::to(SessionKind::Admin.sign_in_path()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::routes::auth_router;
    use crate::config::Config;
    use crate::utils::jwt::test_tokens::{SECRET, token};
    use axum::{
        Router,
        body::Body,
        http::{Request, header::LOCATION},
    };
    use tower::ServiceExt;

    const NOW: i64 = 1_700_000_000;

    fn app() -> Router {
        auth_router().layer(Extension(AppState::new(Config::for_tests()).unwrap()))
    }

    fn post_form(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_admin_sign_in_requires_admin_claim() {
        let jwt = JwtUtils::new(SECRET);

        let result = establish_session(&jwt, SessionKind::Admin, &token(false, NOW + 60), true, NOW);
        assert_eq!(result.unwrap_err(), "This account does not have admin access");

        let (cookie, claims) =
            establish_session(&jwt, SessionKind::Admin, &token(true, NOW + 60), true, NOW).unwrap();
        assert!(claims.is_admin);
        assert!(cookie.to_str().unwrap().starts_with("admin-auth-cookie-name="));
    }

    #[test]
    fn test_user_sign_in_rejects_expired_token() {
        let jwt = JwtUtils::new(SECRET);
        assert!(establish_session(&jwt, SessionKind::User, &token(false, NOW - 1), true, NOW).is_err());
    }

    #[tokio::test]
    async fn test_invalid_sign_in_form_is_not_sent() {
        let response = app()
            .oneshot(post_form("/auth/sign-in", "email=nope&password=&redirect=%2Fdashboard"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_of(response).await;
        assert!(html.contains("email: Enter a valid email address"));
        assert!(html.contains(r#"name="redirect" value="/dashboard""#));
    }

    #[tokio::test]
    async fn test_weak_registration_password() {
        let response = app()
            .oneshot(post_form(
                "/auth/register",
                "name=Ada+Obi&email=ada%40example.com&phone_number=08012345678&password=password&confirm_password=password",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(
            body_of(response)
                .await
                .contains("password: Password must contain an uppercase letter")
        );
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = app()
            .oneshot(post_form("/auth/logout", ""))
            .await
            .unwrap();
        assert_eq!(response.headers()[LOCATION], "/");
        assert!(
            response.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );

        let response = app()
            .oneshot(post_form("/auth/admin/logout", ""))
            .await
            .unwrap();
        assert_eq!(response.headers()[LOCATION], "/auth/admin/sign-in");
        assert!(
            response.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .starts_with("admin-auth-cookie-name=;")
        );
    }

    #[tokio::test]
    async fn test_otp_page_without_email_goes_back() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/auth/verify-otp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[LOCATION], "/auth/forgot-password");
    }
}
