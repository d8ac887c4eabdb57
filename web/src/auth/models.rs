//! Form payloads for the sign-in, registration and password reset pages.
//!
//! Every form is validated with `validator` before anything is sent to the
//! backend; failures are rendered inline as `field: message` strings.

use crate::errors::field_messages;
use serde::Deserialize;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const OTP_LENGTH: usize = 6;

/// Sign-in form, shared by the user and admin pages.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignInForm {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Local path to return to after signing in.
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 7, max = 20, message = "Enter a valid phone number"))]
    pub phone_number: String,

    #[serde(default)]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// OTP entry. `sent_at` is the unix time the code was sent, carried in the
/// form so the resend countdown survives a failed attempt.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VerifyOtpForm {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "validate_otp"))]
    pub otp: String,

    #[serde(default)]
    pub sent_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Reset link is invalid or has expired"))]
    pub reset_token: String,

    #[serde(default)]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// `?email=...&sent_at=...` on the OTP page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtpPageQuery {
    pub email: Option<String>,
    pub sent_at: Option<i64>,
}

/// `?token=...` on the reset page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPageQuery {
    pub token: Option<String>,
}

/// `?redirect=...` on the sign-in pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInPageQuery {
    pub redirect: Option<String>,
}

/// Runs the derived validation and flattens the result.
pub fn form_errors<T: Validate>(form: &T) -> Vec<String> {
    match form.validate() {
        Ok(()) => Vec::new(),
        Err(e) => field_messages(&e),
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// At least 8 characters with upper and lower case letters, a digit and a
/// special character.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(rule_error(
            "password_length",
            "Password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule_error(
            "password_uppercase",
            "Password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(rule_error(
            "password_lowercase",
            "Password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule_error("password_digit", "Password must contain a number"));
    }
    if password.chars().all(|c| c.is_alphanumeric() || c.is_whitespace()) {
        return Err(rule_error(
            "password_special",
            "Password must contain a special character",
        ));
    }
    Ok(())
}

fn validate_otp(otp: &str) -> Result<(), ValidationError> {
    let otp = otp.trim();
    if otp.len() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(rule_error("otp", "Enter the 6-digit code sent to your email"));
    }
    Ok(())
}
