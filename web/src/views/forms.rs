//! HTML forms. Each takes the values to pre-fill and the inline errors from
//! the last submission.

use crate::auth::models::RegisterForm;
use crate::auth::otp::OtpCountdown;
use crate::auth::session::SessionKind;
use crate::backend::models::{PropertyType, UserProfile};
use crate::pages::dashboard::models::{MAX_CREDITS_PER_PURCHASE, PropertyFormInput};
use crate::services::media_staging::{EditableImage, EditableVideo, MAX_IMAGES, MediaStaging};
use crate::utils::escape_html;
use crate::views::error_list;
use crate::views::ui_state::HomeFilters;

fn input(label: &str, name: &str, kind: &str, value: &str) -> String {
    format!(
        r#"<label>{} <input type="{}" name="{}" value="{}"></label>"#,
        label,
        kind,
        name,
        escape_html(value)
    )
}

pub fn sign_in_form(
    kind: SessionKind,
    email: &str,
    redirect: Option<&str>,
    errors: &[String],
) -> String {
    let (heading, extra) = match kind {
        SessionKind::Admin => ("Admin sign in", String::new()),
        SessionKind::User => (
            "Sign in",
            r#"<p><a href="/auth/forgot-password">Forgot password?</a></p>
<p>New here? <a href="/auth/register">Create an account</a></p>"#
                .to_string(),
        ),
    };
    let redirect = redirect
        .map(|r| format!(r#"<input type="hidden" name="redirect" value="{}">"#, escape_html(r)))
        .unwrap_or_default();

    format!(
        r#"<section class="auth-card">
<h1>{}</h1>
{}
<form method="post" action="{}">
    {}
    {}
    <label>Password <input type="password" name="password" autocomplete="current-password"></label>
    <button type="submit">Sign in</button>
</form>
{}
</section>"#,
        heading,
        error_list(errors),
        kind.sign_in_path(),
        redirect,
        input("Email", "email", "email", email),
        extra
    )
}

pub fn register_form(form: &RegisterForm, errors: &[String]) -> String {
    format!(
        r#"<section class="auth-card">
<h1>Create an account</h1>
{}
<form method="post" action="/auth/register">
    {}
    {}
    {}
    <label>Password <input type="password" name="password" autocomplete="new-password"></label>
    <label>Confirm password <input type="password" name="confirm_password" autocomplete="new-password"></label>
    <p class="hint">At least 8 characters, with upper and lower case letters, a number and a symbol.</p>
    <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/auth/sign-in">Sign in</a></p>
</section>"#,
        error_list(errors),
        input("Full name", "name", "text", &form.name),
        input("Email", "email", "email", &form.email),
        input("Phone number", "phone_number", "tel", &form.phone_number),
    )
}

pub fn forgot_password_form(email: &str, errors: &[String]) -> String {
    format!(
        r#"<section class="auth-card">
<h1>Reset your password</h1>
<p>Enter your email and we will send you a one-time code.</p>
{}
<form method="post" action="/auth/forgot-password">
    {}
    <button type="submit">Send code</button>
</form>
</section>"#,
        error_list(errors),
        input("Email", "email", "email", email)
    )
}

pub fn verify_otp_form(
    email: &str,
    sent_at: i64,
    countdown: OtpCountdown,
    errors: &[String],
) -> String {
    let resend = if countdown.can_resend() {
        format!(
            r#"<form method="post" action="/auth/forgot-password"><input type="hidden" name="email" value="{}"><button class="link" type="submit">Resend code</button></form>"#,
            escape_html(email)
        )
    } else {
        format!(
            r#"<p class="countdown" data-seconds="{}">Resend code in {}</p>"#,
            countdown.remaining_seconds(),
            countdown.label()
        )
    };

    format!(
        r#"<section class="auth-card">
<h1>Enter your code</h1>
<p>We sent a 6-digit code to <strong>{}</strong>.</p>
{}
<form method="post" action="/auth/verify-otp">
    <input type="hidden" name="email" value="{}">
    <input type="hidden" name="sent_at" value="{}">
    <label>Code <input name="otp" inputmode="numeric" maxlength="6" autocomplete="one-time-code"></label>
    <button type="submit">Verify</button>
</form>
{}
</section>"#,
        escape_html(email),
        error_list(errors),
        escape_html(email),
        sent_at,
        resend
    )
}

pub fn reset_password_form(reset_token: &str, errors: &[String]) -> String {
    format!(
        r#"<section class="auth-card">
<h1>Choose a new password</h1>
{}
<form method="post" action="/auth/reset-password">
    <input type="hidden" name="reset_token" value="{}">
    <label>New password <input type="password" name="password" autocomplete="new-password"></label>
    <label>Confirm password <input type="password" name="confirm_password" autocomplete="new-password"></label>
    <button type="submit">Reset password</button>
</form>
</section>"#,
        error_list(errors),
        escape_html(reset_token)
    )
}

/// Search and filter bar for the home page. The search box also drives the
/// debounced `/search` endpoint.
pub fn home_filters_form(filters: &HomeFilters) -> String {
    let type_options: String = PropertyType::all()
        .iter()
        .map(|t| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                t.as_str(),
                if filters.property_type == Some(*t) { " selected" } else { "" }
            )
        })
        .collect();
    let number = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();

    format!(
        r#"<form class="filters" method="get" action="/">
    <input type="search" name="search" placeholder="Search by title or location" value="{}" data-search-endpoint="/search" autocomplete="off">
    <select name="type"><option value="">Any type</option>{}</select>
    <input type="number" name="min_price" min="0" placeholder="Min price" value="{}">
    <input type="number" name="max_price" min="0" placeholder="Max price" value="{}">
    <button type="submit">Search</button>
    {}
</form>
<div id="search-results"></div>"#,
        escape_html(filters.search.as_deref().unwrap_or("")),
        type_options,
        number(filters.min_price),
        number(filters.max_price),
        if filters.is_active() { r#"<a href="/">Clear</a>"# } else { "" }
    )
}

fn media_editor(staging: &MediaStaging) -> String {
    let images: String = staging
        .images()
        .iter()
        .enumerate()
        .filter_map(|(position, image)| match image {
            EditableImage::Existing { image, deleted } => Some(format!(
                r#"<li class="media-item{}">
    <img src="{}" alt="">
    <label>Position <input type="number" min="1" max="{}" name="position_{}" value="{}"></label>
    <label><input type="checkbox" name="remove_image" value="{}"{}> Remove</label>
</li>"#,
                if *deleted { " removed" } else { "" },
                escape_html(&image.url),
                MAX_IMAGES,
                escape_html(&image.id),
                position + 1,
                escape_html(&image.id),
                if *deleted { " checked" } else { "" }
            )),
            // Pending uploads cannot survive a re-render; the browser must
            // attach them again.
            EditableImage::New { .. } => None,
        })
        .collect();

    let video = match staging.video() {
        EditableVideo::Existing { video, deleted } => format!(
            r#"<div class="media-video"><video controls preload="metadata" src="{}"></video>
<label><input type="checkbox" name="remove_video" value="true"{}> Remove video</label></div>"#,
            escape_html(&video.url),
            if *deleted { " checked" } else { "" }
        ),
        _ => String::new(),
    };

    format!(
        r#"<fieldset class="media">
    <legend>Photos and video</legend>
    <ul class="media-list">{}</ul>
    <label>Add photos (up to {} in total) <input type="file" name="images" accept="image/*" multiple></label>
    {}
    <label>Video tour <input type="file" name="video" accept="video/*"></label>
</fieldset>"#,
        images, MAX_IMAGES, video
    )
}

/// Create/edit property form, posted as multipart.
pub fn property_form(
    action: &str,
    heading: &str,
    input_values: &PropertyFormInput,
    staging: &MediaStaging,
    errors: &[String],
) -> String {
    let type_options: String = PropertyType::all()
        .iter()
        .map(|t| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                t.as_str(),
                if input_values.property_type == t.as_str() { " selected" } else { "" }
            )
        })
        .collect();

    format!(
        r#"<section class="property-form">
<h2>{heading}</h2>
{errors}
<form method="post" action="{action}" enctype="multipart/form-data">
    {title}
    <label>Description <textarea name="description" rows="5">{description}</textarea></label>
    {location}
    <label>Type <select name="type">{type_options}</select></label>
    {amount}
    {currency}
    {duration}
    {beds}
    {baths}
    {features}
    <label><input type="checkbox" name="is_available" value="true"{available}> Available for booking</label>
    {media}
    <button type="submit">Save property</button>
    <a href="/dashboard/properties">Cancel</a>
</form>
</section>"#,
        heading = escape_html(heading),
        errors = error_list(errors),
        action = escape_html(action),
        title = input("Title", "title", "text", &input_values.title),
        description = escape_html(&input_values.description),
        location = input("Location", "location", "text", &input_values.location),
        type_options = type_options,
        amount = input("Price", "amount", "number", &input_values.amount),
        currency = input("Currency", "currency", "text", &input_values.currency),
        duration = input("Per", "duration", "text", &input_values.duration),
        beds = input("Beds", "beds", "number", &input_values.beds),
        baths = input("Baths", "baths", "number", &input_values.baths),
        features = input("Features (comma separated)", "features", "text", &input_values.features),
        available = if input_values.is_available { " checked" } else { "" },
        media = media_editor(staging),
    )
}

pub fn credits_form(balance: u32, credits: &str, errors: &[String]) -> String {
    format!(
        r#"<section class="credits">
<p>You have <strong>{}</strong> credit(s). One credit lists one property.</p>
{}
<form method="post" action="/dashboard/credits">
    <label>Credits to buy <input type="number" name="credits" min="1" max="{}" value="{}"></label>
    <button type="submit">Continue to payment</button>
</form>
</section>"#,
        balance,
        error_list(errors),
        MAX_CREDITS_PER_PURCHASE,
        escape_html(credits)
    )
}

pub fn profile_form(profile: &UserProfile, name: &str, phone_number: &str, errors: &[String]) -> String {
    format!(
        r#"<section class="profile">
<p>Signed in as <strong>{}</strong></p>
{}
<form method="post" action="/dashboard/profile">
    {}
    {}
    <button type="submit">Save changes</button>
</form>
</section>"#,
        escape_html(&profile.email),
        error_list(errors),
        input("Full name", "name", "text", name),
        input("Phone number", "phone_number", "tel", phone_number),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::PropertyImage;
    use crate::views::ui_state::FilterAction;

    #[test]
    fn test_sign_in_form_targets_kind() {
        let html = sign_in_form(SessionKind::Admin, "a@b.co", Some("/admin/bookings"), &[]);
        assert!(html.contains(r#"action="/auth/admin/sign-in""#));
        assert!(html.contains(r#"name="redirect" value="/admin/bookings""#));
        assert!(!html.contains("forgot-password"));

        let html = sign_in_form(SessionKind::User, "", None, &["Invalid credentials".to_string()]);
        assert!(html.contains(r#"action="/auth/sign-in""#));
        assert!(html.contains("Invalid credentials"));
        assert!(!html.contains(r#"name="redirect""#));
    }

    #[test]
    fn test_otp_form_countdown() {
        let now = 1_700_000_000;
        let waiting = verify_otp_form("a@b.co", now - 10, OtpCountdown::new(Some(now - 10), now), &[]);
        assert!(waiting.contains("Resend code in 0:50"));
        assert!(waiting.contains(r#"name="sent_at" value="1699999990""#));

        let ready = verify_otp_form("a@b.co", now - 90, OtpCountdown::new(Some(now - 90), now), &[]);
        assert!(ready.contains("Resend code</button>"));
    }

    #[test]
    fn test_property_form_media_editor() {
        let staging = MediaStaging::from_existing(
            &[PropertyImage {
                id: "img-1".to_string(),
                url: "https://cdn.example/1.jpg".to_string(),
                placeholder: None,
            }],
            None,
        );
        let html = property_form(
            "/dashboard/properties/p1/edit",
            "Edit property",
            &PropertyFormInput::blank(),
            &staging,
            &[],
        );
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="position_img-1" value="1""#));
        assert!(html.contains(r#"name="remove_image" value="img-1""#));
        assert!(html.contains(r#"<option value="Short-let" selected>"#));
        assert!(html.contains(r#"name="is_available" value="true" checked"#));
    }

    #[test]
    fn test_home_filters_form_keeps_values() {
        let filters = HomeFilters::default()
            .reduce(FilterAction::SetSearch("yaba".to_string()))
            .reduce(FilterAction::SetType(Some(PropertyType::LongStay)));
        let html = home_filters_form(&filters);
        assert!(html.contains(r#"value="yaba""#));
        assert!(html.contains(r#"<option value="Long-stay" selected>"#));
        assert!(html.contains(r#"<a href="/">Clear</a>"#));
    }
}
