//! Handlers for the user dashboard.
//!
//! Every handler runs behind the route guard, which has already attached the
//! verified user `Session`. Mutations redirect back to the list they change so
//! the page is re-fetched with a notice.

use super::models::{CreditsForm, ProfileForm, PropertiesQuery, PropertyFormInput, PropertyUpload};
use crate::auth::models::form_errors;
use crate::auth::session::{Session, SessionKind};
use crate::backend::models::{CreditPaymentPayload, PageQuery, PropertyQuery, UpdateProfilePayload};
use crate::pages::common::{
    ListQuery, dashboard_layout, load_failed, mutation_failed, redirect_with_notice, sign_in_again,
};
use crate::services::media_staging::MediaStaging;
use crate::state::AppState;
use crate::utils::{format_money, strip_query_param};
use crate::views::components::{bookings_table, properties_table, transactions_table};
use crate::views::forms::{credits_form, profile_form, property_form};
use crate::views::icons::Icon;
use crate::views::pagination::render_pagination;
use crate::views::{Flash, FlashQuery, Page, empty_state, error_list, stat_card};
use axum::{
    extract::{Extension, Form, Multipart, Path, Query},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use futures::future::try_join;
use tracing::{info, warn};

const PROPERTIES_PATH: &str = "/dashboard/properties";
const LIST_LIMIT: u32 = 10;
const RECENT_LIMIT: u32 = 5;

/// Overview: account statistics and the latest bookings, loaded together.
#[axum::debug_handler]
pub async fn summary(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(notice): Query<FlashQuery>,
) -> Response {
    let page = Page::new("Dashboard", dashboard_layout(&session, &headers), "/dashboard")
        .flash(notice.flash());
    let recent = PageQuery {
        page: 1,
        limit: RECENT_LIMIT,
    };

    let loaded = try_join(
        state.backend.dashboard_summary(&session.token),
        state.backend.list_bookings(&session.token, &recent),
    )
    .await;

    match loaded {
        Ok((summary, bookings)) => {
            let body = format!(
                r#"<section class="stats">{}{}{}{}{}</section>
<h2>Recent bookings</h2>{}"#,
                stat_card("Credits", &summary.credits.to_string(), Icon::Coins),
                stat_card("Properties", &summary.total_properties.to_string(), Icon::Building),
                stat_card("Active listings", &summary.active_listings.to_string(), Icon::Home),
                stat_card("Bookings", &summary.total_bookings.to_string(), Icon::Calendar),
                stat_card("Total spent", &format_money("NGN", summary.total_spent), Icon::Receipt),
                bookings_table(&bookings.data, None)
            );
            page.body(body).render().into_response()
        }
        Err(e) => load_failed(e, SessionKind::User, "/dashboard", page),
    }
}

/// The user's listings. `?add-property=true` opens the create form once; the
/// flag is dropped from the address bar and from pagination links.
#[axum::debug_handler]
pub async fn properties(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<PropertiesQuery>,
) -> Response {
    let notice = FlashQuery {
        notice: query.notice.clone(),
        level: query.level.clone(),
    };
    let requested = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(PROPERTIES_PATH);
    let list_url = strip_query_param(requested, "add-property");
    let mut page = Page::new("My properties", dashboard_layout(&session, &headers), PROPERTIES_PATH)
        .flash(notice.flash());
    if query.wants_create_form() {
        page = page.replace_url(list_url.clone());
    }

    let property_query = PropertyQuery {
        page: query.page.unwrap_or(1).max(1),
        limit: LIST_LIMIT,
        ..Default::default()
    };
    let listings = match state
        .backend
        .my_properties(&session.token, &property_query)
        .await
    {
        Ok(listings) => listings,
        Err(e) => return load_failed(e, SessionKind::User, PROPERTIES_PATH, page),
    };

    let create = if query.wants_create_form() {
        property_form(
            PROPERTIES_PATH,
            "Add a property",
            &PropertyFormInput::blank(),
            &MediaStaging::empty(),
            &[],
        )
    } else {
        format!(
            r#"<a class="button" href="{}?add-property=true">Add property</a>"#,
            PROPERTIES_PATH
        )
    };

    let body = format!(
        "{}{}{}",
        create,
        properties_table(&listings.data, true),
        render_pagination(&listings.meta, &list_url)
    );
    page.body(body).render().into_response()
}

fn form_page(
    session: &Session,
    headers: &HeaderMap,
    heading: &str,
    action: &str,
    input: &PropertyFormInput,
    staging: &MediaStaging,
    errors: &[String],
) -> Response {
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let page = Page::new(heading, dashboard_layout(session, headers), PROPERTIES_PATH)
        .body(property_form(action, heading, input, staging, errors));
    (status, page.render()).into_response()
}

#[axum::debug_handler]
pub async fn create_property(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let upload = match PropertyUpload::from_multipart(multipart).await {
        Ok(upload) => upload,
        Err(e) => return mutation_failed(e, SessionKind::User, PROPERTIES_PATH),
    };

    let submission = match upload.into_submission(MediaStaging::empty()) {
        Ok(submission) => submission,
        Err((input, errors)) => {
            return form_page(
                &session,
                &headers,
                "Add a property",
                PROPERTIES_PATH,
                &input,
                &MediaStaging::empty(),
                &errors,
            );
        }
    };

    let title = submission.fields.title.clone();
    match state.backend.create_property(&session.token, submission).await {
        Ok(message) => {
            info!("User {} created property {:?}", session.claims.sub, title);
            redirect_with_notice(PROPERTIES_PATH, Flash::success(message))
        }
        Err(e) if e.is_unauthorized() => sign_in_again(SessionKind::User, PROPERTIES_PATH),
        Err(e) => {
            warn!("Creating property {:?} failed: {}", title, e);
            redirect_with_notice(
                &format!("{}?add-property=true", PROPERTIES_PATH),
                Flash::error(e.user_messages().join(" ")),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn edit_property(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let action = format!("{}/{}/edit", PROPERTIES_PATH, id);
    match state.backend.get_property(&id, Some(&session.token)).await {
        Ok(property) => form_page(
            &session,
            &headers,
            "Edit property",
            &action,
            &PropertyFormInput::from_property(&property),
            &MediaStaging::from_existing(&property.images, property.video.as_ref()),
            &[],
        ),
        Err(e) => load_failed(
            e,
            SessionKind::User,
            &action,
            Page::new("Edit property", dashboard_layout(&session, &headers), PROPERTIES_PATH),
        ),
    }
}

/// Saves an edit. Only new files are uploaded; removed and reordered images
/// are sent as id lists against the property as currently stored.
#[axum::debug_handler]
pub async fn update_property(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let action = format!("{}/{}/edit", PROPERTIES_PATH, id);

    let upload = match PropertyUpload::from_multipart(multipart).await {
        Ok(upload) => upload,
        Err(e) => return mutation_failed(e, SessionKind::User, &action),
    };
    let property = match state.backend.get_property(&id, Some(&session.token)).await {
        Ok(property) => property,
        Err(e) => return mutation_failed(e, SessionKind::User, PROPERTIES_PATH),
    };
    let staging = || MediaStaging::from_existing(&property.images, property.video.as_ref());

    let submission = match upload.into_submission(staging()) {
        Ok(submission) => submission,
        Err((input, errors)) => {
            return form_page(
                &session,
                &headers,
                "Edit property",
                &action,
                &input,
                &staging(),
                &errors,
            );
        }
    };

    match state
        .backend
        .update_property(&session.token, &id, submission)
        .await
    {
        Ok(message) => {
            info!("User {} updated property {}", session.claims.sub, id);
            redirect_with_notice(PROPERTIES_PATH, Flash::success(message))
        }
        Err(e) => mutation_failed(e, SessionKind::User, &action),
    }
}

#[axum::debug_handler]
pub async fn delete_property(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Response {
    match state.backend.delete_property(&session.token, &id).await {
        Ok(message) => {
            info!("User {} deleted property {}", session.claims.sub, id);
            redirect_with_notice(PROPERTIES_PATH, Flash::success(message))
        }
        Err(e) => mutation_failed(e, SessionKind::User, PROPERTIES_PATH),
    }
}

/// Bookings made on the user's properties.
#[axum::debug_handler]
pub async fn bookings(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(list): Query<ListQuery>,
) -> Response {
    let path = "/dashboard/bookings";
    let page = Page::new("Bookings", dashboard_layout(&session, &headers), path);

    match state
        .backend
        .list_bookings(&session.token, &list.to_page_query(LIST_LIMIT))
        .await
    {
        Ok(bookings) => page
            .body(format!(
                "{}{}",
                bookings_table(&bookings.data, None),
                render_pagination(&bookings.meta, path)
            ))
            .render()
            .into_response(),
        Err(e) => load_failed(e, SessionKind::User, path, page),
    }
}

#[axum::debug_handler]
pub async fn transactions(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(list): Query<ListQuery>,
) -> Response {
    let path = "/dashboard/transactions";
    let page = Page::new("Transactions", dashboard_layout(&session, &headers), path);

    match state
        .backend
        .list_transactions(&session.token, &list.to_page_query(LIST_LIMIT))
        .await
    {
        Ok(transactions) => page
            .body(format!(
                "{}{}",
                transactions_table(&transactions.data),
                render_pagination(&transactions.meta, path)
            ))
            .render()
            .into_response(),
        Err(e) => load_failed(e, SessionKind::User, path, page),
    }
}

#[axum::debug_handler]
pub async fn credits(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(notice): Query<FlashQuery>,
) -> Response {
    let path = "/dashboard/credits";
    let page = Page::new("Buy credits", dashboard_layout(&session, &headers), path)
        .flash(notice.flash());

    match state.backend.profile(&session.token).await {
        Ok(profile) => page
            .body(credits_form(profile.credits, "1", &[]))
            .render()
            .into_response(),
        Err(e) => load_failed(e, SessionKind::User, path, page),
    }
}

/// Starts a credit purchase and hands the browser to the payment gateway.
#[axum::debug_handler]
pub async fn buy_credits(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Form(form): Form<CreditsForm>,
) -> Response {
    let path = "/dashboard/credits";
    let credits = match form.credits() {
        Ok(credits) => credits,
        Err(errors) => {
            let page = Page::new("Buy credits", dashboard_layout(&session, &headers), path)
                .body(format!("{}{}", error_list(&errors), empty_state("No payment was started.")));
            return (StatusCode::UNPROCESSABLE_ENTITY, page.render()).into_response();
        }
    };

    let payload = CreditPaymentPayload {
        credits,
        callback_url: state.config.payment_callback_url(),
    };
    match state
        .backend
        .initialize_credit_payment(&session.token, &payload)
        .await
    {
        Ok(initialized) => {
            info!(
                "User {} started purchase of {} credit(s), reference {:?}",
                session.claims.sub, credits, initialized.reference
            );
            Redirect::to(&initialized.authorization_url).into_response()
        }
        Err(e) => mutation_failed(e, SessionKind::User, path),
    }
}

#[axum::debug_handler]
pub async fn profile(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(notice): Query<FlashQuery>,
) -> Response {
    let path = "/dashboard/profile";
    let page = Page::new("Profile", dashboard_layout(&session, &headers), path).flash(notice.flash());

    match state.backend.profile(&session.token).await {
        Ok(profile) => {
            let phone = profile.phone_number.clone().unwrap_or_default();
            page.body(profile_form(&profile, &profile.name, &phone, &[]))
                .render()
                .into_response()
        }
        Err(e) => load_failed(e, SessionKind::User, path, page),
    }
}

#[axum::debug_handler]
pub async fn update_profile(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Response {
    let path = "/dashboard/profile";

    let errors = form_errors(&form);
    if !errors.is_empty() {
        let page = Page::new("Profile", dashboard_layout(&session, &headers), path);
        return match state.backend.profile(&session.token).await {
            Ok(profile) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                page.body(profile_form(&profile, &form.name, &form.phone_number, &errors))
                    .render(),
            )
                .into_response(),
            Err(e) => load_failed(e, SessionKind::User, path, page),
        };
    }

    let payload = UpdateProfilePayload {
        name: form.name.trim().to_string(),
        phone_number: form.phone_number.trim().to_string(),
    };
    match state.backend.update_profile(&session.token, &payload).await {
        Ok(message) => redirect_with_notice(path, Flash::success(message)),
        Err(e) => mutation_failed(e, SessionKind::User, path),
    }
}

/// Notifications are not served by the backend yet.
#[axum::debug_handler]
pub async fn notifications(Extension(session): Extension<Session>, headers: HeaderMap) -> Response {
    Page::new(
        "Notifications",
        dashboard_layout(&session, &headers),
        "/dashboard/notifications",
    )
    .body(empty_state("You have no notifications."))
    .render()
    .into_response()
}
