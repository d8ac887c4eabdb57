//! Handlers for the public pages: listings, property details, the booking
//! wizard and the payment gateway callback.

use super::models::{BookingWizardInput, SearchClient, VerifyQuery};
use crate::auth::session::{Session, SessionKind};
use crate::backend::models::{Property, TransactionStatus};
use crate::pages::common::{load_failed, status_for};
use crate::services::booking_flow::{BookingFlow, BookingOutcome, SubmitContext};
use crate::services::search_debouncer::SearchOutcome;
use crate::state::AppState;
use crate::utils::local_url;
use crate::views::components::{booking_wizard, payment_status, property_detail, property_grid};
use crate::views::forms::home_filters_form;
use crate::views::pagination::render_pagination;
use crate::views::ui_state::{HomeFilters, HomeQuery};
use crate::views::{Flash, FlashQuery, Layout, Page, empty_state, error_list};
use axum::{
    extract::{Extension, Form, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{debug, info, warn};

fn public_layout(session: &Option<Session>) -> Layout {
    Layout::Public {
        signed_in: session.is_some(),
    }
}

/// Property listings with search filters and pagination.
#[axum::debug_handler]
pub async fn home(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Option<Session>>,
    Query(query): Query<HomeQuery>,
    Query(notice): Query<FlashQuery>,
) -> Response {
    let filters = HomeFilters::from_query(&query);
    let page = Page::new("Find a home", public_layout(&session), "/").flash(notice.flash());

    let listings = match state
        .backend
        .list_properties(&filters.to_property_query(), None)
        .await
    {
        Ok(listings) => listings,
        Err(e) => {
            warn!("Failed to load listings: {}", e);
            let messages = e.user_messages();
            return (
                status_for(&e),
                page.body(home_filters_form(&filters))
                    .flash(messages.into_iter().next().map(Flash::error))
                    .render(),
            )
                .into_response();
        }
    };

    let empty_message = if filters.is_active() {
        "No properties match your search."
    } else {
        "No properties have been listed yet."
    };
    let body = format!(
        "{}{}{}",
        home_filters_form(&filters),
        property_grid(&listings.data, empty_message),
        render_pagination(&listings.meta, &filters.to_url("/"))
    );

    page.body(body).render().into_response()
}

/// Debounced search-as-you-type. Returns the results fragment, or
/// `204 No Content` when a newer keystroke from the same client took over.
#[axum::debug_handler]
pub async fn search(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Option<Session>>,
    headers: HeaderMap,
    Query(query): Query<HomeQuery>,
    Query(client): Query<SearchClient>,
) -> Response {
    let filters = HomeFilters::from_query(&query);
    let key = client.key(session.as_ref(), &headers);

    match state
        .search
        .search(&key, filters.to_property_query(), &state.backend)
        .await
    {
        SearchOutcome::Superseded => StatusCode::NO_CONTENT.into_response(),
        SearchOutcome::Results(Ok(listings)) => {
            debug!(
                "Search {:?} for {} returned {} properties",
                filters.search,
                key,
                listings.data.len()
            );
            Html(format!(
                "{}{}",
                property_grid(&listings.data, "No properties match your search."),
                render_pagination(&listings.meta, &filters.to_url("/"))
            ))
            .into_response()
        }
        SearchOutcome::Results(Err(e)) => {
            warn!("Search for {} failed: {}", key, e);
            (status_for(&e), Html(error_list(&e.user_messages()))).into_response()
        }
    }
}

fn detail_page(
    session: &Option<Session>,
    flow: &BookingFlow,
    property: &Property,
) -> Page {
    let path = format!("/properties/{}", property.id);
    let body = format!(
        "{}{}",
        property_detail(property),
        booking_wizard(flow, property, &format!("{}/book", path))
    );
    Page::new(property.title.clone(), public_layout(session), path).body(body)
}

#[axum::debug_handler]
pub async fn property(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Option<Session>>,
    Path(id): Path<String>,
) -> Response {
    let path = format!("/properties/{}", id);
    let token = session.as_ref().map(|s| s.token.as_str());

    match state.backend.get_property(&id, token).await {
        Ok(property) => detail_page(&session, &BookingFlow::new(&property.id), &property)
            .render()
            .into_response(),
        Err(e) => load_failed(
            e,
            SessionKind::User,
            &path,
            Page::new("Property", public_layout(&session), path.clone()),
        ),
    }
}

/// A plain GET of the wizard URL lands on the wizard section of the page.
pub async fn book_redirect(Path(id): Path<String>) -> Redirect {
    Redirect::to(&format!("{}#book", local_url(&format!("/properties/{}", id), &[])))
}

/// Advances the booking wizard. A valid submission on the `Pay` step sends
/// the visitor to the payment gateway.
#[axum::debug_handler]
pub async fn book(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Option<Session>>,
    Path(id): Path<String>,
    Form(input): Form<BookingWizardInput>,
) -> Response {
    let path = format!("/properties/{}", id);
    let token = session.as_ref().map(|s| s.token.as_str());

    let Some(action) = input.action() else {
        return (StatusCode::BAD_REQUEST, "Unknown booking action").into_response();
    };

    let flow = BookingFlow::resume(&id, input.step, input.form());
    let callback_url = state.config.payment_callback_url();
    let ctx = SubmitContext {
        gateway: &state.backend,
        token,
        callback_url: &callback_url,
        today: Utc::now().date_naive(),
    };

    match flow.dispatch(action, ctx).await {
        BookingOutcome::Redirect(authorization_url) => {
            info!("Redirecting booking for property {} to payment gateway", id);
            Redirect::to(&authorization_url).into_response()
        }
        BookingOutcome::Render(flow) => match state.backend.get_property(&id, token).await {
            Ok(property) => {
                let status = if flow.errors.is_empty() {
                    StatusCode::OK
                } else {
                    StatusCode::UNPROCESSABLE_ENTITY
                };
                (status, detail_page(&session, &flow, &property).render()).into_response()
            }
            Err(e) => load_failed(
                e,
                SessionKind::User,
                &path,
                Page::new("Property", public_layout(&session), path.clone()),
            ),
        },
    }
}

/// Payment gateway callback. Pending payments reload until they settle.
#[axum::debug_handler]
pub async fn verify_payment(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Option<Session>>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let page = Page::new("Payment", public_layout(&session), "/payments/verify");

    let Some(reference) = query.reference() else {
        return (
            StatusCode::BAD_REQUEST,
            page.flash(Some(Flash::error("Missing payment reference")))
                .body(empty_state("No payment to verify."))
                .render(),
        )
            .into_response();
    };

    match state.backend.verify_payment(reference).await {
        Ok(verification) => {
            info!(
                "Payment {} verified as {}",
                verification.reference,
                verification.status.as_str()
            );
            let page = page.body(payment_status(&verification));
            let page = if verification.status == TransactionStatus::Pending {
                page.refresh_every(state.config.payment_refresh_seconds)
            } else {
                page
            };
            page.render().into_response()
        }
        Err(e) => load_failed(e, SessionKind::User, "/payments/verify", page),
    }
}
