//! Handlers for the admin area. The route guard only lets sessions carrying
//! the admin claim through.

use crate::auth::session::{Session, SessionKind};
use crate::backend::models::PropertyQuery;
use crate::pages::common::{
    ListQuery, admin_layout, load_failed, mutation_failed, redirect_with_notice,
};
use crate::state::AppState;
use crate::utils::format_money;
use crate::views::components::{bookings_table, properties_table, transactions_table};
use crate::views::icons::Icon;
use crate::views::pagination::render_pagination;
use crate::views::{Flash, FlashQuery, Page, stat_card};
use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::info;

const BOOKINGS_PATH: &str = "/admin/bookings";
const LIST_LIMIT: u32 = 20;

#[axum::debug_handler]
pub async fn overview(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> Response {
    let page = Page::new("Overview", admin_layout(&session, &headers), "/admin");

    match state.backend.admin_overview(&session.token).await {
        Ok(overview) => page
            .body(format!(
                r#"<section class="stats">{}{}{}{}{}</section>"#,
                stat_card("Users", &overview.total_users.to_string(), Icon::User),
                stat_card("Properties", &overview.total_properties.to_string(), Icon::Building),
                stat_card("Bookings", &overview.total_bookings.to_string(), Icon::Calendar),
                stat_card("Pending bookings", &overview.pending_bookings.to_string(), Icon::Bell),
                stat_card("Revenue", &format_money("NGN", overview.total_revenue), Icon::Receipt),
            ))
            .render()
            .into_response(),
        Err(e) => load_failed(e, SessionKind::Admin, "/admin", page),
    }
}

#[axum::debug_handler]
pub async fn properties(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(list): Query<ListQuery>,
) -> Response {
    let path = "/admin/properties";
    let page = Page::new("Properties", admin_layout(&session, &headers), path);
    let query = PropertyQuery {
        page: list.page.unwrap_or(1).max(1),
        limit: LIST_LIMIT,
        ..Default::default()
    };

    match state
        .backend
        .list_properties(&query, Some(&session.token))
        .await
    {
        Ok(listings) => page
            .body(format!(
                "{}{}",
                properties_table(&listings.data, false),
                render_pagination(&listings.meta, path)
            ))
            .render()
            .into_response(),
        Err(e) => load_failed(e, SessionKind::Admin, path, page),
    }
}

/// All bookings; pending ones can be confirmed or cancelled.
#[axum::debug_handler]
pub async fn bookings(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(list): Query<ListQuery>,
    Query(notice): Query<FlashQuery>,
) -> Response {
    let page = Page::new("Bookings", admin_layout(&session, &headers), BOOKINGS_PATH)
        .flash(notice.flash());

    match state
        .backend
        .list_bookings(&session.token, &list.to_page_query(LIST_LIMIT))
        .await
    {
        Ok(bookings) => page
            .body(format!(
                "{}{}",
                bookings_table(&bookings.data, Some(BOOKINGS_PATH)),
                render_pagination(&bookings.meta, BOOKINGS_PATH)
            ))
            .render()
            .into_response(),
        Err(e) => load_failed(e, SessionKind::Admin, BOOKINGS_PATH, page),
    }
}

#[axum::debug_handler]
pub async fn confirm_booking(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Response {
    match state.backend.confirm_booking(&session.token, &id).await {
        Ok(_) => {
            info!("Admin {} confirmed booking {}", session.claims.sub, id);
            redirect_with_notice(BOOKINGS_PATH, Flash::success("Booking confirmed"))
        }
        Err(e) => mutation_failed(e, SessionKind::Admin, BOOKINGS_PATH),
    }
}

#[axum::debug_handler]
pub async fn cancel_booking(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Response {
    match state.backend.cancel_booking(&session.token, &id).await {
        Ok(_) => {
            info!("Admin {} cancelled booking {}", session.claims.sub, id);
            redirect_with_notice(BOOKINGS_PATH, Flash::success("Booking cancelled"))
        }
        Err(e) => mutation_failed(e, SessionKind::Admin, BOOKINGS_PATH),
    }
}

#[axum::debug_handler]
pub async fn transactions(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(list): Query<ListQuery>,
) -> Response {
    let path = "/admin/transactions";
    let page = Page::new("Transactions", admin_layout(&session, &headers), path);

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
        Err(e) => load_failed(e, SessionKind::Admin, path, page),
    }
}
