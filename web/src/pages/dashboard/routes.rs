//! Routes for the user dashboard. The route guard in `auth::middleware`
//! protects everything under `/dashboard`.

use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

pub fn dashboard_router() -> Router {
    Router::new()
        .route("/dashboard", get(summary))
        .route(
            "/dashboard/properties",
            get(properties).post(create_property),
        )
        .route(
            "/dashboard/properties/{id}/edit",
            get(edit_property).post(update_property),
        )
        .route("/dashboard/properties/{id}/delete", post(delete_property))
        .route("/dashboard/bookings", get(bookings))
        .route("/dashboard/transactions", get(transactions))
        .route("/dashboard/credits", get(credits).post(buy_credits))
        .route("/dashboard/profile", get(profile).post(update_profile))
        .route("/dashboard/notifications", get(notifications))
}
