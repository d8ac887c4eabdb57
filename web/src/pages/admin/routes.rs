//! Routes for the admin area. The route guard in `auth::middleware` protects
//! everything under `/admin` and requires the admin claim.

use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

pub fn admin_router() -> Router {
    Router::new()
        .route("/admin", get(overview))
        .route("/admin/properties", get(properties))
        .route("/admin/bookings", get(bookings))
        .route("/admin/bookings/{id}/confirm", post(confirm_booking))
        .route("/admin/bookings/{id}/cancel", post(cancel_booking))
        .route("/admin/transactions", get(transactions))
}
