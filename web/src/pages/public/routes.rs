//! Routes for the public site. These pages never require a session; the
//! optional user session is only used to personalise the header and to attach
//! the bearer token to booking payments.

use super::handlers::{book, book_redirect, home, property, search, verify_payment};
use axum::{Router, routing::get};

pub fn public_router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/search", get(search))
        .route("/properties/{id}", get(property))
        .route("/properties/{id}/book", get(book_redirect).post(book))
        .route("/payments/verify", get(verify_payment))
}
