//! Public listings, property pages, booking and payment verification.

pub mod handlers;
pub mod models;
pub mod routes;
