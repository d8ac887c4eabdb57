//! The signed-in user's dashboard: summary, listings, bookings, payments and
//! account pages.

pub mod handlers;
pub mod models;
pub mod routes;
