//! Admin area: platform overview and moderation of properties and bookings.

pub mod handlers;
pub mod routes;
