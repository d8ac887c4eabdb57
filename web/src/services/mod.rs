//! Frontend business logic that sits between the pages and the backend client.
//!
//! These services hold the stateful parts of the UI flows: the booking wizard,
//! staged property media edits and the per-client debounced search.

pub mod booking_flow;
pub mod media_staging;
pub mod search_debouncer;
