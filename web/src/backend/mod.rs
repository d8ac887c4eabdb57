//! Typed access to the EdgeHomes REST backend.

pub mod client;
pub mod models;
