//! Authentication for the two session kinds.
//!
//! Users and admins sign in against the backend; the issued token is kept in
//! an HTTP-only cookie per kind and checked by the route guard on every
//! protected request.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod routes;
pub mod session;
