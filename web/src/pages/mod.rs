//! Server-rendered pages, grouped by area.
//!
//! The public site, the user dashboard and the admin area each have their own
//! handlers and router. Authentication pages live in `auth`.

pub mod admin;
pub mod assets;
pub mod common;
pub mod dashboard;
pub mod public;
pub mod ui;
