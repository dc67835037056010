//! HTTP server
//!
//! This module contains the server startup, the routes it serves, and the
//! pages those routes render.

pub mod core;
pub mod pages;
pub mod routes;

pub use self::core::Server;
pub use routes::{AppState, router};
