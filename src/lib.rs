//! Session-based authentication service: registration, login sessions
//! keyed by an opaque cookie, one-time password reset tokens, and
//! path-based exemption from authentication.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
