//! # hope_core
//!
//! Core domain logic for HOPE: credential checks, signed tokens and
//! webhook signature verification. No HTTP types live here.

pub mod auth;
pub mod config;
pub mod models;
pub mod webhook;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
