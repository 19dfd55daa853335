//! Business logic invoked by the handlers.

pub mod auth;
