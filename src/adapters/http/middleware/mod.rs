//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `internal_auth` - Shared-key bearer authentication for client applications

pub mod internal_auth;

pub use internal_auth::{require_internal_key, InternalAuthState};
