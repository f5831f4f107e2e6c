//! Membership Bridge - Stripe subscriptions to membership status
//!
//! Receives Stripe webhook callbacks, keeps one membership record per user in
//! a JSON file, and answers "is this user entitled right now" for internal
//! client applications. Also starts Stripe subscription checkouts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
