//! Medialog - federated media search
//!
//! This library crate exposes the search pipeline and HTTP server for
//! integration testing.

pub mod config;
pub mod search;
pub mod server;
