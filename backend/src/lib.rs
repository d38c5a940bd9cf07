//! # Person Service
//!
//! Record-management service for a single `Person` entity, exposed over HTTP.
//!
//! Every request flows through three layers:
//!
//! - [`http`]: Axum handlers that decode and validate payloads and map
//!   outcomes to status codes
//! - [`services`]: the logic layer, which bounds each call with a deadline and
//!   checks existence before deleting
//! - [`db`]: the repository trait, its error taxonomy and the SQLite and
//!   in-memory implementations
//!
//! A [`context::Context`] carrying the deadline and cancellation signal is
//! threaded explicitly through all three.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod context;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
