//! HTTP boundary of the publications backend.
//!
//! Thin glue: identity extraction, pagination, routing and error-to-status
//! mapping. All consistency rules live in [`crate::publications`].

pub mod api;
pub mod app;
pub mod errors;
pub mod tracing;
