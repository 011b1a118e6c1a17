//! REST API: versioned handler tree plus the typed client.

pub mod client;
pub mod v0;

pub use client::{ApiClient, ApiError, ApiRequest};
