//! Unauthenticated status endpoints.

pub mod liveness;
pub mod version;

use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::state::ServiceState;

/// Build metadata reported by the version endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
}

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(liveness::handler))
        .route("/version", get(version::handler))
}
