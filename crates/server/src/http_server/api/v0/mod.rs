//! Version 0 of the REST API.

pub mod documents;
pub mod ingredient_types;
pub mod people;
pub mod recipes;

use axum::Router;
use document_store::StoreError;
use http::StatusCode;

use crate::state::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/documents", documents::router(state.clone()))
        .nest("/people", people::router(state.clone()))
        .nest("/ingredient-types", ingredient_types::router(state.clone()))
        .nest("/recipes", recipes::router(state))
}

/// Shared status mapping for document store failures.
pub(crate) fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict => StatusCode::CONFLICT,
        StoreError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
        StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
