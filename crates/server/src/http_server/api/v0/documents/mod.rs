//! Document endpoints: content-addressed upload, negotiated fetch, query.

use axum::routing::{get, post};
use axum::Router;

use crate::state::ServiceState;

mod create;
mod get_document;
mod list;

// Re-export request/response types for clients
pub use get_document::GetDocumentRequest;
pub use list::ListDocumentsRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler).get(list::handler))
        .route("/:id", get(get_document::handler))
        .with_state(state)
}
