//! HTTP Basic authentication middleware.
//!
//! Swaps the `Authorization` header for a [`Requester`] request extension:
//! credentials are decoded, the person is looked up by email and the
//! SHA-256 password hash compared. Requests that already carry a requester
//! header are rejected outright, that header is ours to set.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use http::header::{HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use http::StatusCode;
use tracing::debug;

use crate::database::models::Group;
use crate::state::ServiceState;

/// Header a trusted upstream might try to inject; never accepted from
/// clients.
pub const REQUESTER_IDENTITY_HEADER: &str = "x-requester-identity";

/// The authenticated caller, available to handlers as an extension.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub id: i64,
    pub group: Group,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.group == Group::Admin
    }
}

pub async fn require_basic_auth(
    State(state): State<ServiceState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.headers().contains_key(REQUESTER_IDENTITY_HEADER) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match authenticate(&state, authorization.as_deref()).await {
        Ok(requester) => {
            request.extensions_mut().insert(requester);
            next.run(request).await
        }
        Err(response) => response,
    }
}

async fn authenticate(
    state: &ServiceState,
    authorization: Option<&str>,
) -> Result<Requester, Response> {
    let Some(encoded) = authorization.and_then(|value| value.strip_prefix("Basic ")) else {
        return Err(challenge());
    };
    let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
        return Err(challenge());
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return Err(challenge());
    };
    let Some((email, password)) = credentials.split_once(':') else {
        return Err(challenge());
    };

    let person = state
        .database()
        .find_person_by_email(email)
        .await
        .map_err(|error| {
            tracing::error!(%error, "person lookup failed during authentication");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    match person {
        Some(person) if person.password_hash == document_store::sha256_hex(password.as_bytes()) => {
            Ok(Requester {
                id: person.base.id,
                group: person.group,
            })
        }
        _ => {
            debug!(email, "basic authentication rejected");
            Err(challenge())
        }
    }
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"))],
    )
        .into_response()
}
