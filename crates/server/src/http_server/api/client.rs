//! Typed HTTP client for the REST API.
//!
//! Each endpoint module implements [`ApiRequest`] for its request type, so
//! integration tests and tooling drive a live server through the same DTOs
//! the handlers consume.

use base64::Engine;
use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// A request that knows how to address itself against a base URL.
pub trait ApiRequest {
    type Response;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),

    #[error("{0}")]
    Other(String),
}

/// Client bound to one server and one set of Basic credentials.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url, email: &str, password: &str) -> Result<Self, ApiError> {
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{email}:{password}"));
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {credentials}"))
                .map_err(|e| ApiError::Other(format!("invalid credentials: {e}")))?,
        );
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    /// Issue a typed request and decode the JSON response.
    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError>
    where
        T::Response: DeserializeOwned,
    {
        let response = request.build_request(&self.remote, &self.client).send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Upload a document; the response body is the plain-text id.
    pub async fn upload_document(
        &self,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<i64, ApiError> {
        let full_url = self.remote.join("/api/v0/documents").expect("static path");
        let response = self
            .client
            .post(full_url)
            .header(CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ));
        }

        let text = response.text().await?;
        text.trim()
            .parse()
            .map_err(|_| ApiError::Other(format!("expected a numeric id, got {text:?}")))
    }

    /// Fetch raw document content under a given Accept range.
    pub async fn document_content(
        &self,
        id: i64,
        accept: &str,
    ) -> Result<(String, Vec<u8>), ApiError> {
        let full_url = self
            .remote
            .join(&format!("/api/v0/documents/{id}"))
            .expect("static path");
        let response = self.client.get(full_url).header(ACCEPT, accept).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = response.bytes().await?.to_vec();
        Ok((content_type, content))
    }

    /// Get the base URL for API requests.
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests.
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
