//! Backend API client for the `authenticate` and `profile` endpoints.
//!
//! DESIGN
//! ======
//! The client holds no authorization state. Callers pass the header value per
//! request; the session owns the single "default header" and decides when it
//! is attached. Pure parsing lives in `parse_json` for testability.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx statuses and undecodable bodies each map to a
//! distinct [`ApiError`] variant so the session can tell an expired token
//! (401/403) apart from an unreachable backend.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;

use crate::config::Timeouts;
use crate::types::{AuthResponse, AuthenticateRequest, User};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The backend returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Whether the backend rejected the credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// Format a token as an `Authorization` header value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// =============================================================================
// API CLIENT TRAIT
// =============================================================================

/// Backend calls the session depends on. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Exchange an OAuth code for a session token and user (`POST authenticate`).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails, the backend rejects the
    /// code, or the response is malformed.
    async fn authenticate(&self, code: &str) -> Result<AuthResponse, ApiError>;

    /// Fetch the current user's profile (`GET profile`).
    ///
    /// `authorization` is the full header value, e.g. `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails, the token is rejected,
    /// or the response is malformed.
    async fn profile(&self, authorization: &str) -> Result<User, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    /// Build a client against `base_url` (trailing `/` is ignored).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the reqwest client fails to build.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a prepared request and decode a JSON body from a 2xx response.
    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }

        parse_json(&text)
    }

    /// `GET {base}/{path}` with an optional authorization header.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or a body
    /// that does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, authorization: Option<&str>) -> Result<T, ApiError> {
        let mut request = self.http.get(self.endpoint(path));
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        self.send_json(request).await
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpApiClient {
    async fn authenticate(&self, code: &str) -> Result<AuthResponse, ApiError> {
        let body = AuthenticateRequest { code: code.to_owned() };
        let request = self.http.post(self.endpoint("authenticate")).json(&body);
        self.send_json(request).await
    }

    async fn profile(&self, authorization: &str) -> Result<User, ApiError> {
        self.get_json("profile", Some(authorization)).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}
