//! Shared plumbing for the Supabase-style HTTP adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};

use crate::error::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum EndpointError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Base URL plus credentials for one Supabase project (or compatible gateway).
pub struct HttpEndpoint {
    base_url: Url,
    api_key: SecretString,
    client: Client,
}

impl HttpEndpoint {
    /// Builds an endpoint whose client enforces `timeout` on every request.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, EndpointError> {
        let invalid = |reason: String| EndpointError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let mut base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("cannot be used as a base".to_string()));
        }
        // Url::join and path_segments_mut both want a trailing-slash-free path
        let trimmed = base_url.path().trim_end_matches('/').to_string();
        base_url.set_path(&trimmed);

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn url<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Adds the `apikey` and bearer headers used by Supabase gateways.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }
}

/// Maps a non-success HTTP status from the storage API onto `StoreError`.
pub fn classify_status(status: StatusCode, key: &str, body: &str) -> StoreError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(key.to_string()),
        StatusCode::UNAUTHORIZED => StoreError::InvalidCredentials(detail),
        StatusCode::FORBIDDEN => StoreError::AccessDenied {
            key: key.to_string(),
            detail,
        },
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => StoreError::BackendUnavailable(detail),
        s if s.is_server_error() => StoreError::BackendUnavailable(detail),
        _ => StoreError::Other(detail),
    }
}

/// Maps a transport-level reqwest failure onto `StoreError`.
pub fn classify_transport(err: &reqwest::Error) -> StoreError {
    if err.is_timeout() || err.is_connect() {
        StoreError::BackendUnavailable(err.to_string())
    } else {
        StoreError::Other(err.to_string())
    }
}
