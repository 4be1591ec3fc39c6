//! Shared HTTP transport: one bounded request, status and body captured

use instapost_domain::normalize;
use instapost_domain::{Failure, PostError, Provider, TransportError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Timeout for provider API calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for media reachability checks
pub const MEDIA_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("instapost/", env!("CARGO_PKG_VERSION"));

/// Build the client every adapter uses
pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(error = %error, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Raw provider response
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Send a request, mapping network failures to [`TransportError`]
pub(crate) async fn send(provider: Provider, request: RequestBuilder) -> Result<HttpResponse, PostError> {
    let response = request.send().await.map_err(transport_error)?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(transport_error)?;

    tracing::debug!(provider = %provider, status, body_len = body.len(), "Provider responded");

    Ok(HttpResponse {
        status,
        content_type,
        body,
    })
}

/// Send and classify; 200 returns the parsed body alongside the raw text
///
/// Error statuses keep the body on the returned [`Failure`].
pub(crate) async fn call(
    provider: Provider,
    request: RequestBuilder,
) -> Result<(Value, String), Failure> {
    let response = send(provider, request).await?;
    match normalize::classify(provider, response.status, &response.body) {
        Ok(value) => Ok((value, response.body)),
        Err(error) => Err(Failure::from(error).with_raw_response(response.body)),
    }
}

pub(crate) fn transport_error(error: reqwest::Error) -> PostError {
    let transport = if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    };
    tracing::warn!(error = %error, "Transport failure");
    PostError::Transport(transport)
}
