//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ports::{Failure, PostError};

/// Instagram caption limit shared by every provider
pub const CAPTION_MAX_CHARS: usize = 2200;

/// Instagram carousel limit
pub const MAX_MEDIA_URLS: usize = 10;

/// A third-party posting service wrapped by an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Ayrshare,
    Buffer,
    InstagramGraph,
    Late,
    Zapier,
}

impl Provider {
    /// Human-readable provider name
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ayrshare => "Ayrshare",
            Provider::Buffer => "Buffer",
            Provider::InstagramGraph => "Instagram Graph API",
            Provider::Late => "Late.io",
            Provider::Zapier => "Zapier webhook",
        }
    }

    /// The provider's documented request cap, quoted in rate-limit messages
    pub fn rate_limit_note(&self) -> &'static str {
        match self {
            Provider::Ayrshare => "Ayrshare caps API calls per plan",
            Provider::Buffer => "Buffer allows 10 requests per minute",
            Provider::InstagramGraph => {
                "Instagram Graph API allows 200 calls per hour per access token and 25 posts per day per account"
            }
            Provider::Late => "Late.io caps requests per plan",
            Provider::Zapier => "Zapier throttles webhook requests per zap",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Final state of an adapter invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Error,
}

/// Failure classes surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input, rejected before any network call
    Validation,
    /// HTTP 401
    Auth,
    /// HTTP 403
    Permission,
    /// HTTP 429
    RateLimit,
    /// HTTP 400
    Payload,
    /// HTTP 5xx
    Server,
    /// Timeout, connection failure or other network fault
    Transport,
    /// Profile or business-account lookup did not yield a usable account
    Account,
    /// Anything else, including success responses without an identifier
    Unexpected,
}

/// Error details attached to a failed [`PostResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    /// HTTP status returned by the provider, if the request got that far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Provider-supplied error text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Troubleshooting hint for the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Uniform result of posting through any provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResult {
    pub provider: Provider,
    pub outcome: Outcome,
    /// Human-readable summary
    pub message: String,
    /// Provider post, update or media identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    /// Link to the published post, when the provider exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub scheduled: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_for: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    /// Raw provider response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl PostResult {
    /// Create a successful result
    pub fn success(provider: Provider, message: impl Into<String>, post_id: Option<String>) -> Self {
        Self {
            provider,
            outcome: Outcome::Success,
            message: message.into(),
            post_id,
            url: None,
            scheduled: false,
            scheduled_for: None,
            error: None,
            raw_response: None,
        }
    }

    /// Convert a failure into a result; every adapter error ends up here
    pub fn from_error(provider: Provider, error: &PostError) -> Self {
        Self {
            provider,
            outcome: Outcome::Error,
            message: format!("{}: {}", provider.name(), error),
            post_id: None,
            url: None,
            scheduled: false,
            scheduled_for: None,
            error: Some(ErrorDetail {
                kind: error.kind(),
                status: error.status(),
                detail: error.detail(),
                suggestion: error.suggestion(provider),
            }),
            raw_response: None,
        }
    }

    /// Same as [`from_error`](Self::from_error), keeping the provider's body
    pub fn from_failure(provider: Provider, failure: Failure) -> Self {
        Self {
            raw_response: failure.raw_response,
            ..Self::from_error(provider, &failure.error)
        }
    }

    /// Mark the result as scheduled for the given instant
    pub fn scheduled_for(mut self, at: OffsetDateTime) -> Self {
        self.scheduled = true;
        self.scheduled_for = Some(at);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_raw_response(mut self, body: impl Into<String>) -> Self {
        self.raw_response = Some(body.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Error class, if the call failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
