//! Port definitions (traits) for external dependencies
//!
//! Adapters implement [`PostingAdapter`] to connect a provider API to the
//! uniform request/result contract.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{ErrorKind, PostResult, Provider};

/// Input rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("caption is too long ({len} characters); the character limit is {max}")]
    CaptionTooLong { len: usize, max: usize },
    #[error("schedule_date '{value}' must be in YYYY-MM-DD format")]
    InvalidDate { value: String },
    #[error("schedule_time '{value}' must be in HH:MM format (24-hour)")]
    InvalidTime { value: String },
    #[error("{field} '{value}' is not a valid ISO-8601 datetime (e.g. 2024-12-25T10:00:00Z)")]
    InvalidInstant { field: &'static str, value: String },
    #[error("{field} has an invalid URL scheme: '{url}' must start with http:// or https://")]
    InvalidUrlScheme { field: &'static str, url: String },
    #[error("invalid {field} '{value}'; must be one of: {}", .allowed.join(", "))]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("too many media URLs ({count}); at most {max} are allowed per post")]
    TooManyMedia { count: usize, max: usize },
    #[error("scheduled time must be in the future (provided {value}, now {now})")]
    NotInFuture { value: String, now: String },
    #[error("cannot schedule posts more than {max_days} days in advance")]
    BeyondHorizon { max_days: u32 },
    #[error("both schedule_date and schedule_time are required for scheduling")]
    PartialSchedule,
    #[error("{name} environment variable is required")]
    MissingCredential { name: String },
    #[error("{name} appears to be invalid: {reason}")]
    InvalidCredential { name: String, reason: &'static str },
    #[error("media URL '{url}' is not usable: {reason}")]
    MediaUnavailable { url: String, reason: String },
    #[error("{0}")]
    Unsupported(&'static str),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Network failures, distinguished from HTTP-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("network error: {0}")]
    Other(String),
}

/// Everything that can go wrong while posting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("authentication failed, request unauthorized: {detail}")]
    Auth { detail: String },
    #[error("access forbidden, the account or plan lacks permission: {detail}")]
    Permission { detail: String },
    #[error("rate limit exceeded ({cap})")]
    RateLimited { cap: String },
    #[error("bad request: {message}")]
    Payload { message: String },
    #[error("upstream server error ({status}): {detail}")]
    Server { status: u16, detail: String },
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Account(String),
    #[error("request failed with status code {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },
    #[error("unexpected response format: {0}")]
    MalformedResponse(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostError::Validation(_) => ErrorKind::Validation,
            PostError::Auth { .. } => ErrorKind::Auth,
            PostError::Permission { .. } => ErrorKind::Permission,
            PostError::RateLimited { .. } => ErrorKind::RateLimit,
            PostError::Payload { .. } => ErrorKind::Payload,
            PostError::Server { .. } => ErrorKind::Server,
            PostError::Transport(_) => ErrorKind::Transport,
            PostError::Account(_) => ErrorKind::Account,
            PostError::UnexpectedStatus { .. }
            | PostError::MalformedResponse(_)
            | PostError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// HTTP status behind the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PostError::Auth { .. } => Some(401),
            PostError::Permission { .. } => Some(403),
            PostError::RateLimited { .. } => Some(429),
            PostError::Payload { .. } => Some(400),
            PostError::Server { status, .. } | PostError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Provider-supplied detail text
    pub fn detail(&self) -> Option<String> {
        match self {
            PostError::Auth { detail }
            | PostError::Permission { detail }
            | PostError::Server { detail, .. }
            | PostError::UnexpectedStatus { detail, .. } => {
                (!detail.is_empty()).then(|| detail.clone())
            }
            PostError::Payload { message } => Some(message.clone()),
            PostError::MalformedResponse(body) => Some(body.clone()),
            _ => None,
        }
    }

    /// Troubleshooting hint for the caller
    pub fn suggestion(&self, provider: Provider) -> Option<String> {
        let hint = match self {
            PostError::Validation(ValidationError::MissingCredential { name }) => {
                format!("Set {} in the environment before posting", name)
            }
            PostError::Validation(ValidationError::Unsupported(_)) => {
                "Attach an image to the caption and post with post_type 'image'".to_string()
            }
            PostError::Validation(_) => return None,
            PostError::Auth { .. } if provider == Provider::Zapier => {
                "Verify the webhook URL is correct".to_string()
            }
            PostError::Auth { .. } => format!(
                "Check that the {} API key or access token is valid and not expired",
                provider.name()
            ),
            PostError::Permission { .. } => format!(
                "Check your {} subscription and that the Instagram account is connected with publishing permissions",
                provider.name()
            ),
            PostError::RateLimited { .. } if provider == Provider::Buffer => {
                "Wait 60 seconds before trying again".to_string()
            }
            PostError::RateLimited { .. } => {
                "Wait a few minutes before trying again, or upgrade the plan for higher limits"
                    .to_string()
            }
            PostError::Payload { .. } => {
                "Check the payload format and request parameters".to_string()
            }
            PostError::Server { .. } => format!(
                "Try again later, this may be a temporary {} issue",
                provider.name()
            ),
            PostError::Transport(_) => format!(
                "Check your internet connection and {} service status",
                provider.name()
            ),
            PostError::Account(_) if provider == Provider::Buffer => {
                "List profiles with GET /1/profiles.json and pick the id of an Instagram profile"
                    .to_string()
            }
            PostError::Account(_) => {
                "Make sure the Instagram account is a Business or Creator account connected to a Facebook Page"
                    .to_string()
            }
            PostError::UnexpectedStatus { status: 404, .. } if provider == Provider::Zapier => {
                "Verify the webhook URL exists and is active".to_string()
            }
            PostError::UnexpectedStatus { .. } | PostError::MalformedResponse(_) => {
                return None;
            }
            PostError::Unexpected(_) => "Check all input parameters and try again".to_string(),
        };
        Some(hint)
    }
}

/// A [`PostError`] plus the provider's response body, when one came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub error: PostError,
    pub raw_response: Option<String>,
}

impl Failure {
    /// Attach the body the provider answered with; blank bodies are dropped
    pub fn with_raw_response(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.raw_response = (!body.trim().is_empty()).then_some(body);
        self
    }
}

impl From<PostError> for Failure {
    fn from(error: PostError) -> Self {
        Self {
            error,
            raw_response: None,
        }
    }
}

impl From<ValidationError> for Failure {
    fn from(error: ValidationError) -> Self {
        PostError::from(error).into()
    }
}

impl From<TransportError> for Failure {
    fn from(error: TransportError) -> Self {
        PostError::from(error).into()
    }
}

/// Port implemented by every provider adapter
#[async_trait]
pub trait PostingAdapter: Send + Sync {
    /// Provider-specific request shape
    type Request: Send + Sync;

    /// Validate, send and normalize; failures are returned, never raised
    async fn post(&self, request: &Self::Request) -> PostResult;

    /// Get the provider this adapter talks to
    fn provider(&self) -> Provider;

    /// Same as [`post`](Self::post), bounded by a caller-supplied deadline
    async fn post_with_timeout(&self, request: &Self::Request, limit: Duration) -> PostResult {
        match tokio::time::timeout(limit, self.post(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(provider = %self.provider(), ?limit, "Post call exceeded caller deadline");
                PostResult::from_error(self.provider(), &TransportError::Timeout.into())
            }
        }
    }
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
