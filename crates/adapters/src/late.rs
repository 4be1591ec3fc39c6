//! Late.io adapter

use async_trait::async_trait;
use instapost_domain::normalize::{find_id, snippet};
use instapost_domain::validate::format_instant;
use instapost_domain::{
    Clock, Failure, LateRequest, PostError, PostResult, PostingAdapter, Provider, SystemClock,
    ValidationError,
};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;

use crate::credentials::Credential;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://api.getlate.io";

const MIN_API_KEY_CHARS: usize = 10;

pub const API_KEY_VAR: &str = "LATE_API_KEY";
pub const ACCOUNT_ID_VAR: &str = "LATE_ACCOUNT_ID";

/// Posts to Instagram through Late.io
pub struct LatePublisher {
    client: Client,
    api_key: Credential,
    default_account: Credential,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl LatePublisher {
    pub fn new(api_key: Credential, default_account: Credential) -> Self {
        Self::with_base_url(api_key, default_account, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: Credential,
        default_account: Credential,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: http::build_client(),
            api_key,
            default_account,
            base_url: base_url.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn publish(&self, request: &LateRequest) -> Result<PostResult, Failure> {
        let post = request.validate(self.clock.now())?;

        let api_key = self.api_key.resolve()?;
        if api_key.expose_secret().chars().count() < MIN_API_KEY_CHARS {
            return Err(ValidationError::InvalidCredential {
                name: self.api_key.name().to_string(),
                reason: "too short",
            }
            .into());
        }

        let account_id = match post.account_id {
            Some(id) => id,
            None => self
                .default_account
                .resolve()?
                .expose_secret()
                .to_string(),
        };

        let payload = PostPayload {
            text: &post.text,
            platforms: Platforms {
                instagram: InstagramTarget {
                    account_id: &account_id,
                },
            },
            media: (!post.media_urls.is_empty()).then(|| {
                post.media_urls
                    .iter()
                    .map(|url| MediaItem { url })
                    .collect()
            }),
            publish_at: post.schedule.map(format_instant),
        };

        let url = format!("{}/v1/posts", self.base_url);
        tracing::info!(
            provider = "late",
            account_id = %account_id,
            post_type = post.post_type.as_str(),
            media_count = post.media_urls.len(),
            scheduled = post.schedule.is_some(),
            "Sending post"
        );

        let (body, raw) = http::call(
            Provider::Late,
            self.client
                .post(&url)
                .bearer_auth(api_key.expose_secret())
                .json(&payload),
        )
        .await?;

        let id = find_id(
            &body,
            &[&["id"], &["_id"], &["post", "id"], &["post", "_id"], &["data", "id"]],
        )
        .ok_or_else(|| PostError::MalformedResponse(snippet(&raw)))?;

        Ok(match post.schedule {
            Some(at) => PostResult::success(
                Provider::Late,
                "Instagram post scheduled successfully!",
                Some(id),
            )
            .scheduled_for(at),
            None => PostResult::success(
                Provider::Late,
                "Instagram post published successfully!",
                Some(id),
            ),
        }
        .with_raw_response(raw))
    }
}

#[derive(Serialize)]
struct PostPayload<'a> {
    text: &'a str,
    platforms: Platforms<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<Vec<MediaItem<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_at: Option<String>,
}

#[derive(Serialize)]
struct Platforms<'a> {
    instagram: InstagramTarget<'a>,
}

#[derive(Serialize)]
struct InstagramTarget<'a> {
    account_id: &'a str,
}

#[derive(Serialize)]
struct MediaItem<'a> {
    url: &'a str,
}

#[async_trait]
impl PostingAdapter for LatePublisher {
    type Request = LateRequest;

    async fn post(&self, request: &LateRequest) -> PostResult {
        match self.publish(request).await {
            Ok(result) => result,
            Err(failure) => PostResult::from_failure(Provider::Late, failure),
        }
    }

    fn provider(&self) -> Provider {
        Provider::Late
    }
}
