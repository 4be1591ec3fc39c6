//! Ayrshare adapter: one authenticated JSON call to the social posting API

use async_trait::async_trait;
use instapost_domain::normalize::{find_id, snippet};
use instapost_domain::validate::format_instant;
use instapost_domain::{
    AyrshareRequest, Clock, Failure, PostError, PostResult, PostingAdapter, Provider,
    SystemClock,
};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;

use crate::credentials::Credential;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://app.ayrshare.com";

/// Credential variable read when none is configured
pub const API_KEY_VAR: &str = "AYRSHARE_API_KEY";

/// Posts to Instagram through Ayrshare
pub struct AyrsharePublisher {
    client: Client,
    api_key: Credential,
    base_url: String,
    account: Option<String>,
    clock: Arc<dyn Clock>,
}

impl AyrsharePublisher {
    pub fn new(api_key: Credential) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Credential, base_url: impl Into<String>) -> Self {
        Self {
            client: http::build_client(),
            api_key,
            base_url: base_url.into(),
            account: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Account handle quoted in success messages
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn publish(&self, request: &AyrshareRequest) -> Result<PostResult, Failure> {
        let post = request.validate(self.clock.now())?;
        let api_key = self.api_key.resolve()?;

        let payload = PostPayload {
            post: &post.text,
            platforms: ["instagram"],
            media_urls: post.media_url.as_deref().map(|url| vec![url]),
            schedule_date: post.schedule.map(format_instant),
        };

        let url = format!("{}/api/post", self.base_url);
        tracing::info!(
            provider = "ayrshare",
            scheduled = post.schedule.is_some(),
            has_media = post.media_url.is_some(),
            "Sending post"
        );

        let (body, raw) = http::call(
            Provider::Ayrshare,
            self.client
                .post(&url)
                .bearer_auth(api_key.expose_secret())
                .json(&payload),
        )
        .await?;

        let id = find_id(&body, &[&["id"], &["data", "id"], &["postIds", "0", "id"]])
            .ok_or_else(|| PostError::MalformedResponse(snippet(&raw)))?;

        let target = match &self.account {
            Some(account) => format!("Instagram {}", account),
            None => "Instagram".to_string(),
        };

        let result = match post.schedule {
            Some(at) => PostResult::success(
                Provider::Ayrshare,
                format!(
                    "Post scheduled successfully for {} at {:02}:{:02} UTC on {}",
                    at.date(),
                    at.hour(),
                    at.minute(),
                    target
                ),
                Some(id),
            )
            .scheduled_for(at),
            None => PostResult::success(
                Provider::Ayrshare,
                format!("Post published successfully to {}", target),
                Some(id),
            ),
        };

        if let Some(url) = find_id(&body, &[&["postIds", "0", "postUrl"], &["postUrl"]]) {
            return Ok(result.with_url(url).with_raw_response(raw));
        }
        Ok(result.with_raw_response(raw))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostPayload<'a> {
    post: &'a str,
    platforms: [&'static str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    media_urls: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule_date: Option<String>,
}

#[async_trait]
impl PostingAdapter for AyrsharePublisher {
    type Request = AyrshareRequest;

    async fn post(&self, request: &AyrshareRequest) -> PostResult {
        match self.publish(request).await {
            Ok(result) => {
                tracing::info!(post_id = ?result.post_id, "Ayrshare accepted post");
                result
            }
            Err(failure) => PostResult::from_failure(Provider::Ayrshare, failure),
        }
    }

    fn provider(&self) -> Provider {
        Provider::Ayrshare
    }
}
