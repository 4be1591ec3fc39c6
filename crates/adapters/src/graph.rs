//! Instagram Graph API adapter
//!
//! Publishing is two-phase: a media container is created for the image, then
//! the container is published (or scheduled). The Instagram Business Account
//! id is looked up from the token's Facebook Pages before either call.

use async_trait::async_trait;
use instapost_domain::normalize::{find_id, snippet};
use instapost_domain::{
    Clock, Failure, GraphPost, GraphRequest, PostError, PostResult, PostingAdapter, Provider,
    SystemClock,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::http;

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v18.0";

const INVALID_IMAGE_URL: &str = "Invalid image URL";

/// Publishes images through the Instagram Graph API
pub struct GraphPublisher {
    client: Client,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl Default for GraphPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphPublisher {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http::build_client(),
            base_url: base_url.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn publish(&self, request: &GraphRequest) -> Result<PostResult, Failure> {
        let post = request.validate(self.clock.now())?;
        let token = &request.access_token;

        let account_id = self.business_account(token).await?;
        let container_id = self.create_container(token, &account_id, &post).await?;
        let (media_id, raw) = self
            .publish_container(token, &account_id, &container_id, &post)
            .await?;

        tracing::info!(
            provider = "instagram_graph",
            media_id = %media_id,
            scheduled = post.schedule.is_some(),
            "Container published"
        );

        let message = if post.schedule.is_some() {
            "Post scheduled successfully"
        } else {
            "Post published successfully"
        };
        let result = PostResult::success(Provider::InstagramGraph, message, Some(media_id.clone()))
            .with_url(format!("https://www.instagram.com/p/{}/", media_id))
            .with_raw_response(raw);

        Ok(match post.schedule {
            Some(at) => result.scheduled_for(at),
            None => result,
        })
    }

    /// First Instagram Business Account linked to the token's Pages
    async fn business_account(&self, token: &SecretString) -> Result<String, Failure> {
        let url = format!("{}/me", self.base_url);
        let (body, _) = http::call(
            Provider::InstagramGraph,
            self.client
                .get(&url)
                .query(&[("fields", "accounts{instagram_business_account}")])
                .bearer_auth(token.expose_secret()),
        )
        .await?;

        let account_id = body
            .get("accounts")
            .and_then(|accounts| accounts.get("data"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find_map(|page| find_id(page, &[&["instagram_business_account", "id"]]));

        match account_id {
            Some(id) => {
                tracing::debug!(account_id = %id, "Found Instagram Business Account");
                Ok(id)
            }
            None => Err(PostError::Account(
                "no Instagram Business Account found; make sure your Instagram account is connected to a Facebook Page and is a Business account"
                    .to_string(),
            )
            .into()),
        }
    }

    async fn create_container(
        &self,
        token: &SecretString,
        account_id: &str,
        post: &GraphPost,
    ) -> Result<String, Failure> {
        let url = format!("{}/{}/media", self.base_url, account_id);
        let payload = ContainerPayload {
            caption: &post.caption,
            image_url: &post.image_url,
            media_type: "IMAGE",
        };

        let (body, raw) = http::call(
            Provider::InstagramGraph,
            self.client
                .post(&url)
                .bearer_auth(token.expose_secret())
                .json(&payload),
        )
        .await
        .map_err(|mut failure| {
            if let PostError::Payload { message } = &mut failure.error {
                if message.contains(INVALID_IMAGE_URL) {
                    *message = "the provided image URL is invalid or inaccessible; ensure the image is publicly accessible"
                        .to_string();
                }
            }
            failure
        })?;

        let container_id = find_id(&body, &[&["id"]]).ok_or_else(|| {
            PostError::MalformedResponse(format!("no container ID returned: {}", snippet(&raw)))
        })?;
        Ok(container_id)
    }

    async fn publish_container(
        &self,
        token: &SecretString,
        account_id: &str,
        container_id: &str,
        post: &GraphPost,
    ) -> Result<(String, String), Failure> {
        let url = format!("{}/{}/media_publish", self.base_url, account_id);
        let payload = PublishPayload {
            creation_id: container_id,
            published: post.schedule.map(|_| false),
            scheduled_publish_time: post.schedule.map(|at| at.unix_timestamp()),
        };

        let (body, raw) = http::call(
            Provider::InstagramGraph,
            self.client
                .post(&url)
                .bearer_auth(token.expose_secret())
                .json(&payload),
        )
        .await?;

        let media_id = find_id(&body, &[&["id"]])
            .ok_or_else(|| PostError::MalformedResponse(snippet(&raw)))?;
        Ok((media_id, raw))
    }
}

#[derive(Serialize)]
struct ContainerPayload<'a> {
    caption: &'a str,
    image_url: &'a str,
    media_type: &'static str,
}

#[derive(Serialize)]
struct PublishPayload<'a> {
    creation_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_publish_time: Option<i64>,
}

#[async_trait]
impl PostingAdapter for GraphPublisher {
    type Request = GraphRequest;

    async fn post(&self, request: &GraphRequest) -> PostResult {
        match self.publish(request).await {
            Ok(result) => result,
            Err(failure) => PostResult::from_failure(Provider::InstagramGraph, failure),
        }
    }

    fn provider(&self) -> Provider {
        Provider::InstagramGraph
    }
}
