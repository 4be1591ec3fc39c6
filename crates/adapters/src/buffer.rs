//! Buffer adapter: profile check, media check, then a form-encoded update

use async_trait::async_trait;
use instapost_domain::normalize::{find_id, lookup, snippet};
use instapost_domain::{
    BufferRequest, Clock, Failure, PostError, PostResult, PostingAdapter, Provider, SystemClock,
    TokenBucket, ValidationError,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::credentials::Credential;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://api.bufferapp.com";

/// Credential variable read when none is configured
pub const ACCESS_TOKEN_VAR: &str = "BUFFER_API_KEY";

/// Spacing that keeps Buffer under 10 requests per minute
pub const MIN_SPACING: Duration = Duration::from_millis(6100);

/// Posts to Instagram through a Buffer profile
pub struct BufferPublisher {
    client: Client,
    access_token: Credential,
    base_url: String,
    limiter: Arc<TokenBucket>,
    check_media: bool,
    clock: Arc<dyn Clock>,
}

impl BufferPublisher {
    pub fn new(access_token: Credential) -> Self {
        Self::with_base_url(
            access_token,
            DEFAULT_BASE_URL,
            Arc::new(TokenBucket::with_spacing(MIN_SPACING)),
        )
    }

    /// The limiter may be shared with other publishers using the same token
    pub fn with_base_url(
        access_token: Credential,
        base_url: impl Into<String>,
        limiter: Arc<TokenBucket>,
    ) -> Self {
        Self {
            client: http::build_client(),
            access_token,
            base_url: base_url.into(),
            limiter,
            check_media: true,
            clock: Arc::new(SystemClock),
        }
    }

    /// Toggle the HEAD check on media URLs
    pub fn with_media_check(mut self, enabled: bool) -> Self {
        self.check_media = enabled;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn publish(&self, request: &BufferRequest) -> Result<PostResult, Failure> {
        let post = request.validate(self.clock.now())?;
        let token = self.access_token.resolve()?;

        let username = self.verify_profile(&token, &post.profile_id).await?;

        if let Some(media) = post.media.as_deref().filter(|_| self.check_media) {
            self.verify_media(media).await?;
        }

        let mut form: Vec<(&str, String)> = vec![
            ("access_token", token.expose_secret().to_string()),
            ("profile_ids[]", post.profile_id.clone()),
            ("text", post.text.clone()),
            ("top", post.top.to_string()),
        ];
        if let Some(media) = &post.media {
            form.push(("media[link]", media.clone()));
        }
        if let Some(at) = post.scheduled_at {
            form.push(("scheduled_at", at.unix_timestamp().to_string()));
        }

        self.limiter.acquire().await;
        tracing::info!(
            provider = "buffer",
            profile_id = %post.profile_id,
            scheduled = post.scheduled_at.is_some(),
            "Creating update"
        );

        let url = format!("{}/1/updates/create.json", self.base_url);
        let (body, raw) = http::call(Provider::Buffer, self.client.post(&url).form(&form)).await?;

        let update = lookup(&body, &["updates", "0"])
            .ok_or_else(|| PostError::MalformedResponse(snippet(&raw)))?;
        let id = find_id(update, &[&["id"]])
            .ok_or_else(|| PostError::MalformedResponse(snippet(&raw)))?;

        let published = update.get("posted_at").is_some_and(|v| !v.is_null());
        let mut message = if published {
            "Post successfully published to Instagram".to_string()
        } else {
            "Post successfully created in Buffer".to_string()
        };
        if let Some(username) = username {
            message.push_str(&format!(" for {}", username));
        }

        let result = PostResult::success(Provider::Buffer, message, Some(id)).with_raw_response(raw);
        Ok(match post.scheduled_at {
            Some(at) => result.scheduled_for(at),
            None => result,
        })
    }

    /// Confirm the profile exists and is an Instagram profile; returns its username
    async fn verify_profile(
        &self,
        token: &SecretString,
        profile_id: &str,
    ) -> Result<Option<String>, Failure> {
        self.limiter.acquire().await;

        let url = format!("{}/1/profiles.json", self.base_url);
        let (body, raw) = http::call(
            Provider::Buffer,
            self.client
                .get(&url)
                .query(&[("access_token", token.expose_secret())]),
        )
        .await?;

        let profiles = body
            .as_array()
            .ok_or_else(|| PostError::MalformedResponse(snippet(&raw)))?;

        let field = |profile: &Value, key: &str| {
            profile
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let Some(profile) = profiles.iter().find(|p| field(p, "id") == profile_id) else {
            let available: Vec<String> = profiles
                .iter()
                .filter(|p| field(p, "service") == "instagram")
                .map(|p| format!("{} ({})", field(p, "id"), field(p, "formatted_username")))
                .collect();
            tracing::warn!(profile_id, "Buffer profile not found");
            return Err(PostError::Account(format!(
                "profile ID {} not found; available Instagram profiles: [{}]",
                profile_id,
                available.join(", ")
            ))
            .into());
        };

        let service = field(profile, "service");
        if service != "instagram" {
            return Err(PostError::Account(format!(
                "profile {} is not an Instagram profile (service: {})",
                profile_id, service
            ))
            .into());
        }

        let username = field(profile, "formatted_username");
        tracing::debug!(profile_id, username = %username, "Buffer profile verified");
        Ok((!username.is_empty()).then_some(username))
    }

    /// Media must answer 200 and, when typed, be an image
    async fn verify_media(&self, media: &str) -> Result<(), PostError> {
        let unavailable = |reason: String| {
            PostError::Validation(ValidationError::MediaUnavailable {
                url: media.to_string(),
                reason,
            })
        };

        let response = http::send(
            Provider::Buffer,
            self.client.head(media).timeout(http::MEDIA_CHECK_TIMEOUT),
        )
        .await
        .map_err(|e| unavailable(format!("cannot access media URL: {}", e)))?;

        if response.status != 200 {
            return Err(unavailable(format!("not accessible (status {})", response.status)));
        }

        match response.content_type.map(|ct| ct.to_lowercase()) {
            Some(ct) if !ct.is_empty() && !ct.starts_with("image/") => Err(unavailable(format!(
                "does not appear to be an image (Content-Type: {})",
                ct
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PostingAdapter for BufferPublisher {
    type Request = BufferRequest;

    async fn post(&self, request: &BufferRequest) -> PostResult {
        match self.publish(request).await {
            Ok(result) => result,
            Err(failure) => PostResult::from_failure(Provider::Buffer, failure),
        }
    }

    fn provider(&self) -> Provider {
        Provider::Buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instapost_domain::{ErrorKind, FixedClock, Outcome};
    use time::macros::datetime;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> BufferPublisher {
        BufferPublisher::with_base_url(
            Credential::fixed(ACCESS_TOKEN_VAR, SecretString::new("buf_token".into())),
            server.uri(),
            Arc::new(TokenBucket::unlimited()),
        )
        .with_clock(Arc::new(FixedClock(datetime!(2030-01-01 00:00:00 UTC))))
    }

    fn request() -> BufferRequest {
        BufferRequest {
            profile_id: "prof_ig".to_string(),
            text: "Hello Instagram".to_string(),
            ..Default::default()
        }
    }

    async fn mount_profiles(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/1/profiles.json"))
            .and(query_param("access_token", "buf_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "prof_ig", "service": "instagram", "formatted_username": "@brand"},
                {"id": "prof_tw", "service": "twitter", "formatted_username": "@brand_tw"}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_creates_update() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/1/updates/create.json"))
            .and(body_string_contains("profile_ids%5B%5D=prof_ig"))
            .and(body_string_contains("text=Hello+Instagram"))
            .and(body_string_contains("top=false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "updates": [{"id": "upd_1", "status": "buffer", "profile_service": "instagram"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).post(&request()).await;

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.post_id.as_deref(), Some("upd_1"));
        assert_eq!(result.message, "Post successfully created in Buffer for @brand");
    }

    #[tokio::test]
    async fn test_posted_at_means_published() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/1/updates/create.json"))
            .and(body_string_contains("scheduled_at=1907020800"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "updates": [{"id": "upd_2", "posted_at": 1907020800}]
            })))
            .mount(&mock_server)
            .await;

        let mut req = request();
        req.scheduled_at = Some(1907020800);

        let result = publisher(&mock_server).post(&req).await;

        assert!(result.is_success());
        assert!(result.message.starts_with("Post successfully published to Instagram"));
        assert!(result.scheduled);
    }

    #[tokio::test]
    async fn test_unknown_profile_skips_posting() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/1/updates/create.json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut req = request();
        req.profile_id = "prof_missing".to_string();

        let result = publisher(&mock_server).post(&req).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Account));
        assert!(result.message.contains("prof_missing not found"));
        assert!(result.message.contains("prof_ig (@brand)"));
    }

    #[tokio::test]
    async fn test_non_instagram_profile_is_rejected() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        let mut req = request();
        req.profile_id = "prof_tw".to_string();

        let result = publisher(&mock_server).post(&req).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Account));
        assert!(result.message.contains("service: twitter"));
    }

    #[tokio::test]
    async fn test_non_image_media_is_rejected() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        Mock::given(method("HEAD"))
            .and(path("/page.html"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut req = request();
        req.media = Some(format!("{}/page.html", mock_server.uri()));

        let result = publisher(&mock_server).post(&req).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
        assert!(result.message.contains("does not appear to be an image"));
    }

    #[tokio::test]
    async fn test_image_media_is_attached() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        Mock::given(method("HEAD"))
            .and(path("/a.jpg"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/jpeg"))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/1/updates/create.json"))
            .and(body_string_contains("media%5Blink%5D="))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"updates": [{"id": "upd_3"}]})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut req = request();
        req.media = Some(format!("{}/a.jpg", mock_server.uri()));

        let result = publisher(&mock_server).post(&req).await;

        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_rate_limited_names_cap() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/profiles.json"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).post(&request()).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::RateLimit));
        assert!(result.message.contains("10 requests per minute"));
        assert_eq!(
            result.error.unwrap().suggestion.as_deref(),
            Some("Wait 60 seconds before trying again")
        );
    }

    #[tokio::test]
    async fn test_empty_updates_is_unexpected() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/1/updates/create.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"updates": []})),
            )
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).post(&request()).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Unexpected));
    }

    fn spaced_publisher(server: &MockServer, limiter: Arc<TokenBucket>) -> BufferPublisher {
        BufferPublisher::with_base_url(
            Credential::fixed(ACCESS_TOKEN_VAR, SecretString::new("buf_token".into())),
            server.uri(),
            limiter,
        )
        .with_clock(Arc::new(FixedClock(datetime!(2030-01-01 00:00:00 UTC))))
    }

    #[tokio::test]
    async fn test_profile_lookup_and_create_each_take_a_token() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/1/updates/create.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"updates": [{"id": "upd_4"}]})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let spacing = Duration::from_millis(300);
        let publisher =
            spaced_publisher(&mock_server, Arc::new(TokenBucket::with_spacing(spacing)));

        let started = tokio::time::Instant::now();
        let result = publisher.post(&request()).await;

        assert!(result.is_success());
        assert!(
            started.elapsed() >= spacing,
            "create call was not spaced from the profile lookup: {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_profile_lookup_takes_a_shared_token() {
        let mock_server = MockServer::start().await;
        mount_profiles(&mock_server).await;

        let spacing = Duration::from_millis(300);
        let limiter = Arc::new(TokenBucket::with_spacing(spacing));
        let publisher = spaced_publisher(&mock_server, limiter.clone());

        let mut req = request();
        req.profile_id = "prof_missing".to_string();
        let result = publisher.post(&req).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::Account));

        let started = tokio::time::Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() >= spacing / 2);
    }

    #[tokio::test]
    async fn test_past_schedule_makes_no_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut req = request();
        req.scheduled_at = Some(1_000);

        let result = publisher(&mock_server).post(&req).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
        assert!(result.message.contains("must be in the future"));
    }
}
