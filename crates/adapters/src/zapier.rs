//! Zapier catch-hook adapter
//!
//! The zap behind the webhook does the actual posting, so a 200 only means
//! the payload was accepted. No identifier is required in the response.

use async_trait::async_trait;
use instapost_domain::normalize::find_id;
use instapost_domain::report::{self, ReportContext};
use instapost_domain::{
    caption, validate, Clock, Failure, PostResult, PostingAdapter, Provider, SystemClock,
    ValidationError, WebhookRequest,
};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

use crate::http;

/// Sends post data to a configured Zapier webhook
pub struct WebhookPublisher {
    client: Client,
    webhook_url: String,
    account: Option<String>,
    clock: Arc<dyn Clock>,
}

impl WebhookPublisher {
    pub fn new(webhook_url: impl Into<String>, account: Option<String>) -> Self {
        Self {
            client: http::build_client(),
            webhook_url: webhook_url.into(),
            account,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Post, then render the outcome as a human-readable report
    pub async fn post_report(&self, request: &WebhookRequest) -> String {
        let result = self.post(request).await;
        self.render_report(&result, request)
    }

    /// Render a result obtained for `request`
    pub fn render_report(&self, result: &PostResult, request: &WebhookRequest) -> String {
        report::render(result, &self.report_context(request), self.clock.now())
    }

    fn report_context(&self, request: &WebhookRequest) -> ReportContext {
        ReportContext {
            account: self.account.clone(),
            schedule: Some(
                format!("{} {}", request.preferred_posting_time.trim(), request.timezone.trim())
                    .trim()
                    .to_string(),
            ),
            content_chars: request.content.chars().count(),
            media_count: request.media_urls.len(),
            hashtag_count: request
                .hashtags
                .iter()
                .filter_map(|tag| caption::hashtag(tag))
                .count(),
        }
    }

    async fn publish(&self, request: &WebhookRequest) -> Result<PostResult, Failure> {
        let post = request.validate()?;

        let webhook_url = validate::optional(Some(self.webhook_url.as_str()))
            .ok_or(ValidationError::NotConfigured("Zapier webhook URL"))?;
        let webhook_url = validate::http_url("webhook_url", webhook_url)?;

        let payload = WebhookPayload {
            content: &post.content,
            media_urls: &post.media_urls,
            preferred_posting_time: &post.preferred_posting_time,
            timezone: &post.timezone,
            account: self.account.as_deref(),
            post_type: "feed",
            brand_name: post.brand_name.as_deref(),
        };

        tracing::info!(
            provider = "zapier",
            media_count = post.media_urls.len(),
            hashtag_count = post.hashtag_count,
            "Sending webhook payload"
        );

        let (body, raw) =
            http::call(Provider::Zapier, self.client.post(&webhook_url).json(&payload)).await?;

        let id = find_id(&body, &[&["id"], &["request_id"], &["attempt"]]);
        Ok(PostResult::success(
            Provider::Zapier,
            "Instagram post data sent to Zapier webhook successfully!",
            id,
        )
        .with_raw_response(raw))
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    media_urls: &'a [String],
    preferred_posting_time: &'a str,
    timezone: &'a str,
    account: Option<&'a str>,
    post_type: &'static str,
    brand_name: Option<&'a str>,
}

#[async_trait]
impl PostingAdapter for WebhookPublisher {
    type Request = WebhookRequest;

    async fn post(&self, request: &WebhookRequest) -> PostResult {
        match self.publish(request).await {
            Ok(result) => result,
            Err(failure) => PostResult::from_failure(Provider::Zapier, failure),
        }
    }

    fn provider(&self) -> Provider {
        Provider::Zapier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instapost_domain::{ErrorKind, FixedClock, Outcome};
    use time::macros::datetime;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> WebhookPublisher {
        WebhookPublisher::new(format!("{}/hooks/catch/1/abc", server.uri()), Some("@brand".into()))
            .with_clock(Arc::new(FixedClock(datetime!(2030-06-01 12:00:00 UTC))))
    }

    fn request() -> WebhookRequest {
        WebhookRequest {
            content: "New drop".to_string(),
            media_urls: vec!["https://cdn.example.com/a.jpg".to_string()],
            preferred_posting_time: "1:10 PM".to_string(),
            timezone: "EST".to_string(),
            hashtags: vec!["style".to_string(), "#fashion".to_string()],
            brand_name: Some("Acme".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sends_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hooks/catch/1/abc"))
            .and(body_json(serde_json::json!({
                "content": "New drop\n\n#style #fashion",
                "media_urls": ["https://cdn.example.com/a.jpg"],
                "preferred_posting_time": "1:10 PM",
                "timezone": "EST",
                "account": "@brand",
                "post_type": "feed",
                "brand_name": "Acme"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "attempt": "att_1",
                "id": "zap_1",
                "request_id": "req_1",
                "status": "success"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).post(&request()).await;

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.post_id.as_deref(), Some("zap_1"));
        assert!(result.raw_response.unwrap().contains("req_1"));
    }

    #[tokio::test]
    async fn test_success_without_identifier() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).post(&request()).await;

        assert!(result.is_success());
        assert!(result.post_id.is_none());
    }

    #[tokio::test]
    async fn test_not_found_suggests_checking_webhook() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).post(&request()).await;

        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::Unexpected);
        assert_eq!(error.status, Some(404));
        assert_eq!(
            error.suggestion.as_deref(),
            Some("Verify the webhook URL exists and is active")
        );
    }

    #[tokio::test]
    async fn test_unconfigured_url() {
        let result = WebhookPublisher::new("", None).post(&request()).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
        assert!(result.message.contains("is not configured"));
    }

    #[tokio::test]
    async fn test_report_lines() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .mount(&mock_server)
            .await;

        let report = publisher(&mock_server).post_report(&request()).await;

        assert!(report.starts_with("✅ SUCCESS"));
        assert!(report.contains("📅 Timestamp: 2030-06-01T12:00:00Z"));
        assert!(report.contains("📱 Account: @brand"));
        assert!(report.contains("⏰ Posting time: 1:10 PM EST"));
        assert!(report.contains("📝 Content length: 8 characters"));
        assert!(report.contains("🏷️ Hashtags: 2 items"));
    }

    #[tokio::test]
    async fn test_failure_report() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("zap broke"))
            .mount(&mock_server)
            .await;

        let report = publisher(&mock_server).post_report(&request()).await;

        assert!(report.starts_with("❌ FAILURE"));
        assert!(report.contains("🌐 Status code: 500"));
        assert!(report.contains("📄 Provider response: zap broke"));
        assert!(report.contains("💡 Suggestion: Try again later"));
    }
}
