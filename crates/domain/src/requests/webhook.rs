use serde::{Deserialize, Serialize};

use crate::caption;
use crate::ports::ValidationError;
use crate::validate;

/// Arguments handed to a Zapier "catch hook" that posts to Instagram
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// Free-form preferred time, e.g. `1:10 PM`; interpreted by the zap
    #[serde(default)]
    pub preferred_posting_time: String,
    /// Timezone label for `preferred_posting_time`, e.g. `EST`
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
}

/// Checked webhook payload contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookPost {
    pub content: String,
    pub media_urls: Vec<String>,
    pub preferred_posting_time: String,
    pub timezone: String,
    pub hashtag_count: usize,
    pub brand_name: Option<String>,
}

impl WebhookRequest {
    pub fn validate(&self) -> Result<WebhookPost, ValidationError> {
        let content = validate::required("content", &self.content)?;
        let content = validate::caption("content", &caption::compose(content, &self.hashtags, &[]))?;
        let media_urls = validate::media_urls("media_urls", &self.media_urls)?;
        let preferred_posting_time =
            validate::required("preferred_posting_time", &self.preferred_posting_time)?.to_string();
        let timezone = validate::required("timezone", &self.timezone)?.to_string();

        Ok(WebhookPost {
            content,
            media_urls,
            preferred_posting_time,
            timezone,
            hashtag_count: self.hashtags.iter().filter_map(|t| caption::hashtag(t)).count(),
            brand_name: validate::optional(self.brand_name.as_deref()).map(str::to_string),
        })
    }
}
