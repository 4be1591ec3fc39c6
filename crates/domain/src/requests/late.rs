use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::caption;
use crate::ports::ValidationError;
use crate::validate;

/// Late.io rejects schedules more than a year out
pub const LATE_MAX_SCHEDULE_DAYS: u32 = 365;

/// Instagram surfaces supported by Late.io
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatePostType {
    #[default]
    Feed,
    Story,
    Reel,
}

impl LatePostType {
    pub const ALLOWED: &'static [&'static str] = &["feed", "story", "reel"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LatePostType::Feed => "feed",
            LatePostType::Story => "story",
            LatePostType::Reel => "reel",
        }
    }
}

impl FromStr for LatePostType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "feed" => Ok(LatePostType::Feed),
            "story" => Ok(LatePostType::Story),
            "reel" => Ok(LatePostType::Reel),
            other => Err(ValidationError::InvalidChoice {
                field: "post_type",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Arguments for posting through Late.io
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateRequest {
    /// Late Instagram account id; falls back to the configured default
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// ISO-8601 instant to publish at
    #[serde(default)]
    pub schedule_time: Option<String>,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    /// Hashtags, with or without the leading `#`
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Usernames, with or without the leading `@`
    #[serde(default)]
    pub mentions: Vec<String>,
}

fn default_post_type() -> String {
    LatePostType::Feed.as_str().to_string()
}

impl Default for LateRequest {
    fn default() -> Self {
        Self {
            account_id: None,
            content: String::new(),
            media_urls: vec![],
            schedule_time: None,
            post_type: default_post_type(),
            hashtags: vec![],
            mentions: vec![],
        }
    }
}

/// Checked Late.io post, caption already composed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatePost {
    pub account_id: Option<String>,
    pub text: String,
    pub media_urls: Vec<String>,
    pub schedule: Option<OffsetDateTime>,
    pub post_type: LatePostType,
}

impl LateRequest {
    pub fn validate(&self, now: OffsetDateTime) -> Result<LatePost, ValidationError> {
        let post_type: LatePostType = self.post_type.parse()?;
        let content = validate::required("content", &self.content)?;
        let text = validate::caption(
            "content",
            &caption::compose(content, &self.hashtags, &self.mentions),
        )?;
        let media_urls = validate::media_urls("media_urls", &self.media_urls)?;

        let schedule = validate::optional(self.schedule_time.as_deref())
            .map(|raw| {
                let at = validate::iso_instant("schedule_time", raw)?;
                let at = validate::future_instant(at, now, None)?;
                validate::within_whole_days(at, now, LATE_MAX_SCHEDULE_DAYS)
            })
            .transpose()?;

        Ok(LatePost {
            account_id: validate::optional(self.account_id.as_deref()).map(str::to_string),
            text,
            media_urls,
            schedule,
            post_type,
        })
    }
}
