use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::ports::ValidationError;
use crate::validate;

/// Instagram only accepts scheduled publishing up to 75 days ahead
pub const GRAPH_MAX_SCHEDULE_DAYS: u32 = 75;

/// Post kinds accepted by the Graph adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphPostType {
    Text,
    Image,
}

impl GraphPostType {
    pub const ALLOWED: &'static [&'static str] = &["text", "image"];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphPostType::Text => "text",
            GraphPostType::Image => "image",
        }
    }
}

impl FromStr for GraphPostType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(GraphPostType::Text),
            "image" => Ok(GraphPostType::Image),
            other => Err(ValidationError::InvalidChoice {
                field: "post_type",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Arguments for publishing through the Instagram Graph API
#[derive(Debug, Deserialize)]
pub struct GraphRequest {
    /// `text` or `image`
    #[serde(default)]
    pub post_type: String,
    #[serde(default)]
    pub caption: String,
    /// Required for image posts
    #[serde(default)]
    pub image_url: Option<String>,
    /// ISO-8601 instant to publish at
    #[serde(default)]
    pub schedule_time: Option<String>,
    /// Graph API user access token with `instagram_content_publish`
    #[serde(default = "empty_token")]
    pub access_token: SecretString,
}

fn empty_token() -> SecretString {
    SecretString::new(String::new().into())
}

/// Checked Graph API post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPost {
    pub post_type: GraphPostType,
    pub caption: String,
    pub image_url: String,
    pub schedule: Option<OffsetDateTime>,
}

impl GraphRequest {
    pub fn validate(&self, now: OffsetDateTime) -> Result<GraphPost, ValidationError> {
        let post_type: GraphPostType = validate::required("post_type", &self.post_type)?.parse()?;
        let caption = validate::caption("caption", &self.caption)?;
        validate::required("access_token", self.access_token.expose_secret())?;

        let image_url = match (post_type, validate::optional(self.image_url.as_deref())) {
            (GraphPostType::Text, _) => {
                return Err(ValidationError::Unsupported(
                    "Instagram Graph API does not support text-only posts",
                ));
            }
            (GraphPostType::Image, None) => {
                return Err(ValidationError::MissingField { field: "image_url" });
            }
            (GraphPostType::Image, Some(url)) => validate::http_url("image_url", url)?,
        };

        let schedule = validate::optional(self.schedule_time.as_deref())
            .map(|raw| {
                let at = validate::iso_instant("schedule_time", raw)?;
                validate::future_instant(at, now, Some(GRAPH_MAX_SCHEDULE_DAYS))
            })
            .transpose()?;

        Ok(GraphPost {
            post_type,
            caption,
            image_url,
            schedule,
        })
    }
}
