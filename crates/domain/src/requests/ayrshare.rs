use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ports::ValidationError;
use crate::validate;

/// Arguments for posting through Ayrshare
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AyrshareRequest {
    /// Caption for the Instagram post
    #[serde(default)]
    pub post_text: String,
    /// Image to attach
    #[serde(default)]
    pub image_url: Option<String>,
    /// `YYYY-MM-DD`, only together with `schedule_time`
    #[serde(default)]
    pub schedule_date: Option<String>,
    /// `HH:MM` (24-hour, UTC), only together with `schedule_date`
    #[serde(default)]
    pub schedule_time: Option<String>,
}

/// Checked Ayrshare post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AyrsharePost {
    pub text: String,
    pub media_url: Option<String>,
    pub schedule: Option<OffsetDateTime>,
}

impl AyrshareRequest {
    pub fn validate(&self, now: OffsetDateTime) -> Result<AyrsharePost, ValidationError> {
        let text = validate::caption("post_text", &self.post_text)?;

        let media_url = validate::optional(self.image_url.as_deref())
            .map(|url| validate::http_url("image_url", url))
            .transpose()?;

        let schedule = validate::schedule_pair(
            self.schedule_date.as_deref(),
            self.schedule_time.as_deref(),
        )?
        .map(|at| validate::future_instant(at, now, None))
        .transpose()?;

        Ok(AyrsharePost {
            text,
            media_url,
            schedule,
        })
    }
}
