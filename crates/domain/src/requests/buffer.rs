use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ports::ValidationError;
use crate::validate;

/// Arguments for posting through Buffer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BufferRequest {
    /// Buffer profile id of the connected Instagram account
    #[serde(default)]
    pub profile_id: String,
    /// Caption; may already contain hashtags and mentions
    #[serde(default)]
    pub text: String,
    /// Publicly reachable image URL
    #[serde(default)]
    pub media: Option<String>,
    /// Unix timestamp (seconds) to publish at
    #[serde(default)]
    pub scheduled_at: Option<i64>,
    /// Put the update at the top of the queue
    #[serde(default)]
    pub top: bool,
}

/// Checked Buffer update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPost {
    pub profile_id: String,
    pub text: String,
    pub media: Option<String>,
    pub scheduled_at: Option<OffsetDateTime>,
    pub top: bool,
}

impl BufferRequest {
    pub fn validate(&self, now: OffsetDateTime) -> Result<BufferPost, ValidationError> {
        let profile_id = validate::required("profile_id", &self.profile_id)?.to_string();
        let text = validate::caption("text", &self.text)?;

        let media = validate::optional(self.media.as_deref())
            .map(|url| validate::http_url("media", url))
            .transpose()?;

        let scheduled_at = self
            .scheduled_at
            .map(|seconds| {
                let at = validate::unix_timestamp("scheduled_at", seconds)?;
                validate::future_instant(at, now, None)
            })
            .transpose()?;

        Ok(BufferPost {
            profile_id,
            text,
            media,
            scheduled_at,
            top: self.top,
        })
    }
}
