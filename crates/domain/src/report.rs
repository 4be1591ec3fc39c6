//! Human-readable report rendered on top of a [`PostResult`]

use time::OffsetDateTime;

use crate::model::{Outcome, PostResult};
use crate::validate::format_instant;

/// Request facts the result itself does not carry
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    /// Account handle, e.g. `@brand`
    pub account: Option<String>,
    /// Free-form scheduling description, e.g. `1:10 PM EST`
    pub schedule: Option<String>,
    pub content_chars: usize,
    pub media_count: usize,
    pub hashtag_count: usize,
}

/// Render a multi-line status report
pub fn render(result: &PostResult, context: &ReportContext, timestamp: OffsetDateTime) -> String {
    let mut lines = Vec::new();

    match result.outcome {
        Outcome::Success => lines.push(format!("✅ SUCCESS: {}", result.message)),
        Outcome::Error => lines.push(format!("❌ FAILURE: {}", result.message)),
    }
    lines.push(format!("📅 Timestamp: {}", format_instant(timestamp)));

    if let Some(account) = &context.account {
        lines.push(format!("📱 Account: {}", account));
    }

    let schedule = match (&context.schedule, result.scheduled_for) {
        (Some(label), _) => label.clone(),
        (None, Some(at)) => format_instant(at),
        (None, None) => "immediate".to_string(),
    };
    lines.push(format!("⏰ Posting time: {}", schedule));

    lines.push(format!("📝 Content length: {} characters", context.content_chars));
    lines.push(format!("📸 Media URLs: {} items", context.media_count));
    lines.push(format!("🏷️ Hashtags: {} items", context.hashtag_count));

    if let Some(id) = &result.post_id {
        lines.push(format!("🆔 Post ID: {}", id));
    }
    if let Some(url) = &result.url {
        lines.push(format!("🔗 Post URL: {}", url));
    }
    if let Some(raw) = &result.raw_response {
        lines.push(format!("📄 Provider response: {}", raw));
    }
    if let Some(error) = &result.error {
        if let Some(status) = error.status {
            lines.push(format!("🌐 Status code: {}", status));
        }
        if let Some(suggestion) = &error.suggestion {
            lines.push(format!("💡 Suggestion: {}", suggestion));
        }
    }

    lines.join("\n")
}
