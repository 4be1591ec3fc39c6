//! Field-level input checks shared by the provider request types

use regex::Regex;
use std::sync::LazyLock;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::model::{CAPTION_MAX_CHARS, MAX_MEDIA_URLS};
use crate::ports::ValidationError;

static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid regex"));

/// Trim a required field, rejecting empty or whitespace-only values
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed)
}

/// Trim an optional field; blank values count as absent
pub fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check a caption is present and within the Instagram character limit
pub fn caption(field: &'static str, text: &str) -> Result<String, ValidationError> {
    let text = required(field, text)?;
    let len = text.chars().count();
    if len > CAPTION_MAX_CHARS {
        return Err(ValidationError::CaptionTooLong {
            len,
            max: CAPTION_MAX_CHARS,
        });
    }
    Ok(text.to_string())
}

/// Check a URL uses the http or https scheme
pub fn http_url(field: &'static str, url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() => Ok(url.to_string()),
        _ => Err(ValidationError::InvalidUrlScheme {
            field,
            url: url.to_string(),
        }),
    }
}

/// Check a media list: at most ten entries, each an http(s) URL
pub fn media_urls(field: &'static str, urls: &[String]) -> Result<Vec<String>, ValidationError> {
    if urls.len() > MAX_MEDIA_URLS {
        return Err(ValidationError::TooManyMedia {
            count: urls.len(),
            max: MAX_MEDIA_URLS,
        });
    }
    urls.iter().map(|url| http_url(field, url)).collect()
}

/// Parse a `YYYY-MM-DD` date
pub fn schedule_date(value: &str) -> Result<Date, ValidationError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Parse a 24-hour `HH:MM` time; a single-digit hour is accepted
pub fn schedule_time(value: &str) -> Result<Time, ValidationError> {
    let invalid = || ValidationError::InvalidTime {
        value: value.to_string(),
    };

    let captures = TIME_OF_DAY.captures(value.trim()).ok_or_else(invalid)?;
    let hour: u8 = captures[1].parse().map_err(|_| invalid())?;
    let minute: u8 = captures[2].parse().map_err(|_| invalid())?;

    Time::from_hms(hour, minute, 0).map_err(|_| invalid())
}

/// Combine a separate date and time into a UTC instant
///
/// Both halves must be given together; neither given means "post now".
pub fn schedule_pair(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<Option<OffsetDateTime>, ValidationError> {
    match (optional(date), optional(time)) {
        (None, None) => Ok(None),
        (Some(date), Some(time)) => {
            let date = schedule_date(date)?;
            let time = schedule_time(time)?;
            Ok(Some(PrimitiveDateTime::new(date, time).assume_utc()))
        }
        _ => Err(ValidationError::PartialSchedule),
    }
}

/// Parse an ISO-8601 instant; values without an offset are taken as UTC
pub fn iso_instant(field: &'static str, value: &str) -> Result<OffsetDateTime, ValidationError> {
    let value = value.trim();

    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(instant);
    }

    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    })
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|_| ValidationError::InvalidInstant {
        field,
        value: value.to_string(),
    })
}

/// Convert a Unix timestamp in seconds
pub fn unix_timestamp(field: &'static str, seconds: i64) -> Result<OffsetDateTime, ValidationError> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| ValidationError::InvalidInstant {
        field,
        value: seconds.to_string(),
    })
}

/// Require an instant strictly after `now` and, optionally, within a horizon
pub fn future_instant(
    instant: OffsetDateTime,
    now: OffsetDateTime,
    max_days: Option<u32>,
) -> Result<OffsetDateTime, ValidationError> {
    if instant <= now {
        return Err(ValidationError::NotInFuture {
            value: format_instant(instant),
            now: format_instant(now),
        });
    }

    if let Some(max_days) = max_days {
        if instant > now + Duration::days(i64::from(max_days)) {
            return Err(ValidationError::BeyondHorizon { max_days });
        }
    }

    Ok(instant)
}

/// Reject instants more than `max_days` whole days after `now`
///
/// Partial days are not counted, so `max_days` days and 23 hours still pass.
pub fn within_whole_days(
    instant: OffsetDateTime,
    now: OffsetDateTime,
    max_days: u32,
) -> Result<OffsetDateTime, ValidationError> {
    if (instant - now).whole_days() > i64::from(max_days) {
        return Err(ValidationError::BeyondHorizon { max_days });
    }
    Ok(instant)
}

/// Format an instant as RFC 3339 (`2030-01-02T03:04:00Z` for UTC)
pub fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.unix_timestamp().to_string())
}
