//! Response normalization: HTTP status + body into success payload or [`PostError`]

use serde_json::Value;

use crate::model::Provider;
use crate::ports::PostError;

const SNIPPET_CHARS: usize = 500;

/// Classify a provider response
///
/// Only 200 yields the parsed body (`Value::Null` when empty, `Value::String`
/// when not JSON). Every other status, other 2xx included, maps to its error class.
pub fn classify(provider: Provider, status: u16, body: &str) -> Result<Value, PostError> {
    if status == 200 {
        return Ok(parse_body(body));
    }

    let error = match status {
        400 => PostError::Payload {
            message: provider_message(body)
                .or_else(|| non_empty(snippet(body)))
                .unwrap_or_else(|| "invalid parameters or data format".to_string()),
        },
        401 => PostError::Auth {
            detail: provider_message(body).unwrap_or_default(),
        },
        403 => PostError::Permission {
            detail: provider_message(body).unwrap_or_default(),
        },
        429 => PostError::RateLimited {
            cap: provider.rate_limit_note().to_string(),
        },
        500.. => PostError::Server {
            status,
            detail: provider_message(body).unwrap_or_else(|| snippet(body)),
        },
        _ => PostError::UnexpectedStatus {
            status,
            detail: provider_message(body).unwrap_or_else(|| snippet(body)),
        },
    };

    tracing::warn!(
        provider = %provider,
        status,
        kind = ?error.kind(),
        "Provider returned an error status"
    );
    Err(error)
}

/// Parse a body leniently
pub fn parse_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Extract the provider's own error message from a JSON error body
pub fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;

    const PATHS: &[&[&str]] = &[
        &["message"],
        &["error", "message"],
        &["error"],
        &["errors", "0", "message"],
        &["errors", "0"],
        &["details"],
    ];

    PATHS
        .iter()
        .filter_map(|path| lookup(&value, path))
        .find_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// First identifier found at any of `paths`; numbers are stringified
pub fn find_id(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Walk object keys and array indices
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Trimmed body, cut to a loggable length
pub fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_success_parses_json() {
        let value = classify(Provider::Ayrshare, 200, r#"{"id": "abc"}"#).unwrap();
        assert_eq!(value, json!({"id": "abc"}));
        assert_eq!(classify(Provider::Late, 200, "").unwrap(), Value::Null);
        assert_eq!(
            classify(Provider::Zapier, 200, "ok").unwrap(),
            Value::String("ok".into())
        );
    }

    #[test]
    fn test_other_success_codes_are_errors() {
        for status in [201, 202, 204] {
            let error = classify(Provider::Ayrshare, status, r#"{"id": "ayr_1"}"#).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Unexpected);
            assert_eq!(error.status(), Some(status));
        }
    }

    #[test]
    fn test_rate_limit_names_provider_cap_for_every_provider() {
        for provider in [
            Provider::Ayrshare,
            Provider::Buffer,
            Provider::InstagramGraph,
            Provider::Late,
            Provider::Zapier,
        ] {
            let error = classify(provider, 429, "").unwrap_err();
            assert_eq!(error.kind(), ErrorKind::RateLimit);
            assert!(error.to_string().contains(provider.rate_limit_note()));
        }
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(
            classify(Provider::Late, 401, "").unwrap_err().kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            classify(Provider::Late, 403, "").unwrap_err().kind(),
            ErrorKind::Permission
        );
        assert_eq!(
            classify(Provider::Late, 502, "bad gateway").unwrap_err(),
            PostError::Server {
                status: 502,
                detail: "bad gateway".into()
            }
        );
        assert_eq!(
            classify(Provider::Zapier, 404, "").unwrap_err().kind(),
            ErrorKind::Unexpected
        );
    }

    #[test]
    fn test_bad_request_extracts_provider_message() {
        let ayrshare = classify(Provider::Ayrshare, 400, r#"{"message": "Post text too long"}"#);
        assert_eq!(
            ayrshare.unwrap_err(),
            PostError::Payload {
                message: "Post text too long".into()
            }
        );

        let graph = classify(
            Provider::InstagramGraph,
            400,
            r#"{"error": {"message": "Invalid image URL", "code": 9004}}"#,
        );
        assert_eq!(
            graph.unwrap_err(),
            PostError::Payload {
                message: "Invalid image URL".into()
            }
        );

        let raw = classify(Provider::Buffer, 400, "plain failure");
        assert_eq!(
            raw.unwrap_err(),
            PostError::Payload {
                message: "plain failure".into()
            }
        );

        let empty = classify(Provider::Buffer, 400, "");
        assert!(matches!(
            empty.unwrap_err(),
            PostError::Payload { message } if message.contains("invalid parameters")
        ));
    }

    #[test]
    fn test_find_id_walks_paths() {
        let body = json!({"updates": [{"id": "u1"}], "data": {"id": 42}});
        assert_eq!(
            find_id(&body, &[&["id"], &["updates", "0", "id"]]).as_deref(),
            Some("u1")
        );
        assert_eq!(find_id(&body, &[&["data", "id"]]).as_deref(), Some("42"));
        assert_eq!(find_id(&body, &[&["missing"]]), None);
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(600);
        let cut = snippet(&long);
        assert_eq!(cut.len(), 503);
        assert!(cut.ends_with("..."));
    }
}
