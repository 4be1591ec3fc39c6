//! Caption composition for providers without native hashtag/mention fields

/// Normalize a hashtag to `#tag`, whatever prefix the caller supplied
pub fn hashtag(tag: &str) -> Option<String> {
    prefixed('#', tag)
}

/// Normalize a username to `@user`
pub fn mention(user: &str) -> Option<String> {
    prefixed('@', user)
}

fn prefixed(marker: char, raw: &str) -> Option<String> {
    let bare = raw.trim().trim_start_matches(['#', '@']);
    if bare.is_empty() || bare.contains(char::is_whitespace) {
        return None;
    }
    Some(format!("{marker}{bare}"))
}

/// Whether `token` already appears as a whole word in `text`
fn contains_token(text: &str, token: &str) -> bool {
    text.split_whitespace()
        .map(|word| word.trim_end_matches(|c: char| c.is_ascii_punctuation() && c != '_'))
        .any(|word| word.eq_ignore_ascii_case(token))
}

/// Append mentions and hashtags that the text does not already contain
///
/// Mentions are appended on the caption's last line, hashtags on a new
/// paragraph after them.
pub fn compose(text: &str, hashtags: &[String], mentions: &[String]) -> String {
    let mut composed = text.trim().to_string();

    for token in mentions.iter().filter_map(|m| mention(m)) {
        if !contains_token(&composed, &token) {
            composed.push(' ');
            composed.push_str(&token);
        }
    }

    let mut tags: Vec<String> = Vec::new();
    for token in hashtags.iter().filter_map(|t| hashtag(t)) {
        let duplicate = tags.iter().any(|t| t.eq_ignore_ascii_case(&token));
        if !duplicate && !contains_token(&composed, &token) {
            tags.push(token);
        }
    }

    if !tags.is_empty() {
        composed.push_str("\n\n");
        composed.push_str(&tags.join(" "));
    }

    composed
}
