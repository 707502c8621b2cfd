//! Byline discipline: attribution is recovered from a fixed HTML-comment prefix since
//! the forge attributes every write to one shared service-account identity.

const PREFIX: &str = "<!-- by:";
const SUFFIX: &str = " -->";

/// Prepends `<!-- by:<agent-id> -->\n` to `body`, byte-for-byte, before the body text.
pub fn with_byline(agent_id: &str, body: &str) -> String {
    format!("{PREFIX}{agent_id}{SUFFIX}\n{body}")
}

/// Splits a stored body back into `(byline_agent_id, rest)`. A body without a
/// recognizable byline line is returned whole, with `None` — the forge client must
/// never fail to read a post just because an older entry predates the convention.
pub fn parse_byline(stored: &str) -> (Option<String>, &str) {
    let Some(rest) = stored.strip_prefix(PREFIX) else {
        return (None, stored);
    };
    let Some(end) = rest.find(SUFFIX) else {
        return (None, stored);
    };
    let agent_id = &rest[..end];
    let after_suffix = &rest[end + SUFFIX.len()..];
    let body = after_suffix.strip_prefix('\n').unwrap_or(after_suffix);
    (Some(agent_id.to_string()), body)
}
