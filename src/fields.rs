use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::config::DURATION_UNIT;

static ESTIMATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?").unwrap());

/// Emoji and pictograph blocks removed from labels before sanitizing.
static PICTOGRAPHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}", // emoticons
        r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
        r"\x{1F680}-\x{1F6FF}", // transport & map
        r"\x{1F700}-\x{1F77F}", // alchemical
        r"\x{1F780}-\x{1F7FF}", // geometric shapes extended
        r"\x{1F800}-\x{1F8FF}", // supplemental arrows-c
        r"\x{1F900}-\x{1F9FF}", // supplemental symbols & pictographs
        r"\x{1FA00}-\x{1FA6F}", // chess
        r"\x{1FA70}-\x{1FAFF}", // symbols & pictographs extended-a
        r"\x{2702}-\x{27B0}",   // dingbats
        r"\x{24C2}-\x{1F251}",  // enclosed characters
        "]+"
    ))
    .unwrap()
});

static LABEL_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]+").unwrap());

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Calendar date (`YYYY-MM-DD`, local time zone) of a millisecond epoch stamp.
/// Out-of-range input yields an empty string.
pub fn epoch_millis_to_date(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Todoist priority for an RTM priority code. `None` renders as a blank cell.
pub fn priority_rank(code: Option<&str>) -> Option<u8> {
    match code? {
        "P1" => Some(1),
        "P2" => Some(2),
        "P3" => Some(3),
        "PN" => Some(4),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub minutes: u64,
    pub unit: &'static str,
}

/// Minutes in a `PT{H}H{M}M` estimate. Anything else, including a zero estimate,
/// has no duration.
pub fn duration_minutes(estimate: Option<&str>) -> Option<Duration> {
    let caps = ESTIMATE_PATTERN.captures(estimate?)?;
    let part = |i: usize| -> Option<u64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let minutes = part(1)?.checked_mul(60)?.checked_add(part(2)?)?;
    (minutes > 0).then_some(Duration {
        minutes,
        unit: DURATION_UNIT,
    })
}

/// Reduce free text to `[A-Za-z0-9_-]` for file names, `#tag` and `@context` labels.
pub fn sanitize_label(text: &str) -> String {
    let without_pictographs = PICTOGRAPHS.replace_all(text, "");
    LABEL_DISALLOWED
        .replace_all(&without_pictographs, "_")
        .trim_matches('_')
        .to_string()
}

/// Turn bare http(s) URLs into markdown links labelled with the host and path.
/// A URL directly after `(` is taken to be a markdown link target already.
pub fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in BARE_URL.find_iter(text) {
        if text[..m.start()].ends_with('(') {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        let url = m.as_str();
        out.push_str(&format!("[{}]({url})", link_label(url)));
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

fn link_label(url: &str) -> &str {
    let label = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let label = label.strip_suffix('/').unwrap_or(label);
    label.strip_prefix("www.").unwrap_or(label)
}
