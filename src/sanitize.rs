//! Cleanup applied to raw completion text before any parsing is attempted.

use regex::Regex;
use std::sync::LazyLock;

static RE_TAGGED_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```json\s*").expect("valid tagged fence pattern"));

static RE_BARE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*").expect("valid bare fence pattern"));

static RE_INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{200B}-\u{200D}\u{2060}\u{FEFF}]").expect("valid invisible pattern")
});

static RE_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F]").expect("valid control pattern"));

/// Make generated text safe to hand to a strict parser.
///
/// Steps run in a fixed order: code fences, invisible characters, ASCII
/// control characters (each becomes one space), line endings, surrounding
/// whitespace. Never fails and is idempotent.
pub fn sanitize(text: &str) -> String {
    let without_fences = strip_fences(text);
    let visible = RE_INVISIBLE.replace_all(&without_fences, "");

    // Invisible characters can sit inside a fence ("``\u{200B}`").
    let visible = if visible.len() != without_fences.len() {
        strip_fences(&visible)
    } else {
        visible.into_owned()
    };

    let spaced = RE_CONTROL.replace_all(&visible, " ");
    normalize_line_endings(&spaced).trim().to_string()
}

fn strip_fences(text: &str) -> String {
    let untagged = RE_TAGGED_FENCE.replace_all(text, "");
    RE_BARE_FENCE.replace_all(&untagged, "").into_owned()
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
