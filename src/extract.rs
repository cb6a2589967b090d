//! Patch extraction: raw model output to candidate source.

use std::sync::OnceLock;

use regex::Regex;

const FENCE: &str = "```";

/// First fenced block, optional language tag on the opening line.
fn fenced_block() -> Option<&'static Regex> {
    static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```[\w+#.-]*[ \t]*\r?\n(.*?)```").ok())
        .as_ref()
}

/// Interior of the first fenced block, trimmed. Without a fence, the raw
/// text with stray fence markers removed. Never fails.
pub fn extract(raw: &str) -> String {
    if let Some(captures) = fenced_block().and_then(|re| re.captures(raw))
        && let Some(body) = captures.get(1)
    {
        return body.as_str().trim().to_string();
    }
    raw.replace(FENCE, "").trim().to_string()
}
