use std::sync::OnceLock;

use regex::Regex;
use scraper::ElementRef;

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Collapse runs of whitespace (including `&nbsp;`) into single spaces.
pub fn normalize(raw: &str) -> String {
    whitespace()
        .replace_all(raw, " ")
        .trim()
        .to_string()
}

/// Concatenated, normalized text of an element and all its descendants.
pub fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    normalize(&raw)
}
