use regex::Regex;
use std::sync::OnceLock;

fn item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<(?:li|div|option|p)\b[^>]*>(.*?)</(?:li|div|option|p)\s*>")
            .expect("item pattern is valid")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"))
}

pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x60;", "`")
        .replace("&amp;", "&")
}

/// Text content of the list/option-like elements of a fragment, in document order.
pub fn list_item_texts(fragment: &str) -> Vec<String> {
    item_pattern()
        .captures_iter(fragment)
        .filter_map(|caps| caps.get(1))
        .map(|inner| {
            let stripped = tag_pattern().replace_all(inner.as_str(), "");
            let decoded = decode_entities(&stripped);
            decoded.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect()
}
