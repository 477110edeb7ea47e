//! Plain-text cleanup for metadata values.
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("regex for markup tags"))
}

fn entity_regex() -> &'static Regex {
    static ENTITIES: OnceLock<Regex> = OnceLock::new();
    ENTITIES.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);")
            .expect("regex for character references")
    })
}

/// Drop markup tags, decode character references, and collapse whitespace.
///
/// The result is plain text; escaping is left to the XML serializer so each
/// value is escaped exactly once.
pub fn strip_html(raw: &str) -> String {
    let without_tags = tag_regex().replace_all(raw, "");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric character references in one pass.
pub fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            decode_entity(body).unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "copy" => "\u{a9}",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Two-letter primary language subtag of a locale such as `en_US`.
pub fn primary_subtag(locale: &str) -> String {
    locale
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .chars()
        .take(2)
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
