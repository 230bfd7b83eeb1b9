//! `?term` → search the web for `term`.

use super::{QueryAction, RouterResult, SPECIAL_PREFIX};

const PREFIX: char = '?';

pub fn handle_query(query: &str) -> Option<RouterResult> {
    let term = query.strip_prefix(PREFIX)?.trim();
    let mut result = RouterResult::consumed();

    if term.is_empty() {
        result.push(
            format!("{}web-search:hint", SPECIAL_PREFIX),
            "Type a term to search the web".into(),
            None,
        );
        return Some(result);
    }

    result.push(
        format!("{}web-search:{}", SPECIAL_PREFIX, form_urlencode(term)),
        format!("Search \"{}\" on the web", term),
        Some(QueryAction::WebSearch { term: term.to_string() }),
    );
    Some(result)
}

/// `application/x-www-form-urlencoded` encoding: unreserved characters
/// pass through, spaces become `+`, everything else is `%XX` per UTF-8
/// byte.
pub fn form_urlencode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Fill `template`'s `{query}` placeholder with the encoded `term`.
pub fn search_url(template: &str, term: &str) -> String {
    template.replace("{query}", &form_urlencode(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_web_search() {
        assert!(handle_query("firefox").is_none());
        assert!(handle_query("=1").is_none());
    }

    #[test]
    fn bare_prefix_gives_hint() {
        let result = handle_query("?   ").unwrap();
        assert!(result.consume);
        assert_eq!(result.items[0].0, "__special__:web-search:hint");
        assert!(result.actions.is_empty());
    }

    #[test]
    fn term_gives_search_row() {
        let result = handle_query("? rust traits").unwrap();
        let (id, label) = &result.items[0];
        assert_eq!(id, "__special__:web-search:rust+traits");
        assert_eq!(label, "Search \"rust traits\" on the web");
        assert_eq!(
            result.actions[id],
            QueryAction::WebSearch { term: "rust traits".into() }
        );
    }

    #[test]
    fn encoding() {
        assert_eq!(form_urlencode("a b&c=d"), "a+b%26c%3Dd");
        assert_eq!(form_urlencode("café"), "caf%C3%A9");
        assert_eq!(form_urlencode("x_y.z-~"), "x_y.z-~");
        assert_eq!(
            search_url("https://example.org/?q={query}", "a b"),
            "https://example.org/?q=a+b"
        );
    }
}
