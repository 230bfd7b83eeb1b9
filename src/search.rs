//! Query normalisation, term filtering and match highlighting.
//!
//! A query is split into whitespace-separated terms; an item matches when
//! **every** term occurs in it as a case-insensitive substring.  The
//! clipboard panel matches on plain lowercase text, the launcher on the
//! accent-insensitive [`fold`]ed form.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Trim and lowercase a raw search string.
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split a query into its non-empty, normalised terms.
pub fn extract_terms(query: &str) -> Vec<String> {
    normalize_query(query)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Accent- and case-insensitive search key.
///
/// Decomposes to NFD, drops combining marks and lowercases, so `"Café"`
/// and `"cafe"` fold to the same key.  The letters whose case fold is not
/// their lowercase form (`ß`, `ſ`, `ς`) are folded as well.
pub fn fold(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase) {
        match c {
            'ß' => key.push_str("ss"),
            'ſ' => key.push('s'),
            'ς' => key.push('σ'),
            c => key.push(c),
        }
    }
    key
}

/// Whether `haystack` contains every (already lowercased) term.
pub fn matches_all(haystack: &str, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let lowered = haystack.to_lowercase();
    terms.iter().all(|t| lowered.contains(t.as_str()))
}

/// An item that survived filtering, with its position in the unfiltered
/// list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCandidate {
    pub index: usize,
    pub id: String,
    pub content: String,
}

/// Filter `(id, content)` pairs by `terms`, keeping at most `max_items`.
pub fn build_render_candidates<'a, I>(items: I, terms: &[String], max_items: usize) -> Vec<RenderCandidate>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    items
        .into_iter()
        .enumerate()
        .filter(|(_, (_, content))| matches_all(content, terms))
        .take(max_items)
        .map(|(index, (id, content))| RenderCandidate {
            index,
            id: id.to_string(),
            content: content.to_string(),
        })
        .collect()
}

/// Escape text for use inside Pango markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape `text` and wrap every case-insensitive occurrence of any term in
/// `<b>…</b>`.
///
/// Matches of different terms that overlap or touch are merged into one
/// span, so no character is wrapped twice and tags never nest.
pub fn highlight_markup_multi(text: &str, terms: &[String]) -> String {
    let terms: Vec<String> = terms
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return escape_markup(text);
    }

    // Lowercasing can change byte lengths, so keep a map from each source
    // char to where its lowercase form starts.
    let mut lowered = String::with_capacity(text.len());
    let mut chars: Vec<(usize, usize, usize)> = Vec::new(); // (lowered start, source start, source end)
    for (i, c) in text.char_indices() {
        chars.push((lowered.len(), i, i + c.len_utf8()));
        lowered.extend(c.to_lowercase());
    }
    let source_char_at = |lowered_pos: usize| {
        let slot = chars.partition_point(|&(start, _, _)| start <= lowered_pos);
        chars[slot.saturating_sub(1)]
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for term in &terms {
        for (pos, _) in lowered.match_indices(term.as_str()) {
            let (_, start, _) = source_char_at(pos);
            let (_, _, end) = source_char_at(pos + term.len() - 1);
            ranges.push((start, end));
        }
    }
    if ranges.is_empty() {
        return escape_markup(text);
    }

    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len() + merged.len() * 7);
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&escape_markup(&text[cursor..start]));
        out.push_str("<b>");
        out.push_str(&escape_markup(&text[start..end]));
        out.push_str("</b>");
        cursor = end;
    }
    out.push_str(&escape_markup(&text[cursor..]));
    out
}
