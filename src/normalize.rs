//! Text and URL normalization for extracted records.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static STRIP_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<.*?>").expect("tag-strip regex is valid"));

/// Strips HTML tag spans and decodes entities from a raw text field.
///
/// Unmatched `<` or `>` characters are left in place; the input is never
/// rejected. Empty input yields empty output.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let stripped = STRIP_TAGS.replace_all(raw, "");
    html_escape::decode_html_entities(stripped.as_ref()).into_owned()
}

/// Replaces literal spaces with `+` and percent-decodes the URL.
///
/// `+` characters are not treated as spaces by the decoder, so they
/// survive into the output. If decoding fails the input is returned
/// unchanged rather than failing the pipeline.
pub fn normalize_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let plussed = if raw.contains(' ') {
        Cow::Owned(raw.replace(' ', "+"))
    } else {
        Cow::Borrowed(raw)
    };
    match urlencoding::decode(&plussed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
