//! Encoding of a [`TranslationSet`] into the single persisted text of an encoded slot.
//!
//! The wire format is a run of locale-tagged spans with no separator:
//!
//! ```text
//! <fr>Bonjour</fr><de>Hallo</de>
//! ```
//!
//! Inside a span only the span's own closing marker is escaped: `</fr>` in a
//! `fr` text is written as `<\/fr>`, and every `<`, run of backslashes and
//! `/fr>` gains one more backslash so the escape stays reversible. All other
//! content, markup and entities included, is written as is.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::TranslationSet;

lazy_static! {
    static ref OPENING_MARKER_REGEX: Regex = Regex::new(r"<([^<>/]+)>").unwrap();
}

/// Serializes every non-main, non-empty entry of `translations` in mapping order.
///
/// # Example
///
/// ```rust
/// use translatable_fields::{TranslationSet, codec};
///
/// let set = TranslationSet::from([("en", "Hello"), ("fr", "Bonjour")]);
/// assert_eq!(codec::encode(&set, "en"), "<fr>Bonjour</fr>");
/// ```
pub fn encode(translations: &TranslationSet, main_locale: &str) -> String {
    let mut out = String::new();
    for (locale, text) in translations.iter() {
        if locale == main_locale || text.is_empty() {
            continue;
        }
        out.push('<');
        out.push_str(locale);
        out.push('>');
        out.push_str(&escape_text(text, locale));
        out.push_str("</");
        out.push_str(locale);
        out.push('>');
    }
    out
}

/// Parses an encoded slot back into a [`TranslationSet`].
///
/// Parsing is tolerant: content outside a recognized span and spans that are
/// never closed are ignored. A span's text ends at the first closing marker of
/// the same locale. Never fails.
pub fn decode(blob: &str) -> TranslationSet {
    let mut translations = TranslationSet::new();
    let mut position = 0;

    while let Some(captures) = OPENING_MARKER_REGEX.captures_at(blob, position) {
        let (Some(opening), Some(locale)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let locale = locale.as_str();
        let closing = format!("</{}>", locale);

        match blob[opening.end()..].find(&closing) {
            Some(offset) => {
                let text_end = opening.end() + offset;
                translations.insert(locale, unescape_text(&blob[opening.end()..text_end], locale));
                position = text_end + closing.len();
            }
            None => {
                tracing::trace!(locale, "dropping unterminated span");
                position = opening.start() + 1;
            }
        }
    }

    translations
}

/// Builds the `LIKE` pattern matching any encoded slot that holds a span for `locale`.
pub fn span_pattern(locale: &str) -> String {
    format!("%<{}>%</{}>%", locale, locale)
}

fn escape_text(text: &str, locale: &str) -> String {
    let marker = format!("/{}>", locale);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('<') {
        out.push_str(&rest[..=index]);
        let after = &rest[index + 1..];
        let backslashes = after.len() - after.trim_start_matches('\\').len();
        if after[backslashes..].starts_with(&marker) {
            out.push('\\');
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn unescape_text(text: &str, locale: &str) -> String {
    let marker = format!("/{}>", locale);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('<') {
        out.push_str(&rest[..=index]);
        let after = &rest[index + 1..];
        let backslashes = after.len() - after.trim_start_matches('\\').len();
        rest = if backslashes > 0 && after[backslashes..].starts_with(&marker) {
            &after[1..]
        } else {
            after
        };
    }
    out.push_str(rest);
    out
}
