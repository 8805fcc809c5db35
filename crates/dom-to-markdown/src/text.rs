//! Text escaping and whitespace normalisation.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_BLOCK_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([#+\-=>])").expect("valid regex"));

static ENTITY_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("valid regex"));

static LEADING_ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*[0-9]+)\.").expect("valid regex"));

/// Characters escaped wherever they appear.
const ALWAYS_ESCAPED: [char; 7] = ['*', '<', '[', '\\', '_', '`', '~'];

/// Escape characters that would otherwise be read as Markdown syntax.
///
/// Applied in order:
/// 1. `*`, `<`, `[`, `\`, `_`, backtick and `~` anywhere in the text;
/// 2. a leading `# + - = >` (after optional whitespace);
/// 3. the `&` opening an entity-shaped run such as `&amp;` or `&#42;`;
/// 4. a `.` directly after a leading run of digits (after optional whitespace).
///
/// Nothing else is altered.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        if ALWAYS_ESCAPED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    let escaped = replace_cow(&escaped, &LEADING_BLOCK_MARKER, "$1\\$2");
    let escaped = replace_cow(&escaped, &ENTITY_LIKE, "\\&$1;");
    replace_cow(&escaped, &LEADING_ORDINAL, "$1\\.").into_owned()
}

fn replace_cow<'a>(text: &'a str, pattern: &Regex, replacement: &str) -> Cow<'a, str> {
    pattern.replace_all(text, replacement)
}

/// Collapse every whitespace run (newlines included) to one space and trim the ends.
pub fn normalise(text: &str) -> String {
    let mut normalised = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !normalised.is_empty() {
            normalised.push(' ');
        }
        normalised.push_str(word);
    }
    normalised
}

/// Whether `text` has any non-whitespace content.
pub fn is_present(text: &str) -> bool {
    text.chars().any(|ch| !ch.is_whitespace())
}
