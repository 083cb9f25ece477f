//! Small string helpers shared by the extractors.

use std::borrow::Cow;

/// Zero width characters that show up in copy-pasted text.
const ZERO_WIDTH: [char; 6] = [
    '\u{180E}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}',
];

/// Escapes `& < > " '` for safe inclusion in HTML text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replaces exotic horizontal spaces (NBSP, ideographic space, tabs...) with a
/// plain ASCII space and drops zero width characters. Newlines are kept.
pub fn normalize_whitespace(text: &str) -> String {
    text.chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .map(|c| if c.is_whitespace() && c != '\n' { ' ' } else { c })
        .collect()
}

/// Collapses `\r\n` to `\n` and drops any remaining bare `\r`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "")
}

/// Percent-decodes `url`. Sequences that don't decode to UTF-8 leave the input untouched.
pub fn unescape_url(url: &str) -> Cow<'_, str> {
    urlencoding::decode(url).unwrap_or(Cow::Borrowed(url))
}
