//! Output escaping for `{{...}}` tags.

/// Escapes the output of double-brace replacements and helpers.
pub trait Escaper: Send + Sync {
    fn escape(&self, input: &str) -> String;
}

/// Escapes the characters significant in HTML text and attribute values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn escape(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '&' => output.push_str("&amp;"),
                '<' => output.push_str("&lt;"),
                '>' => output.push_str("&gt;"),
                '"' => output.push_str("&quot;"),
                '\'' => output.push_str("&#x27;"),
                '`' => output.push_str("&#x60;"),
                '=' => output.push_str("&#x3D;"),
                other => output.push(other),
            }
        }
        output
    }
}

/// Leaves output untouched, for non-HTML templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscape;

impl Escaper for NoEscape {
    fn escape(&self, input: &str) -> String {
        input.to_string()
    }
}
