//! JSX text helpers: attribute and text escaping, styles, indented output.

use std::fmt::Write;

use serde_json::Value;
use weaver_core::Layout;

/// Render a prop value as the right-hand side of a JSX attribute.
///
/// Plain strings become `"…"`; strings that would need escaping, and every
/// other value, become a `{…}` expression holding JSON.
#[must_use]
pub fn attr_value(value: &Value) -> String {
    match value {
        Value::String(s) if is_plain(s, &['"', '\\', '{', '}', '\n', '\r']) => format!("\"{s}\""),
        other => format!("{{{other}}}"),
    }
}

/// `key=value` for a prop value.
#[must_use]
pub fn attr(key: &str, value: &Value) -> String {
    format!("{key}={}", attr_value(value))
}

/// `key={expr}` for a JavaScript expression.
#[must_use]
pub fn expr_attr(key: &str, expr: &str) -> String {
    format!("{key}={{{expr}}}")
}

/// Render text as JSX child content.
#[must_use]
pub fn text(s: &str) -> String {
    if is_plain(s, &['{', '}', '<', '>', '\n', '\r']) {
        s.to_string()
    } else {
        format!("{{{}}}", Value::from(s))
    }
}

/// Check whether a prop name can be written as a JSX attribute.
#[must_use]
pub fn is_attr_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-' | ':'))
}

/// JSX comment expression that cannot be closed early by its content.
#[must_use]
pub fn comment(s: &str) -> String {
    format!("{{/* {} */}}", s.replace("*/", "* /"))
}

/// Absolute-position style attribute; `zIndex` only for top-level nodes.
#[must_use]
pub fn style(layout: &Layout, top_level: bool) -> String {
    let mut style = format!(
        "style={{{{ position: 'absolute', left: {}, top: {}, width: {}, height: {}",
        layout.x, layout.y, layout.width, layout.height
    );
    if top_level {
        let _ = write!(style, ", zIndex: {}", layout.z_index);
    }
    style.push_str(" }}");
    style
}

/// `<Tag a b>`.
#[must_use]
pub fn open_tag(tag: &str, attrs: &[String]) -> String {
    if attrs.is_empty() {
        format!("<{tag}>")
    } else {
        format!("<{tag} {}>", attrs.join(" "))
    }
}

/// `<Tag a b />`.
#[must_use]
pub fn self_closing(tag: &str, attrs: &[String]) -> String {
    if attrs.is_empty() {
        format!("<{tag} />")
    } else {
        format!("<{tag} {} />", attrs.join(" "))
    }
}

/// `<Tag a b>content</Tag>`.
#[must_use]
pub fn inline(tag: &str, attrs: &[String], content: &str) -> String {
    format!("{}{content}</{tag}>", open_tag(tag, attrs))
}

fn is_plain(s: &str, specials: &[char]) -> bool {
    !s.contains(specials)
}

/// Line-oriented writer with indentation by depth.
#[derive(Debug)]
pub struct JsxWriter {
    buf: String,
    indent_width: usize,
}

impl JsxWriter {
    /// Create a writer indenting `indent_width` spaces per level.
    #[must_use]
    pub fn new(indent_width: usize) -> Self {
        Self {
            buf: String::with_capacity(4096),
            indent_width,
        }
    }

    /// Write one line at the given depth.
    pub fn line(&mut self, depth: usize, content: &str) {
        let _ = writeln!(
            self.buf,
            "{:width$}{content}",
            "",
            width = depth * self.indent_width
        );
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Take the written text.
    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attr_strings() {
        assert_eq!(attr("variant", &json!("outline")), "variant=\"outline\"");
        assert_eq!(
            attr("title", &json!("say \"hi\"")),
            "title={\"say \\\"hi\\\"\"}"
        );
        assert_eq!(attr("x", &json!("{oops}")), "x={\"{oops}\"}");
    }

    #[test]
    fn test_attr_literals() {
        assert_eq!(attr("step", &json!(1)), "step={1}");
        assert_eq!(attr("checked", &json!(false)), "checked={false}");
        assert_eq!(attr("x", &Value::Null), "x={null}");
        assert_eq!(
            attr("items", &json!([{ "value": "a" }])),
            "items={[{\"value\":\"a\"}]}"
        );
    }

    #[test]
    fn test_text() {
        assert_eq!(text("Click me"), "Click me");
        assert_eq!(text("a < b"), "{\"a < b\"}");
        assert_eq!(text("{x}"), "{\"{x}\"}");
    }

    #[test]
    fn test_attr_names() {
        assert!(is_attr_name("data-ai-hint"));
        assert!(is_attr_name("className"));
        assert!(!is_attr_name("1x"));
        assert!(!is_attr_name("has space"));
        assert!(!is_attr_name(""));
    }

    #[test]
    fn test_comment_cannot_escape() {
        assert_eq!(comment("a */ b"), "{/* a * / b */}");
    }

    #[test]
    fn test_style() {
        let layout = Layout {
            x: 20,
            y: 40,
            width: 120,
            height: 40,
            z_index: 3,
        };
        assert_eq!(
            style(&layout, true),
            "style={{ position: 'absolute', left: 20, top: 40, width: 120, height: 40, zIndex: 3 }}"
        );
        assert_eq!(
            style(&layout, false),
            "style={{ position: 'absolute', left: 20, top: 40, width: 120, height: 40 }}"
        );
    }

    #[test]
    fn test_tags() {
        let attrs = vec!["a=\"1\"".to_string()];
        assert_eq!(open_tag("Card", &[]), "<Card>");
        assert_eq!(self_closing("Input", &attrs), "<Input a=\"1\" />");
        assert_eq!(inline("p", &attrs, "hi"), "<p a=\"1\">hi</p>");
    }

    #[test]
    fn test_writer_indents() {
        let mut out = JsxWriter::new(2);
        out.line(0, "a");
        out.line(2, "b");
        out.blank();
        assert_eq!(out.finish(), "a\n    b\n\n");
    }
}
