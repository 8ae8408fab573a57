use super::value::{JsonNumber, JsonValue};

/// Default indent unit of written files.
pub const DEFAULT_INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    empty: bool,
    inline: bool,
}

/// Streaming pretty printer.
///
/// Values are written one token at a time, like
/// `begin_object` / `name` / `string` / `end_object`. Containers started while
/// inline mode is active are rendered on a single line.
///
/// Strings are escaped by `serde_json`, which leaves HTML characters alone.
/// Numbers are written as their literal text.
#[derive(Debug)]
pub struct JsonWriter {
    out: String,
    indent: String,
    stack: Vec<Frame>,
    inline: bool,
    after_name: bool,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT)
    }
}

impl JsonWriter {
    pub fn new(indent: &str) -> Self {
        Self {
            out: String::new(),
            indent: indent.to_string(),
            stack: Vec::new(),
            inline: false,
            after_name: false,
        }
    }

    /// Consumes the writer and returns the produced text.
    pub fn into_string(self) -> String {
        debug_assert!(self.stack.is_empty(), "unclosed JSON container");
        self.out
    }

    pub fn begin_object(&mut self) -> &mut Self {
        self.open(Container::Object, '{')
    }

    pub fn end_object(&mut self) -> &mut Self {
        self.close(Container::Object, '}')
    }

    pub fn begin_array(&mut self) -> &mut Self {
        self.open(Container::Array, '[')
    }

    pub fn end_array(&mut self) -> &mut Self {
        self.close(Container::Array, ']')
    }

    /// Writes the name of the next object entry.
    pub fn name(&mut self, name: &str) -> &mut Self {
        debug_assert!(
            matches!(self.stack.last(), Some(f) if f.container == Container::Object),
            "name outside of an object"
        );
        self.separate();
        self.write_escaped(name);
        self.out.push_str(": ");
        self.after_name = true;
        self
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.before_value();
        self.write_escaped(value);
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.before_value();
        self.out.push_str(if value { "true" } else { "false" });
        self
    }

    pub fn null(&mut self) -> &mut Self {
        self.before_value();
        self.out.push_str("null");
        self
    }

    pub fn number(&mut self, value: &JsonNumber) -> &mut Self {
        self.before_value();
        self.out.push_str(value.as_str());
        self
    }

    /// Writes a whole value tree using the current layout mode.
    pub fn value(&mut self, value: &JsonValue) -> &mut Self {
        match value {
            JsonValue::Null => self.null(),
            JsonValue::Bool(b) => self.bool(*b),
            JsonValue::Number(n) => self.number(n),
            JsonValue::String(s) => self.string(s),
            JsonValue::Array(items) => {
                self.begin_array();
                for item in items {
                    self.value(item);
                }
                self.end_array()
            }
            JsonValue::Object(entries) => {
                self.begin_object();
                for (name, item) in entries {
                    self.name(name);
                    self.value(item);
                }
                self.end_object()
            }
        }
    }

    /// Writes a value tree, on a single line when `inline` is set.
    pub fn value_inline(&mut self, value: &JsonValue, inline: bool) -> &mut Self {
        let previous = self.inline;
        self.inline = previous || inline;
        self.value(value);
        self.inline = previous;
        self
    }

    fn open(&mut self, container: Container, token: char) -> &mut Self {
        self.before_value();
        self.out.push(token);
        self.stack.push(Frame {
            container,
            empty: true,
            inline: self.inline,
        });
        self
    }

    fn close(&mut self, container: Container, token: char) -> &mut Self {
        let frame = self.stack.pop();
        debug_assert!(
            matches!(&frame, Some(f) if f.container == container),
            "mismatched JSON container"
        );
        if let Some(frame) = frame {
            if !frame.empty && !frame.inline {
                self.newline();
            }
        }
        self.out.push(token);
        self
    }

    /// Comma and line break ahead of an entry in the innermost container.
    fn separate(&mut self) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let first = frame.empty;
        let inline = frame.inline;
        frame.empty = false;
        if !first {
            self.out.push(',');
        }
        if inline {
            if !first {
                self.out.push(' ');
            }
        } else {
            self.newline();
        }
    }

    fn before_value(&mut self) {
        if self.after_name {
            self.after_name = false;
            return;
        }
        self.separate();
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.stack.len() {
            self.out.push_str(&self.indent);
        }
    }

    fn write_escaped(&mut self, value: &str) {
        // serializing a str can not fail
        let escaped = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
        self.out.push_str(&escaped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    #[test]
    fn test_pretty_object() {
        let mut w = JsonWriter::default();
        w.begin_object();
        w.name("a").number(&1i32.into());
        w.name("b").begin_array().string("x").bool(false).end_array();
        w.name("c").begin_object().end_object();
        w.end_object();
        assert_eq!(
            w.into_string(),
            "{\n  \"a\": 1,\n  \"b\": [\n    \"x\",\n    false\n  ],\n  \"c\": {}\n}"
        );
    }

    #[test]
    fn test_inline_array() {
        let value = parse(r#"[1, 2, {"k": [3]}]"#).unwrap();
        let mut w = JsonWriter::new("    ");
        w.begin_object();
        w.name("value").value_inline(&value, true);
        w.end_object();
        assert_eq!(
            w.into_string(),
            "{\n    \"value\": [1, 2, {\"k\": [3]}]\n}"
        );
    }

    #[test]
    fn test_escaping_keeps_html() {
        let mut w = JsonWriter::default();
        w.string("<a href=\"x\">&'</a>\n\u{1}");
        assert_eq!(w.into_string(), r#""<a href=\"x\">&'</a>\n\u0001""#);
    }

    #[test]
    fn test_escaping_names_and_unicode() {
        let mut w = JsonWriter::default();
        w.begin_object().name("a\"b\\c").string("é😀\t").end_object();
        let text = w.into_string();
        assert!(text.contains(r#""a\"b\\c": "é😀\t""#));
        let back = parse(&text).unwrap();
        assert_eq!(back.get("a\"b\\c").and_then(JsonValue::as_str), Some("é😀\t"));
    }

    #[test]
    fn test_output_parses_back() {
        let source = parse(r#"{"x": [NaN, -Infinity, 1.5], "y": {"z": null}, "w": []}"#).unwrap();
        let mut w = JsonWriter::default();
        w.value(&source);
        assert_eq!(parse(&w.into_string()).unwrap(), source);
    }
}
