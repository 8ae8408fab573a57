//! Property comments.
//!
//! A comment is written under the `//` key of a property. One line is written
//! as a plain string, several lines as an array of strings.

use crate::{adapter::FieldView, error::ParseError, json::JsonValue};

/// Line length used by [`Comment::of`] and the default resolver.
pub const DEFAULT_LINE_LENGTH: usize = 80;

/// Immutable block of comment lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    lines: Vec<String>,
}

impl Comment {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Single line comment for short texts, wrapped and padded block for
    /// texts longer than [`DEFAULT_LINE_LENGTH`].
    pub fn of(text: &str) -> Self {
        if text.chars().count() > DEFAULT_LINE_LENGTH {
            Self::wrapped(text, DEFAULT_LINE_LENGTH, true)
        } else {
            Self::new([text])
        }
    }

    /// Wraps `text` to lines of at most `line_length` characters.
    ///
    /// With `pad` every line is right-padded with spaces to `line_length`.
    pub fn wrapped(text: &str, line_length: usize, pad: bool) -> Self {
        Self {
            lines: wrap(text, line_length, pad),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// No lines, or a single blank line.
    pub fn is_empty(&self) -> bool {
        match self.lines.as_slice() {
            [] => true,
            [line] => line.trim().is_empty(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self.lines.as_slice() {
            [line] => JsonValue::String(line.clone()),
            lines => JsonValue::Array(lines.iter().cloned().map(JsonValue::String).collect()),
        }
    }

    /// Reads either of the two shapes written by [`Comment::to_json`].
    pub fn from_json(value: &JsonValue) -> Result<Self, ParseError> {
        match value {
            JsonValue::String(line) => Ok(Self::new([line.as_str()])),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ParseError::Comment {
                            found: item.describe(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|lines| Self { lines }),
            other => Err(ParseError::Comment {
                found: other.describe(),
            }),
        }
    }
}

/// Greedy word wrap.
///
/// Words are appended to the current line while its length, counting the
/// separator after each word, stays within `line_length`. A word longer than
/// the limit gets a line of its own.
pub fn wrap(text: &str, line_length: usize, pad: bool) -> Vec<String> {
    let finish = |line: &str| {
        let line = line.trim_end();
        if pad {
            format!("{line:<line_length$}")
        } else {
            line.to_string()
        }
    };

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() || current_len + word_len <= line_length {
            current.push_str(word);
            current_len += word_len;
            if current_len != line_length {
                current.push(' ');
                current_len += 1;
            }
        } else {
            lines.push(finish(&current));
            current = format!("{word} ");
            current_len = word_len + 1;
        }
    }
    if !current.is_empty() {
        lines.push(finish(&current));
    }
    lines
}

/// Produces the comment of a field while its property is resolved.
pub trait CommentResolver: Send + Sync {
    fn resolve(&self, field: &FieldView<'_>) -> Option<Comment>;
}

/// Wraps the comment text of the field metadata.
///
/// With `pad` every line is padded to `line_length`, short comments included,
/// so all comment blocks of a file share one width.
#[derive(Debug, Clone, Copy)]
pub struct WrappedCommentResolver {
    pub line_length: usize,
    pub pad: bool,
}

impl Default for WrappedCommentResolver {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            pad: true,
        }
    }
}

impl CommentResolver for WrappedCommentResolver {
    fn resolve(&self, field: &FieldView<'_>) -> Option<Comment> {
        let text = field.meta.comment.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        Some(Comment::wrapped(text, self.line_length, self.pad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{meta::FieldMeta, value::Shape};

    const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
        tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam.";

    #[test]
    fn test_wrap_respects_line_length() {
        let lines = wrap(LOREM, 30, false);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 30, "{line:?}");
            assert_eq!(line.trim(), line);
        }
        assert_eq!(lines.join(" "), LOREM.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_pads_every_line() {
        let lines = wrap(LOREM, 40, true);
        assert!(lines.iter().all(|line| line.chars().count() == 40));
    }

    #[test]
    fn test_exact_fit_and_long_words() {
        assert_eq!(wrap("abcd efgh", 4, false), ["abcd", "efgh"]);
        assert_eq!(wrap("ab averyveryverylongword cd", 8, false), [
            "ab",
            "averyveryverylongword",
            "cd"
        ]);
        assert!(wrap("   ", 10, true).is_empty());
    }

    #[test]
    fn test_comment_of() {
        assert_eq!(Comment::of("Short text.").lines(), ["Short text."]);
        let long = Comment::of(LOREM);
        assert_eq!(long.lines().len(), 2);
        assert!(long.lines().iter().all(|l| l.len() == DEFAULT_LINE_LENGTH));
    }

    #[test]
    fn test_json_shapes() {
        assert_eq!(
            Comment::new(["one line"]).to_json(),
            JsonValue::String("one line".into())
        );
        assert_eq!(
            Comment::new(["a", "b"]).to_json(),
            JsonValue::Array(vec!["a".into(), "b".into()])
        );

        let back = Comment::from_json(&Comment::new(["a", "b"]).to_json()).unwrap();
        assert_eq!(back.lines(), ["a", "b"]);
        assert_eq!(Comment::from_json(&"x".into()).unwrap().lines(), ["x"]);
    }

    #[test]
    fn test_invalid_json_shapes() {
        let number = JsonValue::from(12);
        assert!(matches!(
            Comment::from_json(&number),
            Err(ParseError::Comment { .. })
        ));
        let mixed = JsonValue::Array(vec!["ok".into(), JsonValue::Bool(true)]);
        assert!(Comment::from_json(&mixed).is_err());
    }

    #[test]
    fn test_resolver_pads_short_comments() {
        let meta = FieldMeta::new().comment(" Port to listen on. ");
        let view = FieldView {
            name: "port",
            field: "port",
            meta: &meta,
            value: Shape::Bool,
            is_section: false,
        };
        let padded = WrappedCommentResolver::default().resolve(&view).unwrap();
        assert_eq!(padded.lines(), [format!("{:<80}", "Port to listen on.")]);

        let trimmed = WrappedCommentResolver {
            line_length: 80,
            pad: false,
        }
        .resolve(&view)
        .unwrap();
        assert_eq!(trimmed.lines(), ["Port to listen on."]);
    }

    #[test]
    fn test_is_empty() {
        assert!(Comment::new(Vec::<String>::new()).is_empty());
        assert!(Comment::new(["  "]).is_empty());
        assert!(!Comment::new(["", ""]).is_empty());
        assert!(!Comment::new(["x"]).is_empty());
    }
}
