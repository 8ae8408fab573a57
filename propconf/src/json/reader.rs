use super::value::{JsonNumber, JsonValue};
use crate::error::ParseError;

/// Deepest nesting of arrays and objects a document may use.
pub const MAX_DEPTH: usize = 128;

/// Parses a whole document.
///
/// The grammar is standard JSON plus the `NaN`, `Infinity` and `-Infinity`
/// number literals that config files are allowed to contain. String tokens are
/// decoded by `serde_json`.
pub fn parse(text: &str) -> Result<JsonValue, ParseError> {
    let mut reader = JsonReader::new(text);
    let value = reader.read_value()?;
    reader.skip_whitespace();
    if reader.peek().is_some() {
        return Err(reader.error("unexpected content after the document"));
    }
    Ok(value)
}

struct JsonReader<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
    line: usize,
    column: usize,
}

impl<'a> JsonReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.strip_prefix('\u{feff}').unwrap_or(text),
            pos: 0,
            depth: 0,
            line: 1,
            column: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.next();
        }
    }

    fn read_value(&mut self) -> Result<JsonValue, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.nested(Self::read_object),
            Some('[') => self.nested(Self::read_array),
            Some('"') => Ok(JsonValue::String(self.read_string()?)),
            Some('-' | '0'..='9') => self.read_number(),
            Some(c) if c.is_ascii_alphabetic() => self.read_keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Runs `read` one nesting level deeper.
    fn nested(
        &mut self,
        read: fn(&mut Self) -> Result<JsonValue, ParseError>,
    ) -> Result<JsonValue, ParseError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {MAX_DEPTH} levels")));
        }
        self.depth += 1;
        let value = read(self);
        self.depth -= 1;
        value
    }

    fn read_object(&mut self) -> Result<JsonValue, ParseError> {
        self.expect('{')?;
        let mut entries = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.next();
            return Ok(JsonValue::Object(entries));
        }
        loop {
            self.skip_whitespace();
            if self.peek() != Some('"') {
                return Err(self.error("expected a property name"));
            }
            let name = self.read_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.read_value()?;
            entries.push((name, value));
            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some('}') => return Ok(JsonValue::Object(entries)),
                _ => return Err(self.error("expected ',' or '}' in object")),
            }
        }
    }

    fn read_array(&mut self) -> Result<JsonValue, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.next();
            return Ok(JsonValue::Array(items));
        }
        loop {
            items.push(self.read_value()?);
            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some(']') => return Ok(JsonValue::Array(items)),
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
    }

    /// Finds the end of the string token at the cursor and lets `serde_json`
    /// decode it, escapes and surrogate pairs included.
    fn read_string(&mut self) -> Result<String, ParseError> {
        let text = self.text;
        let bytes = text.as_bytes();
        let start = self.pos;
        let mut end = start + 1;
        loop {
            match bytes.get(end) {
                Some(b'"') => break,
                // escapes are ASCII, the escaped byte can not end the token
                Some(b'\\') => end += 2,
                Some(_) => end += 1,
                None => return Err(self.error("unterminated string")),
            }
        }
        let token = &text[start..=end];
        let decoded = serde_json::from_str::<String>(token)
            .map_err(|e| self.error(format!("invalid string: {e}")))?;
        self.pos = end + 1;
        self.column += token.chars().count();
        Ok(decoded)
    }

    fn read_number(&mut self) -> Result<JsonValue, ParseError> {
        let mut literal = String::new();
        if self.peek() == Some('-') {
            literal.push('-');
            self.next();
            if self.peek() == Some('I') {
                return match self.read_word().as_str() {
                    "Infinity" => Ok(JsonValue::Number(JsonNumber::from_f64(f64::NEG_INFINITY))),
                    word => Err(self.error(format!("invalid number '-{word}'"))),
                };
            }
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
                literal.push(c);
                self.next();
            } else {
                break;
            }
        }
        JsonNumber::parse(&literal)
            .map(JsonValue::Number)
            .ok_or_else(|| self.error(format!("invalid number '{literal}'")))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            word.push(c);
            self.next();
        }
        word
    }

    fn read_keyword(&mut self) -> Result<JsonValue, ParseError> {
        match self.read_word().as_str() {
            "true" => Ok(JsonValue::Bool(true)),
            "false" => Ok(JsonValue::Bool(false)),
            "null" => Ok(JsonValue::Null),
            "NaN" => Ok(JsonValue::Number(JsonNumber::from_f64(f64::NAN))),
            "Infinity" => Ok(JsonValue::Number(JsonNumber::from_f64(f64::INFINITY))),
            word => Err(self.error(format!("unexpected literal '{word}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let value = parse(r#"{"a": [1, -2.5, true, null], "b": {"c": "x\nyé"}}"#).unwrap();
        let a = value.get("a").unwrap().as_array().unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a[1].as_number().unwrap().as_str(), "-2.5");
        assert_eq!(a[2], JsonValue::Bool(true));
        assert_eq!(value.get("b").unwrap().get("c").unwrap().as_str(), Some("x\nyé"));
    }

    #[test]
    fn test_special_float_literals() {
        let value = parse("[NaN, Infinity, -Infinity]").unwrap();
        let items: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_number().unwrap().as_str().to_string())
            .collect();
        assert_eq!(items, ["NaN", "Infinity", "-Infinity"]);
    }

    #[test]
    fn test_keeps_duplicate_keys_in_order() {
        let value = parse(r#"{"k": 1, "j": 2, "k": 3}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["k", "j", "k"]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse(r#""\ud83d\ude00""#).unwrap().as_str(), Some("😀"));
        assert_eq!(parse(r#""a\"b\\c\/""#).unwrap().as_str(), Some("a\"b\\c/"));
        assert_eq!(parse(r#"["é\"", 1]"#).unwrap().as_array().map(<[JsonValue]>::len), Some(2));
        assert!(parse(r#""\x""#).is_err());
        assert!(parse("\"tab\there\"").is_err());
        assert!(parse(r#""open"#).is_err());
        assert!(parse(r#""\"#).is_err());
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse("{\n  \"a\": 1,\n  \"b\" 2\n}").unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse("[1, 2").is_err());
        assert!(parse("{} {}").is_err());
        assert!(parse("[01]").is_err());
        assert!(parse("nope").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let within = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse(&within).is_ok());

        let deeper = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&deeper), Err(ParseError::Syntax { .. })));

        assert!(parse(&"[".repeat(100_000)).is_err());
        assert!(parse(&"{\"a\":".repeat(100_000)).is_err());
    }
}
