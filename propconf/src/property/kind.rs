use std::fmt;

use regex::Regex;

use crate::{
    error::{ResolutionError, ValidationError, Violation},
    json::JsonWriter,
    meta::{ArraySettings, Range},
    number,
    value::Shape,
};

/// How a field is represented in the config file.
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// Value written as is, with only the common decorations.
    Plain,
    /// Number checked against an inclusive range.
    Ranged(Range),
    /// String that must fully match a pattern.
    Regex(RegexRule),
    /// Native array such as `[V; N]` or `Box<[V]>`.
    Array(ArraySettings),
    /// Growable collection such as `Vec<V>`.
    Collection(ArraySettings),
    /// Nested config object with its own schema.
    Section,
}

/// A compiled pattern that only accepts whole-string matches.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: String,
    regex: Regex,
}

impl RegexRule {
    pub fn new(field: &str, pattern: &str) -> Result<Self, ResolutionError> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ResolutionError::InvalidRegex {
                field: field.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as declared.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PropertyKind {
    /// Checks a candidate value before it is committed to its field.
    pub fn validate(&self, field: &str, value: &Shape<'_>) -> Result<(), ValidationError> {
        let fail = |violation| Err(ValidationError::new(field, violation));
        match (self, value) {
            (PropertyKind::Ranged(_) | PropertyKind::Regex(_), Shape::Null) => fail(Violation::Null),
            (PropertyKind::Ranged(range), Shape::Number(n)) => {
                if let Some(min) = &range.min {
                    if number::less_than(n, min).map_err(|e| ValidationError::new(field, e.into()))? {
                        return fail(Violation::BelowMinimum {
                            value: n.to_string(),
                            min: min.to_string(),
                        });
                    }
                }
                if let Some(max) = &range.max {
                    if number::greater_than(n, max).map_err(|e| ValidationError::new(field, e.into()))? {
                        return fail(Violation::AboveMaximum {
                            value: n.to_string(),
                            max: max.to_string(),
                        });
                    }
                }
                Ok(())
            }
            (PropertyKind::Ranged(_), _) => fail(Violation::WrongShape { expected: "number" }),
            (PropertyKind::Regex(rule), Shape::Text(text)) => {
                if rule.is_match(text) {
                    Ok(())
                } else {
                    fail(Violation::PatternMismatch {
                        value: text.to_string(),
                        pattern: rule.pattern.clone(),
                    })
                }
            }
            (PropertyKind::Regex(_), _) => fail(Violation::WrongShape { expected: "string" }),
            (PropertyKind::Array(settings) | PropertyKind::Collection(settings), value) => {
                let empty = match value {
                    Shape::Sequence(_, items) => items.is_empty(),
                    Shape::Null => true,
                    _ => false,
                };
                if empty && !settings.allow_empty {
                    fail(Violation::Empty)
                } else {
                    Ok(())
                }
            }
            (PropertyKind::Plain | PropertyKind::Section, _) => Ok(()),
        }
    }

    /// Writes the hint keys that go between the comment and the reference.
    pub(crate) fn write_decorations(&self, out: &mut JsonWriter) {
        match self {
            PropertyKind::Ranged(range) => {
                if let Some(text) = range_text(range) {
                    out.name("//range").string(&text);
                }
            }
            PropertyKind::Regex(rule) => {
                out.name("//regex").string(&rule.pattern);
            }
            PropertyKind::Array(settings) | PropertyKind::Collection(settings) => {
                if !settings.allow_empty {
                    out.name("//empty-allowed").bool(false);
                }
            }
            PropertyKind::Plain | PropertyKind::Section => {}
        }
    }

    /// Whether a sequence value is short and simple enough for a single line.
    pub fn should_inline(&self, value: &Shape<'_>) -> bool {
        let (PropertyKind::Array(settings) | PropertyKind::Collection(settings)) = self else {
            return false;
        };
        let Shape::Sequence(_, items) = value else {
            return false;
        };
        items.len() <= settings.inline_threshold
            && (settings.inline_complex || items.iter().all(Shape::is_primitive))
    }
}

fn range_text(range: &Range) -> Option<String> {
    let min = range.min.as_ref().map(|min| format!(">={min}"));
    let max = range.max.as_ref().map(|max| format!("<={max}"));
    match (min, max) {
        (Some(min), Some(max)) => Some(format!("{min} AND {max}")),
        (min, max) => min.or(max),
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Plain => write!(f, "plain"),
            PropertyKind::Ranged(range) => match range_text(range) {
                Some(text) => write!(f, "ranged({text})"),
                None => write!(f, "ranged"),
            },
            PropertyKind::Regex(rule) => write!(f, "regex({})", rule.pattern),
            PropertyKind::Array(_) => write!(f, "array"),
            PropertyKind::Collection(_) => write!(f, "collection"),
            PropertyKind::Section => write!(f, "section"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        meta::Bounds,
        number::Numeric,
        value::{ConfigValue, SequenceKind},
    };

    fn ranged(min: i32, max: i32) -> PropertyKind {
        PropertyKind::Ranged(Bounds::Int { min, max }.range())
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let kind = ranged(0, 10);
        assert!(kind.validate("level", &0i32.shape()).is_ok());
        assert!(kind.validate("level", &10i32.shape()).is_ok());

        let low = kind.validate("level", &(-1i32).shape()).unwrap_err();
        assert_eq!(low.field, "level");
        assert!(matches!(low.violation, Violation::BelowMinimum { ref min, .. } if min == "0"));

        let high = kind.validate("level", &11i32.shape()).unwrap_err();
        assert!(matches!(high.violation, Violation::AboveMaximum { ref max, .. } if max == "10"));
    }

    #[test]
    fn test_range_rejects_null_and_nan() {
        let kind = PropertyKind::Ranged(Bounds::Double { min: 0.0, max: 1.0 }.range());
        assert!(matches!(
            kind.validate("ratio", &Shape::Null).unwrap_err().violation,
            Violation::Null
        ));
        // NaN sorts above every other value
        assert!(matches!(
            kind.validate("ratio", &f64::NAN.shape()).unwrap_err().violation,
            Violation::AboveMaximum { .. }
        ));
        assert!(kind.validate("ratio", &0.5f64.shape()).is_ok());
    }

    #[test]
    fn test_regex_requires_full_match() {
        let kind = PropertyKind::Regex(RegexRule::new("name", "[a-z]+").unwrap());
        assert!(kind.validate("name", &Shape::Text("abc")).is_ok());
        assert!(kind.validate("name", &Shape::Text("ABC")).is_err());
        assert!(kind.validate("name", &Shape::Text("ab1")).is_err());
        assert!(kind.validate("name", &Shape::Text("1abc")).is_err());
        assert!(RegexRule::new("name", "([a-z").is_err());
    }

    #[test]
    fn test_empty_sequences() {
        let strict = PropertyKind::Collection(ArraySettings::default().allow_empty(false));
        let empty = Shape::Sequence(SequenceKind::Collection, vec![]);
        assert!(matches!(
            strict.validate("hosts", &empty).unwrap_err().violation,
            Violation::Empty
        ));
        assert!(strict.validate("hosts", &vec![1i32].shape()).is_ok());
        assert!(PropertyKind::Collection(ArraySettings::default()).validate("hosts", &empty).is_ok());
    }

    #[test]
    fn test_inline_heuristic() {
        let kind = PropertyKind::Collection(ArraySettings::default());
        assert!(kind.should_inline(&vec![1i32; 5].shape()));
        assert!(!kind.should_inline(&vec![1i32; 6].shape()));
        assert!(!kind.should_inline(&vec![vec![1i32]; 3].shape()));
        assert!(!PropertyKind::Plain.should_inline(&vec![1i32].shape()));

        let complex = PropertyKind::Array(ArraySettings::default().inline_complex(true));
        assert!(complex.should_inline(&[vec![1i32], vec![2]].shape()));
    }

    #[test]
    fn test_decorations() {
        let mut out = JsonWriter::default();
        out.begin_object();
        ranged(0, i32::MAX).write_decorations(&mut out);
        PropertyKind::Regex(RegexRule::new("f", "^[a-z]+$").unwrap()).write_decorations(&mut out);
        PropertyKind::Array(ArraySettings::default().allow_empty(false)).write_decorations(&mut out);
        PropertyKind::Collection(ArraySettings::default()).write_decorations(&mut out);
        out.end_object();
        assert_eq!(
            out.into_string(),
            "{\n  \"//range\": \">=0\",\n  \"//regex\": \"^[a-z]+$\",\n  \"//empty-allowed\": false\n}"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ranged(0, 10).to_string(), "ranged(>=0 AND <=10)");
        let upper = PropertyKind::Ranged(Range {
            min: None,
            max: Some(Numeric::I64(3)),
        });
        assert_eq!(upper.to_string(), "ranged(<=3)");
        assert_eq!(PropertyKind::Section.to_string(), "section");
    }
}
