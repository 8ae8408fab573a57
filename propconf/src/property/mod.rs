//! Resolved properties and their read/write protocol.
//!
//! Every property is written as an object:
//!
//! ```json
//! {
//!   "//": "Comment, a string or an array of lines",
//!   "//range": ">=0 AND <=10",
//!   "//reference": "https://example.com/docs",
//!   "//default": 5,
//!   "value": 7
//! }
//! ```
//!
//! Only `value` is read back. All other keys are documentation for whoever
//! edits the file.

mod kind;

use std::fmt;

pub use kind::{PropertyKind, RegexRule};

use crate::{
    comment::Comment,
    error::{ParseError, Result},
    json::{JsonValue, JsonWriter},
    meta::FieldMeta,
    schema::{Config, Schema},
    value::{ConfigValue, Shape},
};

pub(crate) const COMMENT_KEY: &str = "//";
pub(crate) const REFERENCE_KEY: &str = "//reference";
pub(crate) const DEFAULT_KEY: &str = "//default";
pub(crate) const VALUE_KEY: &str = "value";

/// Handles into one field of `T`.
pub(crate) struct Accessor<T, V> {
    get: Box<dyn Fn(&T) -> &V>,
    get_mut: Box<dyn Fn(&mut T) -> &mut V>,
}

impl<T, V> Accessor<T, V> {
    pub fn new<G, M>(get: G, get_mut: M) -> Self
    where
        G: Fn(&T) -> &V + 'static,
        M: Fn(&mut T) -> &mut V + 'static,
    {
        Self {
            get: Box::new(get),
            get_mut: Box::new(get_mut),
        }
    }
}

/// A field holding a plain value, with the default captured at build time.
pub(crate) struct ValueField<T, V> {
    pub access: Accessor<T, V>,
    pub default: V,
}

/// A field holding a nested config object.
pub(crate) struct SectionField<T, S> {
    pub access: Accessor<T, S>,
    pub schema: Schema<S>,
}

/// Type erased [`ValueField`].
trait ValueSlot<T> {
    fn shape<'a>(&self, target: &'a T) -> Shape<'a>;

    fn encode(&self, target: &T) -> JsonValue;

    fn default_shape(&self) -> Shape<'_>;

    fn encode_default(&self) -> JsonValue;

    /// Decodes, validates and commits a value. On error the field is left
    /// untouched.
    fn read(&self, target: &mut T, json: &JsonValue, kind: &PropertyKind, name: &str) -> Result<()>;
}

impl<T, V: ConfigValue + 'static> ValueSlot<T> for ValueField<T, V> {
    fn shape<'a>(&self, target: &'a T) -> Shape<'a> {
        (self.access.get)(target).shape()
    }

    fn encode(&self, target: &T) -> JsonValue {
        (self.access.get)(target).encode()
    }

    fn default_shape(&self) -> Shape<'_> {
        self.default.shape()
    }

    fn encode_default(&self) -> JsonValue {
        self.default.encode()
    }

    fn read(&self, target: &mut T, json: &JsonValue, kind: &PropertyKind, name: &str) -> Result<()> {
        let value = V::decode(json).map_err(|source| ParseError::Value {
            field: name.to_string(),
            source,
        })?;
        kind.validate(name, &value.shape())?;
        *(self.access.get_mut)(target) = value;
        Ok(())
    }
}

/// Type erased [`SectionField`].
trait SectionSlot<T> {
    fn write(&self, target: &T, out: &mut JsonWriter);

    fn read(&self, target: &mut T, json: &JsonValue) -> Result<()>;
}

impl<T, S: Config> SectionSlot<T> for SectionField<T, S> {
    fn write(&self, target: &T, out: &mut JsonWriter) {
        self.schema.write((self.access.get)(target), out);
    }

    fn read(&self, target: &mut T, json: &JsonValue) -> Result<()> {
        self.schema.read((self.access.get_mut)(target), json)
    }
}

enum Binding<T> {
    Value(Box<dyn ValueSlot<T>>),
    Section(Box<dyn SectionSlot<T>>),
}

/// One configurable field of `T` together with its decorations.
pub struct Property<T> {
    name: String,
    comment: Option<Comment>,
    reference: Option<String>,
    write_default: bool,
    kind: PropertyKind,
    binding: Binding<T>,
}

impl<T: 'static> Property<T> {
    pub(crate) fn value<V: ConfigValue + 'static>(
        name: String,
        comment: Option<Comment>,
        meta: &FieldMeta,
        kind: PropertyKind,
        field: ValueField<T, V>,
    ) -> Self {
        Self::new(name, comment, meta, kind, Binding::Value(Box::new(field)))
    }

    pub(crate) fn section<S: Config>(
        name: String,
        comment: Option<Comment>,
        meta: &FieldMeta,
        field: SectionField<T, S>,
    ) -> Self {
        Self::new(
            name,
            comment,
            meta,
            PropertyKind::Section,
            Binding::Section(Box::new(field)),
        )
    }
}

impl<T> Property<T> {
    fn new(
        name: String,
        comment: Option<Comment>,
        meta: &FieldMeta,
        kind: PropertyKind,
        binding: Binding<T>,
    ) -> Self {
        Self {
            name,
            comment: comment.filter(|c| !c.is_empty()),
            reference: meta
                .reference
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            write_default: meta.write_default,
            kind,
            binding,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Writes the decorated property object of the field held by `target`.
    pub fn write(&self, target: &T, out: &mut JsonWriter) {
        out.begin_object();
        if let Some(comment) = &self.comment {
            out.name(COMMENT_KEY).value(&comment.to_json());
        }
        self.kind.write_decorations(out);
        if let Some(reference) = &self.reference {
            out.name(REFERENCE_KEY).string(reference);
        }
        match &self.binding {
            Binding::Value(slot) => {
                if self.write_default {
                    let default = slot.encode_default();
                    if !default.is_null() {
                        let inline = self.kind.should_inline(&slot.default_shape());
                        out.name(DEFAULT_KEY).value_inline(&default, inline);
                    }
                }
                let inline = self.kind.should_inline(&slot.shape(target));
                out.name(VALUE_KEY).value_inline(&slot.encode(target), inline);
            }
            Binding::Section(section) => {
                out.name(VALUE_KEY);
                section.write(target, out);
            }
        }
        out.end_object();
    }

    /// Reads the `value` entry of a property object into the field.
    ///
    /// # Errors
    ///
    /// A value that can not be decoded or does not validate leaves the field
    /// unchanged.
    pub fn read(&self, target: &mut T, json: &JsonValue) -> Result<()> {
        let entries = json.as_object().ok_or_else(|| ParseError::TypeMismatch {
            path: self.name.clone(),
            expected: "property object",
            found: json.describe(),
        })?;
        for (key, value) in entries {
            if key != VALUE_KEY {
                continue;
            }
            match &self.binding {
                Binding::Value(slot) => slot.read(target, value, &self.kind, &self.name)?,
                Binding::Section(section) => section.read(target, value)?,
            }
        }
        Ok(())
    }
}

impl<T> fmt::Display for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("comment", &self.comment)
            .field("reference", &self.reference)
            .field("write_default", &self.write_default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, Violation},
        json::parse,
        meta::{ArraySettings, Bounds},
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Holder {
        level: i32,
        tags: Vec<String>,
        nickname: Option<String>,
    }

    fn holder() -> Holder {
        Holder {
            level: 5,
            tags: vec!["a".into(), "b".into()],
            nickname: None,
        }
    }

    fn level_property(meta: &FieldMeta, comment: Option<Comment>) -> Property<Holder> {
        Property::value(
            "level".into(),
            comment,
            meta,
            PropertyKind::Ranged(Bounds::Int { min: 0, max: 10 }.range()),
            ValueField {
                access: Accessor::new(|h: &Holder| &h.level, |h: &mut Holder| &mut h.level),
                default: 5,
            },
        )
    }

    fn render(property: &Property<Holder>, target: &Holder) -> String {
        let mut out = JsonWriter::default();
        property.write(target, &mut out);
        out.into_string()
    }

    #[test]
    fn test_write_order() {
        let meta = FieldMeta::new().reference(" https://example.com ");
        let property = level_property(&meta, Some(Comment::new(["Verbosity."])));
        let mut target = holder();
        target.level = 7;
        assert_eq!(
            render(&property, &target),
            r#"{
  "//": "Verbosity.",
  "//range": ">=0 AND <=10",
  "//reference": "https://example.com",
  "//default": 5,
  "value": 7
}"#
        );
    }

    #[test]
    fn test_optional_decorations_are_skipped() {
        let meta = FieldMeta::new().write_default(false).reference("  ");
        let property = level_property(&meta, Some(Comment::new([""])));
        assert_eq!(
            render(&property, &holder()),
            "{\n  \"//range\": \">=0 AND <=10\",\n  \"value\": 5\n}"
        );
    }

    #[test]
    fn test_null_default_is_not_written() {
        let property = Property::value(
            "nickname".into(),
            None,
            &FieldMeta::new(),
            PropertyKind::Plain,
            ValueField {
                access: Accessor::new(|h: &Holder| &h.nickname, |h: &mut Holder| &mut h.nickname),
                default: None,
            },
        );
        let mut target = holder();
        assert_eq!(render(&property, &target), "{\n  \"value\": null\n}");

        property
            .read(&mut target, &parse(r#"{"value": "neo"}"#).unwrap())
            .unwrap();
        assert_eq!(target.nickname.as_deref(), Some("neo"));
    }

    #[test]
    fn test_read_validates_before_commit() {
        let property = level_property(&FieldMeta::new(), None);
        let mut target = holder();

        property
            .read(&mut target, &parse(r#"{"//": 12, "//default": "x", "value": 10}"#).unwrap())
            .unwrap();
        assert_eq!(target.level, 10);

        let err = property
            .read(&mut target, &parse(r#"{"value": 11}"#).unwrap())
            .unwrap_err();
        match err {
            Error::Validation(e) => {
                assert_eq!(e.field, "level");
                assert!(matches!(e.violation, Violation::AboveMaximum { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(target.level, 10);

        let err = property
            .read(&mut target, &parse(r#"{"value": "high"}"#).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Value { .. })));

        let err = property.read(&mut target, &parse("[1]").unwrap()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::TypeMismatch { .. })));
        assert_eq!(target.level, 10);
    }

    #[test]
    fn test_collection_inlining() {
        let property = Property::value(
            "tags".into(),
            None,
            &FieldMeta::new(),
            PropertyKind::Collection(ArraySettings::default().inline_threshold(2)),
            ValueField {
                access: Accessor::new(|h: &Holder| &h.tags, |h: &mut Holder| &mut h.tags),
                default: vec!["a".to_string(), "b".to_string()],
            },
        );
        let mut target = holder();
        target.tags.push("c".into());
        assert_eq!(
            render(&property, &target),
            "{\n  \"//default\": [\"a\", \"b\"],\n  \"value\": [\n    \"a\",\n    \"b\",\n    \"c\"\n  ]\n}"
        );
    }
}
