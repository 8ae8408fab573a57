//! Per-field configuration passed when a field is declared.

use crate::number::Numeric;

/// Options of a single configurable field.
///
/// ```
/// use propconf::meta::{ArraySettings, Bounds, FieldMeta};
///
/// let meta = FieldMeta::new()
///     .comment("Number of worker threads.")
///     .bounds(Bounds::Int { min: 1, max: 64 });
/// assert!(meta.write_default);
///
/// let list = FieldMeta::new().array(ArraySettings::default().allow_empty(false));
/// assert!(!list.array.unwrap().allow_empty);
/// ```
#[derive(Debug, Clone)]
pub struct FieldMeta {
    /// Serialized name, used instead of the declared name when not blank.
    pub name: Option<String>,
    pub comment: Option<String>,
    /// Link to documentation written next to the value.
    pub reference: Option<String>,
    /// Echo the default value under `//default`.
    pub write_default: bool,
    /// Name of an override adapter that resolves this field on its own.
    pub adapter: Option<String>,
    pub bounds: Option<Bounds>,
    pub regex: Option<String>,
    pub array: Option<ArraySettings>,
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self {
            name: None,
            comment: None,
            reference: None,
            write_default: true,
            adapter: None,
            bounds: None,
            regex: None,
            array: None,
        }
    }
}

impl FieldMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn write_default(mut self, write_default: bool) -> Self {
        self.write_default = write_default;
        self
    }

    pub fn adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    pub fn array(mut self, settings: ArraySettings) -> Self {
        self.array = Some(settings);
        self
    }

    /// The serialized name of a field declared as `declared`.
    pub fn serialized_name<'a>(&'a self, declared: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => declared,
        }
    }
}

/// Numeric bounds, one variant per supported field type.
///
/// A bound equal to the extreme of its type disables that side of the check,
/// so `Bounds::Int { min: 0, max: i32::MAX }` only has a lower bound. For
/// floats the extremes are `-MAX` and `MAX`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Int { min: i32, max: i32 },
    Long { min: i64, max: i64 },
    Float { min: f32, max: f32 },
    Double { min: f64, max: f64 },
}

impl Bounds {
    /// Whether a value of this numeric type can be checked against the bounds.
    pub fn applies_to(&self, value: &Numeric) -> bool {
        matches!(
            (self, value),
            (Bounds::Int { .. }, Numeric::I32(_))
                | (Bounds::Long { .. }, Numeric::I64(_))
                | (Bounds::Float { .. }, Numeric::F32(_))
                | (Bounds::Double { .. }, Numeric::F64(_))
        )
    }

    /// The effective range, with extreme bounds removed.
    pub fn range(&self) -> Range {
        fn bound<T: PartialEq + Into<Numeric>>(value: T, extreme: T) -> Option<Numeric> {
            (value != extreme).then(|| value.into())
        }
        match *self {
            Bounds::Int { min, max } => Range {
                min: bound(min, i32::MIN),
                max: bound(max, i32::MAX),
            },
            Bounds::Long { min, max } => Range {
                min: bound(min, i64::MIN),
                max: bound(max, i64::MAX),
            },
            Bounds::Float { min, max } => Range {
                min: bound(min, -f32::MAX),
                max: bound(max, f32::MAX),
            },
            Bounds::Double { min, max } => Range {
                min: bound(min, -f64::MAX),
                max: bound(max, f64::MAX),
            },
        }
    }
}

/// Inclusive range, either side optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Range {
    pub min: Option<Numeric>,
    pub max: Option<Numeric>,
}

impl Range {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Layout and validation options of sequence fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySettings {
    /// Sequences with more entries are written one entry per line.
    pub inline_threshold: usize,
    /// Allow inlining sequences that hold non-primitive entries.
    pub inline_complex: bool,
    pub allow_empty: bool,
}

impl Default for ArraySettings {
    fn default() -> Self {
        Self {
            inline_threshold: 5,
            inline_complex: false,
            allow_empty: true,
        }
    }
}

impl ArraySettings {
    pub fn inline_threshold(mut self, threshold: usize) -> Self {
        self.inline_threshold = threshold;
        self
    }

    pub fn inline_complex(mut self, inline_complex: bool) -> Self {
        self.inline_complex = inline_complex;
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_name() {
        assert_eq!(FieldMeta::new().serialized_name("port"), "port");
        assert_eq!(FieldMeta::new().name("  ").serialized_name("port"), "port");
        assert_eq!(
            FieldMeta::new().name("listen_port").serialized_name("port"),
            "listen_port"
        );
    }

    #[test]
    fn test_extreme_bounds_are_open() {
        let range = Bounds::Int { min: 0, max: i32::MAX }.range();
        assert_eq!(range.min, Some(Numeric::I32(0)));
        assert_eq!(range.max, None);

        let open = Bounds::Double { min: -f64::MAX, max: f64::MAX }.range();
        assert!(open.is_unbounded());

        let float = Bounds::Float { min: -f32::MAX, max: 2.5 }.range();
        assert_eq!(float.max, Some(Numeric::F32(2.5)));
    }

    #[test]
    fn test_bounds_apply_to_matching_type() {
        let bounds = Bounds::Long { min: 0, max: 10 };
        assert!(bounds.applies_to(&Numeric::I64(4)));
        assert!(!bounds.applies_to(&Numeric::I32(4)));
        assert!(!Bounds::Float { min: 0.0, max: 1.0 }.applies_to(&Numeric::F64(0.5)));
    }

    #[test]
    fn test_array_defaults() {
        let settings = ArraySettings::default();
        assert_eq!(settings.inline_threshold, 5);
        assert!(!settings.inline_complex);
        assert!(settings.allow_empty);
    }
}
