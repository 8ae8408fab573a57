//! Strategies that pick the property kind of a field.
//!
//! An adapter looks at a [`FieldView`] and either returns a [`PropertyKind`]
//! or `None` when it does not apply. Returning an error aborts the whole
//! schema build.

use std::sync::Arc;

use crate::{
    error::ResolutionError,
    meta::FieldMeta,
    property::{PropertyKind, RegexRule},
    value::{SequenceKind, Shape},
};

/// Everything an adapter may inspect about a field.
#[derive(Debug)]
pub struct FieldView<'a> {
    /// Serialized property name.
    pub name: &'a str,
    /// Name the field was declared with.
    pub field: &'a str,
    pub meta: &'a FieldMeta,
    /// Shape of the value the field holds when the schema is built.
    pub value: Shape<'a>,
    /// The field is a nested config object.
    pub is_section: bool,
}

/// Resolves fields to property kinds.
///
/// Adapters are shared between all fields of a resolver, so implementations
/// must not keep per-field state.
pub trait PropertyAdapter: Send + Sync {
    /// Name used by [`FieldMeta::adapter`] to request this adapter.
    fn name(&self) -> &str;

    fn adapt(&self, field: &FieldView<'_>) -> Result<Option<PropertyKind>, ResolutionError>;
}

/// Strings with a `regex` option.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexAdapter;

impl PropertyAdapter for RegexAdapter {
    fn name(&self) -> &str {
        "regex"
    }

    fn adapt(&self, field: &FieldView<'_>) -> Result<Option<PropertyKind>, ResolutionError> {
        match (&field.value, field.meta.regex.as_deref()) {
            (Shape::Text(_), Some(pattern)) => {
                Ok(Some(PropertyKind::Regex(RegexRule::new(field.name, pattern)?)))
            }
            _ => Ok(None),
        }
    }
}

/// Numbers with bounds of their own type, so `Bounds::Int` only applies to
/// `i32` fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangedAdapter;

impl PropertyAdapter for RangedAdapter {
    fn name(&self) -> &str {
        "ranged"
    }

    fn adapt(&self, field: &FieldView<'_>) -> Result<Option<PropertyKind>, ResolutionError> {
        Ok(match (&field.value, &field.meta.bounds) {
            (Shape::Number(n), Some(bounds)) if bounds.applies_to(n) => {
                Some(PropertyKind::Ranged(bounds.range()))
            }
            _ => None,
        })
    }
}

/// Native arrays.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayAdapter;

impl PropertyAdapter for ArrayAdapter {
    fn name(&self) -> &str {
        "array"
    }

    fn adapt(&self, field: &FieldView<'_>) -> Result<Option<PropertyKind>, ResolutionError> {
        Ok(match field.value {
            Shape::Sequence(SequenceKind::Array, _) => Some(PropertyKind::Array(
                field.meta.array.unwrap_or_default(),
            )),
            _ => None,
        })
    }
}

/// Growable collections.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionAdapter;

impl PropertyAdapter for CollectionAdapter {
    fn name(&self) -> &str {
        "collection"
    }

    fn adapt(&self, field: &FieldView<'_>) -> Result<Option<PropertyKind>, ResolutionError> {
        Ok(match field.value {
            Shape::Sequence(SequenceKind::Collection, _) => Some(PropertyKind::Collection(
                field.meta.array.unwrap_or_default(),
            )),
            _ => None,
        })
    }
}

/// The adapters every resolver starts with, in priority order.
pub fn default_adapters() -> Vec<Arc<dyn PropertyAdapter>> {
    vec![
        Arc::new(RegexAdapter),
        Arc::new(RangedAdapter),
        Arc::new(ArrayAdapter),
        Arc::new(CollectionAdapter),
    ]
}
