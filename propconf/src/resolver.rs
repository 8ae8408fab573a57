//! Resolution of fields to property kinds and comments.

use std::{collections::HashMap, sync::Arc};

use crate::{
    adapter::{FieldView, PropertyAdapter, default_adapters},
    comment::{Comment, CommentResolver, WrappedCommentResolver},
    error::ResolutionError,
    property::PropertyKind,
};

/// Picks the property kind and comment of every declared field.
///
/// Resolution order:
///
/// 1. The override adapter named by the field, if any. It has the final word,
///    declining is an error.
/// 2. Registered adapters in registration order, first match wins.
/// 3. [`PropertyKind::Section`] for nested config objects.
/// 4. [`PropertyKind::Plain`].
pub struct PropertyResolver {
    adapters: Vec<Arc<dyn PropertyAdapter>>,
    overrides: HashMap<String, Arc<dyn PropertyAdapter>>,
    comments: Box<dyn CommentResolver>,
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyResolver {
    /// Resolver with the default adapters and comment wrapping.
    pub fn new() -> Self {
        Self {
            adapters: default_adapters(),
            overrides: HashMap::new(),
            comments: Box::new(WrappedCommentResolver::default()),
        }
    }

    /// Appends an adapter after the ones already registered.
    pub fn register(&mut self, adapter: Arc<dyn PropertyAdapter>) {
        self.adapters.push(adapter);
    }

    /// Makes an adapter available to fields that request it by name.
    pub fn register_override(&mut self, adapter: Arc<dyn PropertyAdapter>) {
        let name = adapter.name().to_string();
        if self.overrides.insert(name.clone(), adapter).is_some() {
            warn!("Override adapter '{name}' registered twice, keeping the last one");
        }
    }

    pub fn set_comment_resolver(&mut self, resolver: Box<dyn CommentResolver>) {
        self.comments = resolver;
    }

    pub fn resolve(&self, field: &FieldView<'_>) -> Result<PropertyKind, ResolutionError> {
        if let Some(requested) = field.meta.adapter.as_deref() {
            let adapter =
                self.overrides
                    .get(requested)
                    .ok_or_else(|| ResolutionError::UnknownAdapter {
                        field: field.field.to_string(),
                        adapter: requested.to_string(),
                    })?;
            let kind = adapter
                .adapt(field)?
                .ok_or_else(|| ResolutionError::AdapterDeclined {
                    field: field.field.to_string(),
                    adapter: requested.to_string(),
                })?;
            return check_compatible(field, requested, kind);
        }

        for adapter in &self.adapters {
            if let Some(kind) = adapter.adapt(field)? {
                return check_compatible(field, adapter.name(), kind);
            }
        }

        Ok(if field.is_section {
            PropertyKind::Section
        } else {
            PropertyKind::Plain
        })
    }

    pub fn comment(&self, field: &FieldView<'_>) -> Option<Comment> {
        self.comments.resolve(field)
    }
}

/// Sections can only be sections, values can be anything else.
fn check_compatible(
    field: &FieldView<'_>,
    adapter: &str,
    kind: PropertyKind,
) -> Result<PropertyKind, ResolutionError> {
    if field.is_section == matches!(kind, PropertyKind::Section) {
        Ok(kind)
    } else {
        Err(ResolutionError::Incompatible {
            field: field.field.to_string(),
            adapter: adapter.to_string(),
            kind: kind.to_string(),
        })
    }
}
