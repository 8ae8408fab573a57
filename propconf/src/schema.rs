//! Declaring config objects and mapping them to properties.

use std::{any::type_name, collections::HashMap};

use crate::{
    adapter::FieldView,
    error::{ParseError, Result, SchemaError},
    json::{self, JsonValue, JsonWriter},
    meta::FieldMeta,
    property::{Accessor, Property, PropertyKind, SectionField, ValueField},
    resolver::PropertyResolver,
    value::{ConfigValue, Shape},
};

/// A struct whose fields are stored in a config file.
///
/// ```
/// use propconf::{Config, FieldMeta, Fields, Result, meta::Bounds};
///
/// struct Server {
///     host: String,
///     port: u16,
///     workers: i32,
/// }
///
/// impl Config for Server {
///     fn declare(fields: &mut Fields<'_, Self>) -> Result<()> {
///         fields
///             .value("host", |s| &s.host, |s| &mut s.host, FieldMeta::new())?
///             .value("port", |s| &s.port, |s| &mut s.port, FieldMeta::new())?
///             .value(
///                 "workers",
///                 |s| &s.workers,
///                 |s| &mut s.workers,
///                 FieldMeta::new().bounds(Bounds::Int { min: 1, max: 64 }),
///             )?;
///         Ok(())
///     }
/// }
/// ```
pub trait Config: Sized + 'static {
    /// Registers every configurable field, in file order.
    fn declare(fields: &mut Fields<'_, Self>) -> Result<()>;
}

/// One mapped field of a schema.
pub struct SchemaEntry<T> {
    name: String,
    field: String,
    meta: FieldMeta,
    property: Property<T>,
}

impl<T> SchemaEntry<T> {
    /// Serialized property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn property(&self) -> &Property<T> {
        &self.property
    }
}

/// Field registration for [`Config::declare`].
///
/// Each registration resolves the field right away against the value it holds
/// in the instance the schema is built from. That value becomes the default.
pub struct Fields<'a, T> {
    target: &'a T,
    resolver: &'a PropertyResolver,
    entries: Vec<SchemaEntry<T>>,
    index: HashMap<String, usize>,
}

impl<'a, T: Config> Fields<'a, T> {
    fn new(target: &'a T, resolver: &'a PropertyResolver) -> Self {
        Self {
            target,
            resolver,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers a field holding a plain value.
    pub fn value<V, G, M>(&mut self, field: &str, get: G, get_mut: M, meta: FieldMeta) -> Result<&mut Self>
    where
        V: ConfigValue + Clone + 'static,
        G: Fn(&T) -> &V + 'static,
        M: Fn(&mut T) -> &mut V + 'static,
    {
        let name = meta.serialized_name(field).to_string();
        self.check_unique(&name, field)?;

        let target = self.target;
        let current = get(target);
        let view = FieldView {
            name: &name,
            field,
            meta: &meta,
            value: current.shape(),
            is_section: false,
        };
        let kind = self.resolver.resolve(&view)?;
        if let PropertyKind::Ranged(_) = kind {
            kind.validate(&name, &view.value)
                .map_err(|source| SchemaError::InvalidDefault {
                    field: name.clone(),
                    source,
                })?;
        }
        let comment = self.resolver.comment(&view);

        let property = Property::value(
            name.clone(),
            comment,
            &meta,
            kind,
            ValueField {
                default: current.clone(),
                access: Accessor::new(get, get_mut),
            },
        );
        self.push(name, field, meta, property);
        Ok(self)
    }

    /// Registers a field holding a nested config object.
    ///
    /// The nested object gets a schema of its own, written under the `value`
    /// key of the property.
    pub fn section<S, G, M>(&mut self, field: &str, get: G, get_mut: M, meta: FieldMeta) -> Result<&mut Self>
    where
        S: Config,
        G: Fn(&T) -> &S + 'static,
        M: Fn(&mut T) -> &mut S + 'static,
    {
        let name = meta.serialized_name(field).to_string();
        self.check_unique(&name, field)?;

        let view = FieldView {
            name: &name,
            field,
            meta: &meta,
            value: Shape::Object,
            is_section: true,
        };
        // the resolver only hands out Section for sections
        self.resolver.resolve(&view)?;
        let comment = self.resolver.comment(&view);
        let target = self.target;
        let schema = Schema::build(get(target), self.resolver)?;

        let property = Property::section(
            name.clone(),
            comment,
            &meta,
            SectionField {
                access: Accessor::new(get, get_mut),
                schema,
            },
        );
        self.push(name, field, meta, property);
        Ok(self)
    }

    fn check_unique(&self, name: &str, field: &str) -> Result<(), SchemaError> {
        match self.index.get(name) {
            Some(&i) => Err(SchemaError::DuplicateName {
                name: name.to_string(),
                first: self.entries[i].field.clone(),
                second: field.to_string(),
                owner: type_name::<T>(),
            }),
            None => Ok(()),
        }
    }

    fn push(&mut self, name: String, field: &str, meta: FieldMeta, property: Property<T>) {
        debug!("{name} = {property}");
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(SchemaEntry {
            name,
            field: field.to_string(),
            meta,
            property,
        });
    }
}

/// The ordered properties of a config object.
///
/// A schema is built once from an instance and then reused for every read and
/// write of that type.
pub struct Schema<T> {
    entries: Vec<SchemaEntry<T>>,
    index: HashMap<String, usize>,
}

impl<T: Config> Schema<T> {
    /// Declares the fields of `target` and resolves their properties.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names, on a type without fields, on resolution
    /// failures and on ranged defaults outside of their own range.
    pub fn build(target: &T, resolver: &PropertyResolver) -> Result<Self> {
        let mut fields = Fields::new(target, resolver);
        T::declare(&mut fields)?;
        if fields.entries.is_empty() {
            return Err(SchemaError::Empty {
                owner: type_name::<T>(),
            }
            .into());
        }
        Ok(Self {
            entries: fields.entries,
            index: fields.index,
        })
    }
}

impl<T> Schema<T> {
    pub fn entries(&self) -> &[SchemaEntry<T>] {
        &self.entries
    }

    /// Entry by serialized name.
    pub fn get(&self, name: &str) -> Option<&SchemaEntry<T>> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write(&self, target: &T, out: &mut JsonWriter) {
        out.begin_object();
        for entry in &self.entries {
            out.name(&entry.name);
            entry.property.write(target, out);
        }
        out.end_object();
    }

    /// Applies a document to `target`, property by property.
    ///
    /// Unknown keys are logged and skipped. The first invalid value stops the
    /// read, properties read before it keep their new values.
    pub fn read(&self, target: &mut T, json: &JsonValue) -> Result<()> {
        let entries = json.as_object().ok_or_else(|| ParseError::TypeMismatch {
            path: type_name::<T>().to_string(),
            expected: "object",
            found: json.describe(),
        })?;
        for (key, value) in entries {
            match self.get(key) {
                Some(entry) => entry.property.read(target, value)?,
                None => warn!("Skipping unknown property '{key}' found in config JSON."),
            }
        }
        Ok(())
    }

    /// Renders the whole document.
    pub fn write_string(&self, target: &T, indent: &str) -> String {
        let mut out = JsonWriter::new(indent);
        self.write(target, &mut out);
        out.into_string()
    }

    /// Parses `text` and applies it to `target`.
    pub fn read_str(&self, target: &mut T, text: &str) -> Result<()> {
        let json = json::parse(text)?;
        self.read(target, &json)
    }
}
