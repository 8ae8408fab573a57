//! Error types for schema construction, loading and saving.
//!
//! Errors are grouped by when they can happen:
//!
//! - [`SchemaError`] and [`ResolutionError`] are raised while a schema is built
//!   and are never recovered from.
//! - [`ValidationError`] is raised while reading a single property. The field it
//!   names keeps its previous value.
//! - [`ParseError`] is raised for malformed files and aborts the load.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::number::NumberError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top level error returned by schema building, `load` and `save`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Underlying file-system failure while loading or saving.
    #[error("config file I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A schema that can not be built from the declared fields.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("the property name '{name}' is declared by both '{first}' and '{second}' in {owner}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
        owner: &'static str,
    },
    #[error("{owner} does not declare any config properties")]
    Empty { owner: &'static str },
    /// The value a field was initialised with breaks its own constraints.
    #[error("default of property '{field}' is invalid: {source}")]
    InvalidDefault {
        field: String,
        #[source]
        source: ValidationError,
    },
}

/// Failure to pick a property kind for a field.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("field '{field}' requests adapter '{adapter}' which is not registered")]
    UnknownAdapter { field: String, adapter: String },
    #[error("adapter '{adapter}' requested by field '{field}' does not apply to it")]
    AdapterDeclined { field: String, adapter: String },
    #[error("adapter '{adapter}' resolved field '{field}' to {kind}, which its value can not hold")]
    Incompatible {
        field: String,
        adapter: String,
        kind: String,
    },
    #[error("invalid regex for field '{field}'")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },
    /// A fatal failure raised by an adapter implementation.
    #[error("adapter '{adapter}' failed on field '{field}': {message}")]
    Adapter {
        field: String,
        adapter: String,
        message: String,
    },
}

/// A value that does not satisfy the constraints of its property.
#[derive(Debug, Error)]
#[error("invalid value for property '{field}': {violation}")]
pub struct ValidationError {
    pub field: String,
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, violation: Violation) -> Self {
        Self {
            field: field.into(),
            violation,
        }
    }
}

/// The constraint broken by a value.
#[derive(Debug, Error)]
pub enum Violation {
    #[error("value must not be null")]
    Null,
    #[error("expected {expected}")]
    WrongShape { expected: &'static str },
    #[error("value '{value}' is less than the minimum value '{min}'")]
    BelowMinimum { value: String, min: String },
    #[error("value '{value}' is greater than the maximum value '{max}'")]
    AboveMaximum { value: String, max: String },
    #[error("value '{value}' does not match the pattern '{pattern}'")]
    PatternMismatch { value: String, pattern: String },
    #[error("value must not be empty, at least one entry is required")]
    Empty,
    #[error(transparent)]
    Number(#[from] NumberError),
}

/// Malformed file content.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("comments can only be a string or a string array, found {found}")]
    Comment { found: String },
    #[error("expected {expected} at '{path}', found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },
    #[error("can not read value of property '{field}': {source}")]
    Value {
        field: String,
        #[source]
        source: DecodeError,
    },
}

/// Failure to turn a JSON value into a field value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("number {literal} does not fit in {target}")]
    OutOfRange {
        literal: String,
        target: &'static str,
    },
    #[error("expected {expected} entries, found {found}")]
    Length { expected: usize, found: usize },
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn mismatch(expected: impl Into<String>, found: &crate::json::JsonValue) -> Self {
        DecodeError::TypeMismatch {
            expected: expected.into(),
            found: found.describe(),
        }
    }
}
