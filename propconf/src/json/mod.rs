//! Minimal JSON document model used for config files.
//!
//! - [`value`] - Document tree with literal-preserving numbers
//! - [`reader`] - Lenient parser (accepts NaN and infinities)
//! - [`writer`] - Pretty printer with single-line rendering on demand

/// Lenient parser for config files.
pub mod reader;

/// Document tree.
pub mod value;

/// Streaming pretty printer.
pub mod writer;

pub use reader::parse;
pub use value::{JsonNumber, JsonValue};
pub use writer::{DEFAULT_INDENT, JsonWriter};
