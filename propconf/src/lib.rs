//! # propconf
//!
//! Self-describing JSON config files mapped onto typed Rust structs.
//!
//! Every field of a config struct becomes a *property*: an object holding the
//! live value next to human readable decorations such as a comment, the
//! default value, the allowed range or the pattern a string must match. Users
//! can edit the file without any other documentation, and the program reads
//! back only the values.
//!
//! ## Features
//!
//! - Explicit field declaration, no macros or reflection
//! - Ranged numbers, regex checked strings and non-empty collections
//! - Exact comparison across integers, floats, `BigInt` and `BigDecimal`
//! - NaN and infinities survive a save and load
//! - Short arrays of primitives are written on a single line
//! - Nested config objects with their own schema
//! - Pluggable property adapters and comment resolvers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use propconf::{Config, ConfigManager, FieldMeta, Fields, Result, meta::Bounds};
//!
//! struct Server {
//!     host: String,
//!     workers: i32,
//!     tags: Vec<String>,
//! }
//!
//! impl Config for Server {
//!     fn declare(fields: &mut Fields<'_, Self>) -> Result<()> {
//!         fields
//!             .value(
//!                 "host",
//!                 |s| &s.host,
//!                 |s| &mut s.host,
//!                 FieldMeta::new().comment("Address to bind.").regex("[a-z0-9.-]+"),
//!             )?
//!             .value(
//!                 "workers",
//!                 |s| &s.workers,
//!                 |s| &mut s.workers,
//!                 FieldMeta::new().bounds(Bounds::Int { min: 1, max: 64 }),
//!             )?
//!             .value("tags", |s| &s.tags, |s| &mut s.tags, FieldMeta::new())?;
//!         Ok(())
//!     }
//! }
//!
//! let server = Server {
//!     host: "localhost".into(),
//!     workers: 4,
//!     tags: vec!["edge".into()],
//! };
//! let mut config = ConfigManager::builder("server.json").build(server)?;
//! config.load()?;
//! # Ok::<(), propconf::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Field declaration and the property schema
//! - [`property`] - Property kinds and the read/write protocol
//! - [`adapter`] / [`resolver`] - Choosing the property kind of a field
//! - [`manager`] - Loading and saving files
//! - [`number`] - Numeric comparison across representations
//! - [`comment`] - Comment wrapping and serialization
//! - [`json`] - The document model used for files

#[macro_use]
extern crate log;

/// Property adapters and the default adapter set.
pub mod adapter;

/// Comment model and comment resolvers.
pub mod comment;

/// Error types.
pub mod error;

/// JSON document model, parser and writer.
pub mod json;

/// Loading and saving managed config objects.
pub mod manager;

/// Per-field options.
pub mod meta;

/// Numeric comparison.
pub mod number;

/// Properties and property kinds.
pub mod property;

/// Adapter chain.
pub mod resolver;

/// Config declaration and schemas.
pub mod schema;

/// Values storable in config fields.
pub mod value;

pub use comment::Comment;
pub use error::{Error, Result};
pub use manager::{ConfigManager, ConfigManagerBuilder};
pub use meta::FieldMeta;
pub use property::PropertyKind;
pub use resolver::PropertyResolver;
pub use schema::{Config, Fields, Schema};
pub use value::{ConfigValue, SerdeValue};
