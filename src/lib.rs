//! Type-directed JSON encoding and decoding for plain records, plus the
//! Connect-Four board built on top of it.
//!
//! Declare a record with [`record!`], opt into [`Serializable`] and/or
//! [`Replaceable`], and you're good to go. Field types drive decoding: every
//! declared type is resolved once into a [`TypeDescriptor`] and the decoder
//! dispatches on that.
//!
//! ```rust
//! use connect4::{record, Mode, Serializable};
//!
//! record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Settings {
//!         pub name: String,
//!         pub retries: Option<u32> = None,
//!         pub tags: std::collections::BTreeSet<String> = Default::default(),
//!     }
//! }
//!
//! impl Serializable for Settings {}
//!
//! let raw = serde_json::json!({"name": "demo", "tags": ["b", "a"], "extra": 1});
//! let settings = Settings::from_json_value(&raw, Mode::Lenient).unwrap();
//! assert_eq!(
//!     serde_json::Value::Object(settings.to_json()),
//!     serde_json::json!({"name": "demo", "tags": ["a", "b"]}),
//! );
//! assert!(Settings::from_json_value(&raw, Mode::Strict).is_err());
//! ```
//!
//! **Single-writer only.** A [`Board`] is mutated in place by
//! [`Board::play`]; share it across threads only behind your own lock.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod board;
pub mod decode;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod record;
pub mod schema;
pub mod serializer;
pub mod types;
pub mod value;

pub use board::{Board, BoardConfig, Move, Player};
pub use decode::{coerce, decode, decode_fields, decode_record, Mode};
pub use descriptor::{resolve, PrimitiveKind, RecordType, TupleShape, TypeDescriptor};
pub use encode::{encode, encode_fields, encode_value, FieldFilter};
pub use error::{Error, MoveError, Result};
pub use record::{Record, Reflect, Replaceable, Serializable};
pub use schema::{FieldDecl, FieldSpec, Schema};
pub use serializer::{JsonSerializer, Serializer};
pub use types::{ClassInfo, DeclaredType, Describe, Origin};
pub use value::{EnumValue, Fields, FromValue, FrozenSet, Presence, ToValue, TupleOf, Value};

/// A JSON object, the encoded form of every record.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
