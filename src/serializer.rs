//! Serialization layer. Turns records into bytes and back via serde_json.
//!
//! Implement [`Serializer`] if you need a different format (RON, MessagePack, etc.).

use crate::decode::{decode_record, Mode};
use crate::encode::{encode, FieldFilter};
use crate::error::{Error, Result};
use crate::record::Record;
use serde_json::Value as JsonValue;

/// Converts records to/from bytes.
pub trait Serializer: Send + Sync {
    /// Encode a record to bytes.
    fn serialize<R: Record>(&self, record: &R) -> Result<Vec<u8>>;

    /// Decode bytes back into a record.
    fn deserialize<R: Record>(&self, bytes: &[u8]) -> Result<R>;
}

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
    mode: Mode,
    filter: FieldFilter,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Decode mode for [`Serializer::deserialize`].
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `with_mode(Mode::Strict)`.
    pub fn strict(self) -> Self {
        self.with_mode(Mode::Strict)
    }

    /// Field filter for [`Serializer::serialize`].
    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Encode a record to a JSON string.
    pub fn to_string<R: Record>(&self, record: &R) -> Result<String> {
        let bytes = self.serialize(record)?;
        String::from_utf8(bytes).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Decode a record from a JSON string.
    pub fn from_str<R: Record>(&self, text: &str) -> Result<R> {
        self.deserialize(text.as_bytes())
    }
}

impl Serializer for JsonSerializer {
    fn serialize<R: Record>(&self, record: &R) -> Result<Vec<u8>> {
        let data = encode(record, &self.filter);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&data)
        } else {
            serde_json::to_vec(&data)
        };
        bytes.map_err(Error::from)
    }

    fn deserialize<R: Record>(&self, bytes: &[u8]) -> Result<R> {
        match serde_json::from_slice(bytes)? {
            JsonValue::Object(map) => decode_record(&map, self.mode),
            other => Err(Error::NotARecord {
                type_name: crate::value::json_label(&other),
            }),
        }
    }
}
