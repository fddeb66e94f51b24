//! Encoding: records and values out to plain JSON.

use crate::record::Record;
use crate::value::{Fields, Value};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;

/// Decides which top-level fields of a record make it into the output.
///
/// Nested records are encoded with the same filter.
#[derive(Clone, Default)]
pub enum FieldFilter {
    /// Drop fields holding the absent sentinel.
    #[default]
    SkipAbsent,
    /// Keep every field.
    KeepAll,
    /// Keep the fields the predicate returns `true` for.
    Custom(Arc<dyn Fn(&str, &Value) -> bool + Send + Sync>),
}

impl FieldFilter {
    /// Filter from a predicate over field name and value.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str, &Value) -> bool + Send + Sync + 'static,
    {
        FieldFilter::Custom(Arc::new(predicate))
    }

    /// `true` if the field should be written.
    pub fn keep(&self, name: &str, value: &Value) -> bool {
        match self {
            FieldFilter::SkipAbsent => !value.is_absent(),
            FieldFilter::KeepAll => true,
            FieldFilter::Custom(predicate) => predicate(name, value),
        }
    }
}

impl fmt::Debug for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFilter::SkipAbsent => f.write_str("SkipAbsent"),
            FieldFilter::KeepAll => f.write_str("KeepAll"),
            FieldFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Encode a record to a JSON object with keys in schema order.
pub fn encode<R: Record>(record: &R, filter: &FieldFilter) -> JsonMap<String, JsonValue> {
    encode_fields(&record.to_fields(), filter)
}

/// Encode a bag of record fields.
pub fn encode_fields(fields: &Fields, filter: &FieldFilter) -> JsonMap<String, JsonValue> {
    fields
        .iter()
        .filter(|(name, value)| filter.keep(name, value))
        .map(|(name, value)| (name.to_string(), encode_value(value, filter)))
        .collect()
}

/// Encode one value.
///
/// Sets come out as arrays in their sorted order, paths in POSIX form and
/// patterns as their source text. Non-finite floats have no JSON form and are
/// written as `null`.
pub fn encode_value(value: &Value, filter: &FieldFilter) -> JsonValue {
    match value {
        Value::None => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::from(*n),
        Value::UInt(n) => JsonValue::from(*n),
        Value::Float(x) => Number::from_f64(*x).map_or(JsonValue::Null, JsonValue::Number),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Path(path) => JsonValue::String(posix_path(path)),
        Value::Pattern(pattern) => JsonValue::String(pattern.as_str().to_string()),
        Value::List(items) | Value::Tuple(items) => encode_items(items.iter(), filter),
        Value::Set(items) | Value::FrozenSet(items) => encode_items(items.iter(), filter),
        Value::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), encode_value(v, filter)))
                .collect(),
        ),
        Value::Record(fields) => JsonValue::Object(encode_fields(fields, filter)),
        Value::Named(fields) => encode_items(fields.iter().map(|(_, v)| v), filter),
        Value::Json(raw) => raw.clone(),
    }
}

fn encode_items<'a>(items: impl Iterator<Item = &'a Value>, filter: &FieldFilter) -> JsonValue {
    JsonValue::Array(items.map(|item| encode_value(item, filter)).collect())
}

/// Render a path with `/` separators whatever the host platform uses.
pub fn posix_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy().into_owned(),
            Component::CurDir => ".".to_string(),
            Component::ParentDir => "..".to_string(),
            Component::Normal(part) => part.to_string_lossy().into_owned(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}
