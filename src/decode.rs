//! Decoding: untyped JSON in, typed [`Value`]s and records out.
//!
//! Every step is driven by a [`TypeDescriptor`]; the decoder never guesses a
//! shape from the raw input.

use crate::descriptor::{PrimitiveKind, TupleShape, TypeDescriptor};
use crate::encode::{encode_value, FieldFilter};
use crate::error::{Error, Result};
use crate::record::{Record, Reflect};
use crate::schema::Schema;
use crate::value::{json_label, Fields, Value};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, trace};

/// How decoding treats input keys the schema does not declare.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Drop unknown keys silently.
    #[default]
    Lenient,
    /// Fail with [`Error::UnknownField`].
    Strict,
}

impl Mode {
    /// `true` for [`Mode::Strict`].
    pub fn is_strict(self) -> bool {
        matches!(self, Mode::Strict)
    }
}

/// Decode one raw value against its descriptor.
pub fn decode(descriptor: &TypeDescriptor, raw: &JsonValue, mode: Mode) -> Result<Value> {
    match descriptor {
        TypeDescriptor::Opaque => Ok(Value::Json(raw.clone())),
        TypeDescriptor::Primitive(kind) => convert_primitive(*kind, raw),
        TypeDescriptor::Optional(inner) => {
            if raw.is_null() {
                Ok(Value::None)
            } else {
                decode(inner, raw, mode)
            }
        }
        TypeDescriptor::List(element) => decode_items(element, raw, mode, "list").map(Value::List),
        TypeDescriptor::Set(element) => {
            decode_items(element, raw, mode, "set").map(|items| Value::Set(to_set(items)))
        }
        TypeDescriptor::FrozenSet(element) => decode_items(element, raw, mode, "frozenset")
            .map(|items| Value::FrozenSet(to_set(items))),
        TypeDescriptor::Tuple(TupleShape::Repeat(element)) => {
            decode_items(element, raw, mode, "tuple").map(Value::Tuple)
        }
        TypeDescriptor::Tuple(TupleShape::Fixed(elements)) => {
            let items = as_array(raw, "tuple")?;
            if items.len() != elements.len() {
                return Err(Error::ArityMismatch {
                    expected: elements.len(),
                    actual: items.len(),
                });
            }
            elements
                .iter()
                .zip(items)
                .map(|(element, item)| decode(element, item, mode))
                .collect::<Result<Vec<_>>>()
                .map(Value::Tuple)
        }
        TypeDescriptor::OrderedMapping(element) => {
            let map = raw
                .as_object()
                .ok_or_else(|| Error::invalid("mapping", json_label(raw)))?;
            map.iter()
                .map(|(key, item)| Ok((key.clone(), decode(element, item, mode)?)))
                .collect::<Result<IndexMap<_, _>>>()
                .map(Value::Map)
        }
        TypeDescriptor::Record(record) => match raw {
            JsonValue::Object(map) => decode_fields(record.schema()?, map, mode).map(Value::Record),
            other => Err(Error::invalid(
                format!("record `{}`", record.name()),
                json_label(other),
            )),
        },
    }
}

fn as_array<'a>(raw: &'a JsonValue, expected: &str) -> Result<&'a Vec<JsonValue>> {
    raw.as_array()
        .ok_or_else(|| Error::invalid(expected, json_label(raw)))
}

fn decode_items(
    element: &TypeDescriptor,
    raw: &JsonValue,
    mode: Mode,
    expected: &str,
) -> Result<Vec<Value>> {
    as_array(raw, expected)?
        .iter()
        .map(|item| decode(element, item, mode))
        .collect()
}

fn to_set(items: Vec<Value>) -> BTreeSet<Value> {
    items.into_iter().collect()
}

/// Apply a scalar's conversion constructor to a raw value.
///
/// Values already of the target kind pass through. Numeric strings convert to
/// numbers, integral floats to ints, numbers and booleans to strings. Anything
/// else is an [`Error::InvalidValue`].
pub fn convert_primitive(kind: PrimitiveKind, raw: &JsonValue) -> Result<Value> {
    let converted = match (kind, raw) {
        (PrimitiveKind::Bool, JsonValue::Bool(b)) => Some(Value::Bool(*b)),
        (PrimitiveKind::Bool, JsonValue::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (PrimitiveKind::Int, JsonValue::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_u64().map(Value::UInt))
            .or_else(|| {
                n.as_f64()
                    .filter(|x| x.fract() == 0.0 && *x >= i64::MIN as f64 && *x < i64::MAX as f64)
                    .map(|x| Value::Int(x as i64))
            }),
        (PrimitiveKind::Int, JsonValue::String(s)) => {
            let s = s.trim();
            s.parse()
                .map(Value::Int)
                .or_else(|_| s.parse().map(Value::UInt))
                .ok()
        }
        (PrimitiveKind::Float, JsonValue::Number(n)) => n.as_f64().map(Value::Float),
        (PrimitiveKind::Float, JsonValue::String(s)) => s.trim().parse().ok().map(Value::Float),
        (PrimitiveKind::Str, JsonValue::String(s)) => Some(Value::Str(s.clone())),
        (PrimitiveKind::Str, JsonValue::Number(n)) => Some(Value::Str(n.to_string())),
        (PrimitiveKind::Str, JsonValue::Bool(b)) => Some(Value::Str(b.to_string())),
        (PrimitiveKind::Path, JsonValue::String(s)) => Some(Value::Path(PathBuf::from(s))),
        (PrimitiveKind::Pattern, JsonValue::String(s)) => {
            return Regex::new(s)
                .map(Value::Pattern)
                .map_err(|e| Error::invalid("Pattern", e.to_string()));
        }
        (PrimitiveKind::Sequence, JsonValue::Array(_))
        | (PrimitiveKind::Mapping, JsonValue::Object(_)) => Some(Value::Json(raw.clone())),
        _ => None,
    };
    converted.ok_or_else(|| Error::invalid(kind.to_string(), json_label(raw)))
}

/// Decode a raw object into the fields of the record described by `schema`.
///
/// The result is in schema order regardless of input order. Unknown keys fail
/// in [`Mode::Strict`] and are dropped in [`Mode::Lenient`]; required fields
/// missing from the input fail with [`Error::MissingRequiredField`]. An
/// explicit `null` counts as present.
pub fn decode_fields(
    schema: &Schema,
    raw: &JsonMap<String, JsonValue>,
    mode: Mode,
) -> Result<Fields> {
    let type_name = schema.type_name();
    let mut decoded: IndexMap<&'static str, Value> = IndexMap::with_capacity(raw.len());

    for (key, item) in raw {
        let Some(spec) = schema.field(key) else {
            if mode.is_strict() {
                debug!(record = type_name, field = %key, "rejected unknown field");
                return Err(Error::UnknownField {
                    field: key.clone(),
                    type_name: type_name.to_string(),
                });
            }
            trace!(record = type_name, field = %key, "dropped unknown field");
            continue;
        };
        let value = decode(spec.descriptor(), item, mode)
            .map_err(|e| e.at_field(spec.name(), type_name))?;
        decoded.insert(spec.name(), value);
    }

    let mut fields = Fields::new(type_name);
    for spec in schema.fields() {
        match decoded.swap_remove(spec.name()) {
            Some(value) => {
                fields.insert(spec.name(), value);
            }
            None if spec.is_required() => {
                return Err(Error::MissingRequiredField {
                    field: spec.name().to_string(),
                    type_name: type_name.to_string(),
                });
            }
            None => {}
        }
    }
    Ok(fields)
}

/// Decode a raw object into record `R`.
pub fn decode_record<R: Record>(raw: &JsonMap<String, JsonValue>, mode: Mode) -> Result<R> {
    let fields = decode_fields(R::schema()?, raw, mode)?;
    R::from_fields(fields)
}

/// Turn an arbitrary value into record `R`.
///
/// `None` or a null-like source gives `Ok(None)`. An `R` is returned as-is.
/// A source with its own encoding is decoded from that encoding (with every
/// field kept); anything else is decoded from its visible fields.
pub fn coerce<R: Record>(source: Option<&dyn Reflect>, mode: Mode) -> Result<Option<R>> {
    let Some(source) = source.filter(|s| !s.is_null()) else {
        return Ok(None);
    };
    if let Some(same) = source.as_any().downcast_ref::<R>() {
        return Ok(Some(same.clone()));
    }

    let raw = match source.encoded() {
        Some(raw) => raw,
        None => source
            .reflect_fields()?
            .into_iter()
            .map(|(name, value)| (name, encode_value(&value, &FieldFilter::KeepAll)))
            .collect(),
    };
    decode_record(&raw, mode).map(Some)
}
