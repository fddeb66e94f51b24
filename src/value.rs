//! Runtime representation of decoded values and the conversions between
//! [`Value`] and concrete Rust field types.

use crate::decode::convert_primitive;
use crate::descriptor::PrimitiveKind;
use crate::encode::{encode_value, FieldFilter};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Number, Value as JsonValue};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

/// A typed value produced by decoding, or taken from a record for encoding.
///
/// `Value` is totally ordered so sets of values iterate in a stable order:
/// variants are ranked first and numbers compare numerically across `Int`,
/// `UInt` and `Float`. Patterns compare by source. Opaque JSON numbers compare
/// numerically too; other opaque values fall back to their text.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent sentinel. Decoded `null` of an optional field.
    None,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Unsigned integer above `i64::MAX`.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// Filesystem path.
    Path(PathBuf),
    /// Compiled regular expression.
    Pattern(Regex),
    /// Ordered, growable sequence.
    List(Vec<Value>),
    /// Fixed or homogeneous tuple.
    Tuple(Vec<Value>),
    /// Mutable set.
    Set(BTreeSet<Value>),
    /// Immutable set.
    FrozenSet(BTreeSet<Value>),
    /// Ordered mapping with string keys.
    Map(IndexMap<String, Value>),
    /// Nested record.
    Record(Fields),
    /// Tuple with named positions; encodes as a plain sequence.
    Named(Vec<(String, Value)>),
    /// Opaque pass-through value.
    Json(JsonValue),
}

impl Value {
    /// Build a named-position tuple from `(name, value)` pairs.
    pub fn named<I, S>(fields: I) -> Value
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Named(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `true` for the absent sentinel and for opaque JSON `null`.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::None | Value::Json(JsonValue::Null))
    }

    /// Short human-readable description of the value's shape, for errors.
    pub fn label(&self) -> String {
        match self {
            Value::None => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(n) => format!("int {n}"),
            Value::UInt(n) => format!("int {n}"),
            Value::Float(x) => format!("float {x}"),
            Value::Str(s) => format!("str {s:?}"),
            Value::Path(_) => "path".into(),
            Value::Pattern(_) => "pattern".into(),
            Value::List(_) => "list".into(),
            Value::Tuple(_) => "tuple".into(),
            Value::Set(_) => "set".into(),
            Value::FrozenSet(_) => "frozenset".into(),
            Value::Map(_) => "mapping".into(),
            Value::Record(fields) => format!("record `{}`", fields.type_name()),
            Value::Named(_) => "named tuple".into(),
            Value::Json(raw) => json_label(raw),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::None => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Path(_) => 4,
            Value::Pattern(_) => 5,
            Value::List(_) => 6,
            Value::Tuple(_) => 7,
            Value::Set(_) => 8,
            Value::FrozenSet(_) => 9,
            Value::Map(_) => 10,
            Value::Record(_) => 11,
            Value::Named(_) => 12,
            Value::Json(_) => 13,
        }
    }
}

pub(crate) fn json_label(raw: &JsonValue) -> String {
    match raw {
        JsonValue::Null => "null".into(),
        JsonValue::Bool(_) => "bool".into(),
        JsonValue::Number(n) => format!("number {n}"),
        JsonValue::String(s) => format!("string {s:?}"),
        JsonValue::Array(_) => "array".into(),
        JsonValue::Object(_) => "object".into(),
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::None, Value::None) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            // Equal magnitudes still order ints before floats so `Eq` stays exact.
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Value::UInt(a), Value::UInt(b)) => a.cmp(b),
            (Value::Int(a), Value::UInt(b)) => match u64::try_from(*a) {
                Ok(a) => a.cmp(b).then(Ordering::Less),
                Err(_) => Ordering::Less,
            },
            (Value::UInt(a), Value::Int(b)) => match u64::try_from(*b) {
                Ok(b) => a.cmp(&b).then(Ordering::Greater),
                Err(_) => Ordering::Greater,
            },
            (Value::UInt(a), Value::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Value::Float(a), Value::UInt(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Path(a), Value::Path(b)) => a.cmp(b),
            (Value::Pattern(a), Value::Pattern(b)) => a.as_str().cmp(b.as_str()),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) | (Value::FrozenSet(a), Value::FrozenSet(b)) => {
                a.cmp(b)
            }
            (Value::Map(a), Value::Map(b)) => a.iter().cmp(b.iter()),
            (Value::Record(a), Value::Record(b)) => a.cmp(b),
            (Value::Named(a), Value::Named(b)) => a.cmp(b),
            (Value::Json(JsonValue::Number(a)), Value::Json(JsonValue::Number(b))) => {
                number_cmp(a, b)
            }
            (Value::Json(a), Value::Json(b)) => a.to_string().cmp(&b.to_string()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Numeric order for raw JSON numbers, exact for integers of either sign.
/// Ties (`1` against `1.0`) are broken by text so `Eq` stays exact.
fn number_cmp(a: &Number, b: &Number) -> Ordering {
    let numeric = match (a.as_i64(), b.as_i64(), a.as_u64(), b.as_u64()) {
        (Some(x), Some(y), _, _) => x.cmp(&y),
        (_, _, Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None, _, Some(_)) => Ordering::Less,
        (None, Some(_), Some(_), _) => Ordering::Greater,
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    };
    numeric.then_with(|| a.to_string().cmp(&b.to_string()))
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Whether a field was supplied, supplied as `null`, or supplied with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence<T> {
    /// The key is not there at all.
    Missing,
    /// The key is there with an explicit `null`.
    Null,
    /// The key is there with a value.
    Value(T),
}

/// Ordered field-name to value bag for one record.
///
/// Encoding fills it from a record in schema order; decoding fills it from raw
/// input and hands it to the record constructor, which takes its fields out.
#[derive(Debug, Clone)]
pub struct Fields {
    type_name: &'static str,
    entries: IndexMap<&'static str, Value>,
}

impl Fields {
    /// Empty bag for the record type `type_name`.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            entries: IndexMap::new(),
        }
    }

    /// Fully qualified name of the record these fields belong to.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Set a field, returning the previous value if there was one. Keeps the
    /// original position when overwriting.
    pub fn insert(&mut self, name: &'static str, value: Value) -> Option<Value> {
        self.entries.insert(name, value)
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// `true` if the field was supplied (even as `null`).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Tri-state lookup separating a missing key from an explicit `null`.
    pub fn presence(&self, name: &str) -> Presence<&Value> {
        match self.entries.get(name) {
            None => Presence::Missing,
            Some(v) if v.is_absent() => Presence::Null,
            Some(v) => Presence::Value(v),
        }
    }

    /// Remove and convert a field that has no default.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        match self.entries.shift_remove(name) {
            Some(value) => T::from_value(value).map_err(|e| e.at_field(name, self.type_name)),
            None => Err(Error::MissingRequiredField {
                field: name.to_string(),
                type_name: self.type_name.to_string(),
            }),
        }
    }

    /// Remove and convert a field, falling back to `default` when it is missing.
    pub fn take_or_else<T, F>(&mut self, name: &str, default: F) -> Result<T>
    where
        T: FromValue,
        F: FnOnce() -> T,
    {
        match self.entries.shift_remove(name) {
            Some(value) => T::from_value(value).map_err(|e| e.at_field(name, self.type_name)),
            None => Ok(default()),
        }
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl IntoIterator for Fields {
    type Item = (&'static str, Value);
    type IntoIter = indexmap::map::IntoIter<&'static str, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Ord for Fields {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(other.type_name)
            .then_with(|| self.entries.iter().cmp(other.entries.iter()))
    }
}

impl PartialOrd for Fields {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fields {}

// ---------------------------------------------------------------------------
// Collection wrappers
// ---------------------------------------------------------------------------

/// Immutable set. Shares its storage on clone and hands out only shared
/// references.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrozenSet<T>(Arc<BTreeSet<T>>);

impl<T: Ord> FrozenSet<T> {
    /// Freeze an existing set.
    pub fn new(set: BTreeSet<T>) -> Self {
        Self(Arc::new(set))
    }
}

impl<T: Ord> Default for FrozenSet<T> {
    fn default() -> Self {
        Self::new(BTreeSet::new())
    }
}

impl<T> Deref for FrozenSet<T> {
    type Target = BTreeSet<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Ord> From<BTreeSet<T>> for FrozenSet<T> {
    fn from(set: BTreeSet<T>) -> Self {
        Self::new(set)
    }
}

impl<T: Ord> FromIterator<T> for FrozenSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Homogeneous tuple of any length (`tuple[T, ...]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleOf<T>(Vec<T>);

impl<T> TupleOf<T> {
    /// Unwrap into the underlying vector.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for TupleOf<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<Vec<T>> for TupleOf<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for TupleOf<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Protobuf-style enum number. Decoded as-is, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumValue(pub i32);

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Convert a field value into its runtime [`Value`].
pub trait ToValue {
    /// Snapshot `self` as a [`Value`].
    fn to_value(&self) -> Value;
}

/// Build a field value from a decoded [`Value`].
pub trait FromValue: Sized {
    /// Convert, failing with [`Error::InvalidValue`] on a shape mismatch.
    fn from_value(value: Value) -> Result<Self>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

/// Normalize a scalar-ish value to the variant `kind` produces, running the
/// primitive conversion for anything that is not already of that kind.
fn scalar(kind: PrimitiveKind, value: Value) -> Result<Value> {
    let raw = match (kind, value) {
        (PrimitiveKind::Bool, v @ Value::Bool(_))
        | (PrimitiveKind::Int, v @ Value::Int(_))
        | (PrimitiveKind::Int, v @ Value::UInt(_))
        | (PrimitiveKind::Float, v @ Value::Float(_))
        | (PrimitiveKind::Str, v @ Value::Str(_))
        | (PrimitiveKind::Path, v @ Value::Path(_))
        | (PrimitiveKind::Pattern, v @ Value::Pattern(_)) => return Ok(v),
        (PrimitiveKind::Float, Value::Int(n)) => return Ok(Value::Float(n as f64)),
        (PrimitiveKind::Float, Value::UInt(n)) => return Ok(Value::Float(n as f64)),
        (_, Value::Json(raw)) => raw,
        (_, Value::Bool(b)) => JsonValue::Bool(b),
        (_, Value::Int(n)) => JsonValue::from(n),
        (_, Value::UInt(n)) => JsonValue::from(n),
        (_, Value::Float(x)) => JsonValue::from(x),
        (_, Value::Str(s)) => JsonValue::String(s),
        (_, other) => return Err(Error::invalid(kind.to_string(), other.label())),
    };
    convert_primitive(kind, &raw)
}

fn int_value(value: Value, target: &str) -> Result<i64> {
    match scalar(PrimitiveKind::Int, value)? {
        Value::Int(n) => Ok(n),
        other => Err(Error::invalid(target, other.label())),
    }
}

macro_rules! impl_small_int {
    ($($t:ty),*) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self> {
                let n = int_value(value, stringify!($t))?;
                <$t>::try_from(n).map_err(|_| Error::invalid(stringify!($t), format!("int {n}")))
            }
        }
    )*};
}

impl_small_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl FromValue for isize {
    fn from_value(value: Value) -> Result<Self> {
        let n = int_value(value, "isize")?;
        isize::try_from(n).map_err(|_| Error::invalid("isize", format!("int {n}")))
    }
}

macro_rules! impl_unsigned_int {
    ($($t:ty),*) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                let n = *self as u64;
                i64::try_from(n).map_or(Value::UInt(n), Value::Int)
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self> {
                let n = match scalar(PrimitiveKind::Int, value)? {
                    Value::Int(n) => u64::try_from(n)
                        .map_err(|_| Error::invalid(stringify!($t), format!("int {n}")))?,
                    Value::UInt(n) => n,
                    other => return Err(Error::invalid(stringify!($t), other.label())),
                };
                <$t>::try_from(n).map_err(|_| Error::invalid(stringify!($t), format!("int {n}")))
            }
        }
    )*};
}

impl_unsigned_int!(u64, usize);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match scalar(PrimitiveKind::Float, value)? {
            Value::Float(x) => Ok(x),
            other => Err(Error::invalid("float", other.label())),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match scalar(PrimitiveKind::Bool, value)? {
            Value::Bool(b) => Ok(b),
            other => Err(Error::invalid("bool", other.label())),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Str((*self).to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match scalar(PrimitiveKind::Str, value)? {
            Value::Str(s) => Ok(s),
            other => Err(Error::invalid("str", other.label())),
        }
    }
}

impl ToValue for PathBuf {
    fn to_value(&self) -> Value {
        Value::Path(self.clone())
    }
}

impl FromValue for PathBuf {
    fn from_value(value: Value) -> Result<Self> {
        match scalar(PrimitiveKind::Path, value)? {
            Value::Path(p) => Ok(p),
            other => Err(Error::invalid("Path", other.label())),
        }
    }
}

impl ToValue for Regex {
    fn to_value(&self) -> Value {
        Value::Pattern(self.clone())
    }
}

impl FromValue for Regex {
    fn from_value(value: Value) -> Result<Self> {
        match scalar(PrimitiveKind::Pattern, value)? {
            Value::Pattern(r) => Ok(r),
            other => Err(Error::invalid("Pattern", other.label())),
        }
    }
}

impl ToValue for EnumValue {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(self.0))
    }
}

impl FromValue for EnumValue {
    fn from_value(value: Value) -> Result<Self> {
        let n = match &value {
            Value::Int(n) => Some(*n),
            Value::Json(JsonValue::Number(n)) => n.as_i64(),
            _ => None,
        };
        n.and_then(|n| i32::try_from(n).ok())
            .map(EnumValue)
            .ok_or_else(|| Error::invalid("enum number", value.label()))
    }
}

impl ToValue for JsonValue {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl FromValue for JsonValue {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(raw) => Ok(raw),
            other => Ok(encode_value(&other, &FieldFilter::KeepAll)),
        }
    }
}

impl ToValue for serde_json::Map<String, JsonValue> {
    fn to_value(&self) -> Value {
        Value::Json(JsonValue::Object(self.clone()))
    }
}

impl FromValue for serde_json::Map<String, JsonValue> {
    fn from_value(value: Value) -> Result<Self> {
        match JsonValue::from_value(value)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(Error::invalid("object", json_label(&other))),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        if value.is_absent() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Flatten any sequence-shaped value into its elements.
fn into_items(value: Value, expected: &str) -> Result<Vec<Value>> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        Value::Set(items) | Value::FrozenSet(items) => Ok(items.into_iter().collect()),
        Value::Named(fields) => Ok(fields.into_iter().map(|(_, v)| v).collect()),
        Value::Json(JsonValue::Array(items)) => Ok(items.into_iter().map(Value::Json).collect()),
        other => Err(Error::invalid(expected, other.label())),
    }
}

fn into_entries(value: Value, expected: &str) -> Result<Vec<(String, Value)>> {
    match value {
        Value::Map(map) => Ok(map.into_iter().collect()),
        Value::Json(JsonValue::Object(map)) => {
            Ok(map.into_iter().map(|(k, v)| (k, Value::Json(v))).collect())
        }
        other => Err(Error::invalid(expected, other.label())),
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        into_items(value, "list")?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: Value) -> Result<Self> {
        into_items(value, "set")?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: ToValue> ToValue for FrozenSet<T> {
    fn to_value(&self) -> Value {
        Value::FrozenSet(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue + Ord> FromValue for FrozenSet<T> {
    fn from_value(value: Value) -> Result<Self> {
        BTreeSet::from_value(value).map(FrozenSet::new)
    }
}

impl<T: ToValue> ToValue for TupleOf<T> {
    fn to_value(&self) -> Value {
        Value::Tuple(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for TupleOf<T> {
    fn from_value(value: Value) -> Result<Self> {
        Vec::from_value(value).map(TupleOf)
    }
}

impl<V: ToValue> ToValue for IndexMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<V: FromValue> FromValue for IndexMap<String, V> {
    fn from_value(value: Value) -> Result<Self> {
        into_entries(value, "mapping")?
            .into_iter()
            .map(|(k, v)| Ok((k, V::from_value(v)?)))
            .collect()
    }
}

impl<V: ToValue> ToValue for BTreeMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<V: FromValue> FromValue for BTreeMap<String, V> {
    fn from_value(value: Value) -> Result<Self> {
        into_entries(value, "mapping")?
            .into_iter()
            .map(|(k, v)| Ok((k, V::from_value(v)?)))
            .collect()
    }
}

macro_rules! impl_tuple {
    ($len:literal; $($name:ident $var:ident),+) => {
        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            fn to_value(&self) -> Value {
                let ($($var,)+) = self;
                Value::Tuple(vec![$($var.to_value()),+])
            }
        }

        impl<$($name: FromValue),+> FromValue for ($($name,)+) {
            fn from_value(value: Value) -> Result<Self> {
                let items = into_items(value, "tuple")?;
                let actual = items.len();
                let [$($var),+] = <[Value; $len]>::try_from(items)
                    .map_err(|_| Error::ArityMismatch { expected: $len, actual })?;
                Ok(($($name::from_value($var)?,)+))
            }
        }
    };
}

impl_tuple!(1; A a);
impl_tuple!(2; A a, B b);
impl_tuple!(3; A a, B b, C c);
impl_tuple!(4; A a, B b, C c, D d);
