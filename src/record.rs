//! Record capabilities.
//!
//! [`Record`] is the shape every schema-bearing type has: a fixed, ordered set
//! of named fields it can hand out and be rebuilt from. On top of that a type
//! opts into [`Serializable`] (JSON in and out) and/or [`Replaceable`] (copy
//! with overrides) by implementing the trait with an empty body. Neither
//! requires the other.
//!
//! ```rust
//! use connect4::{record, replace, Mode, Replaceable, Serializable};
//!
//! record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Point {
//!         pub x: i64,
//!         pub y: i64 = 0,
//!         pub label: Option<String> = None,
//!     }
//! }
//!
//! impl Serializable for Point {}
//! impl Replaceable for Point {}
//!
//! let p = Point::from_json(&serde_json::json!({"x": 3}).as_object().unwrap().clone(), Mode::Lenient).unwrap();
//! assert_eq!(p, Point { x: 3, y: 0, label: None });
//! let q = replace!(p, y = 4i64).unwrap();
//! assert_eq!(serde_json::Value::Object(q.to_json()), serde_json::json!({"x": 3, "y": 4}));
//! ```

use crate::decode::{self, Mode};
use crate::encode::{self, encode_value, FieldFilter};
use crate::error::{Error, Result};
use crate::schema::{FieldDecl, Schema};
use crate::value::{json_label, Fields, Value};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::any::Any;

/// A plain, immutable aggregate of named fields with a schema.
///
/// Implemented by the [`record!`](crate::record!) macro; implement it by hand
/// only for records with derived state.
pub trait Record: Sized + Clone + 'static {
    /// Fully qualified type name used in errors.
    const TYPE_NAME: &'static str;

    /// Fields in declaration order, with their declared types.
    fn declared_fields() -> Vec<FieldDecl>;

    /// Resolved schema, derived once per type.
    fn schema() -> Result<&'static Schema>;

    /// Every field's current value, in schema order.
    fn to_fields(&self) -> Fields;

    /// Build an instance, applying defaults for missing fields.
    fn from_fields(fields: Fields) -> Result<Self>;
}

/// JSON conversion for a record.
pub trait Serializable: Record {
    /// Encode, dropping absent fields.
    fn to_json(&self) -> JsonMap<String, JsonValue> {
        encode::encode(self, &FieldFilter::default())
    }

    /// Encode with an explicit field filter.
    fn to_json_with(&self, filter: &FieldFilter) -> JsonMap<String, JsonValue> {
        encode::encode(self, filter)
    }

    /// Decode from a JSON object.
    fn from_json(raw: &JsonMap<String, JsonValue>, mode: Mode) -> Result<Self> {
        decode::decode_record(raw, mode)
    }

    /// Decode from any JSON value; fails unless it is an object.
    fn from_json_value(raw: &JsonValue, mode: Mode) -> Result<Self> {
        match raw {
            JsonValue::Object(map) => Self::from_json(map, mode),
            other => Err(Error::NotARecord {
                type_name: json_label(other),
            }),
        }
    }

    /// Convert an arbitrary value into this record. See [`decode::coerce`].
    fn coerce(source: Option<&dyn Reflect>, mode: Mode) -> Result<Option<Self>> {
        decode::coerce(source, mode)
    }
}

/// Structural copy with named overrides.
pub trait Replaceable: Record {
    /// New instance with the named fields replaced; `self` is untouched.
    ///
    /// Unknown names fail with [`Error::UnknownField`]; values that do not fit
    /// the field's type fail the same way decoding would.
    fn replace<I, K>(&self, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let schema = Self::schema()?;
        let mut fields = self.to_fields();
        for (name, value) in overrides {
            let name = name.as_ref();
            let spec = schema.field(name).ok_or_else(|| Error::UnknownField {
                field: name.to_string(),
                type_name: Self::TYPE_NAME.to_string(),
            })?;
            fields.insert(spec.name(), value);
        }
        Self::from_fields(fields)
    }
}

/// Structural view of an arbitrary value, used by [`decode::coerce`].
pub trait Reflect {
    /// Name of the concrete type, for errors.
    fn type_name(&self) -> String;

    /// Downcast hook so an instance of the target record is returned as-is.
    fn as_any(&self) -> &dyn Any;

    /// `true` if the value stands for "nothing".
    fn is_null(&self) -> bool {
        false
    }

    /// The value's own JSON encoding, when it has one.
    fn encoded(&self) -> Option<JsonMap<String, JsonValue>> {
        None
    }

    /// Visible fields as name/value pairs.
    fn reflect_fields(&self) -> Result<Vec<(String, Value)>>;
}

impl Reflect for JsonMap<String, JsonValue> {
    fn type_name(&self) -> String {
        "object".into()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect_fields(&self) -> Result<Vec<(String, Value)>> {
        Ok(self
            .iter()
            .map(|(k, v)| (k.clone(), Value::Json(v.clone())))
            .collect())
    }
}

impl Reflect for JsonValue {
    fn type_name(&self) -> String {
        json_label(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    fn reflect_fields(&self) -> Result<Vec<(String, Value)>> {
        match self {
            JsonValue::Object(map) => map.reflect_fields(),
            other => Err(Error::NotARecord {
                type_name: json_label(other),
            }),
        }
    }
}

impl Reflect for IndexMap<String, Value> {
    fn type_name(&self) -> String {
        "mapping".into()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect_fields(&self) -> Result<Vec<(String, Value)>> {
        Ok(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl Reflect for Value {
    fn type_name(&self) -> String {
        self.label()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_null(&self) -> bool {
        self.is_absent()
    }

    fn encoded(&self) -> Option<JsonMap<String, JsonValue>> {
        match self {
            Value::Record(fields) => Some(encode::encode_fields(fields, &FieldFilter::KeepAll)),
            _ => None,
        }
    }

    fn reflect_fields(&self) -> Result<Vec<(String, Value)>> {
        match self {
            Value::Record(fields) => Ok(fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect()),
            Value::Named(fields) => Ok(fields.clone()),
            Value::Map(map) => map.reflect_fields(),
            Value::Json(raw) => raw.reflect_fields(),
            other => Err(Error::NotARecord {
                type_name: other.label(),
            }),
        }
    }
}

/// Rebuild record `R` from a decoded value.
#[doc(hidden)]
pub fn record_from_value<R: Record>(value: Value) -> Result<R> {
    match value {
        Value::Record(fields) if fields.type_name() == R::TYPE_NAME => R::from_fields(fields),
        Value::Record(fields) => {
            let raw = encode::encode_fields(&fields, &FieldFilter::KeepAll);
            decode::decode_record(&raw, Mode::Lenient)
        }
        Value::Json(JsonValue::Object(raw)) => decode::decode_record(&raw, Mode::Lenient),
        Value::Map(_) | Value::Named(_) => match encode_value(&value, &FieldFilter::KeepAll) {
            JsonValue::Object(raw) => decode::decode_record(&raw, Mode::Lenient),
            _ => Err(Error::invalid(R::TYPE_NAME, value.label())),
        },
        other => Err(Error::invalid(R::TYPE_NAME, other.label())),
    }
}

/// Declare a record type.
///
/// Wraps a plain struct definition; fields may carry a default written as
/// `name: Type = expr`. Generates the [`Record`] impl and the glue that lets
/// the type be used as a field of other records.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const TYPE_NAME: &'static str = concat!(module_path!(), "::", stringify!($name));

            fn declared_fields() -> ::std::vec::Vec<$crate::FieldDecl> {
                ::std::vec![$(
                    $crate::FieldDecl {
                        name: stringify!($field),
                        declared: <$ty as $crate::Describe>::declared_type(),
                        has_default: $crate::__record_has_default!($($default)?),
                    }
                ),*]
            }

            fn schema() -> $crate::Result<&'static $crate::Schema> {
                static SCHEMA: ::std::sync::OnceLock<$crate::Result<$crate::Schema>> =
                    ::std::sync::OnceLock::new();
                $crate::Schema::cached(&SCHEMA, Self::TYPE_NAME, Self::declared_fields)
            }

            fn to_fields(&self) -> $crate::Fields {
                #[allow(unused_mut)]
                let mut fields = $crate::Fields::new(Self::TYPE_NAME);
                $(
                    fields.insert(stringify!($field), $crate::ToValue::to_value(&self.$field));
                )*
                fields
            }

            #[allow(unused_mut, unused_variables)]
            fn from_fields(mut fields: $crate::Fields) -> $crate::Result<Self> {
                ::std::result::Result::Ok(Self {
                    $(
                        $field: $crate::__record_take!(fields, $field, $ty $(, $default)?),
                    )*
                })
            }
        }

        $crate::record_glue!($name);
    };
}

/// Implement the field-level traits for a type that already implements
/// [`Record`], so it can be nested inside other records.
#[macro_export]
macro_rules! record_glue {
    ($name:ty) => {
        impl $crate::Describe for $name {
            fn declared_type() -> $crate::DeclaredType {
                $crate::DeclaredType::Class($crate::ClassInfo::record::<Self>())
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record($crate::Record::to_fields(self))
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::record::record_from_value::<Self>(value)
            }
        }

        impl $crate::Reflect for $name {
            fn type_name(&self) -> ::std::string::String {
                <Self as $crate::Record>::TYPE_NAME.to_string()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn encoded(
                &self,
            ) -> ::std::option::Option<$crate::JsonMap>
            {
                ::std::option::Option::Some($crate::encode(self, &$crate::FieldFilter::KeepAll))
            }

            fn reflect_fields(
                &self,
            ) -> $crate::Result<::std::vec::Vec<(::std::string::String, $crate::Value)>> {
                ::std::result::Result::Ok(
                    $crate::Record::to_fields(self)
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect(),
                )
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_has_default {
    () => {
        false
    };
    ($default:expr) => {
        true
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_take {
    ($fields:ident, $field:ident, $ty:ty) => {
        $fields.take::<$ty>(stringify!($field))?
    };
    ($fields:ident, $field:ident, $ty:ty, $default:expr) => {
        $fields.take_or_else::<$ty, _>(stringify!($field), || $default)?
    };
}

/// `replace!(record, field = value, ...)`: shorthand for
/// [`Replaceable::replace`] with each value converted through
/// [`ToValue`](crate::ToValue).
#[macro_export]
macro_rules! replace {
    ($record:expr, $($field:ident = $value:expr),+ $(,)?) => {
        $crate::Replaceable::replace(
            &$record,
            [$((stringify!($field), $crate::ToValue::to_value(&$value))),+],
        )
    };
}
