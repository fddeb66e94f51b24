//! Declared field types.
//!
//! A [`DeclaredType`] is the type expression written on a record field, before
//! the resolver has classified it. Rust field types describe themselves
//! through [`Describe`]; the enum also covers forms no Rust type produces on
//! its own (bare collections, wide unions) so schemas assembled by hand are
//! classified the same way.

use crate::descriptor::{PrimitiveKind, RecordType};
use crate::record::Record;
use crate::value::{EnumValue, FrozenSet, TupleOf};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Generic collection constructors a declared type can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// `list`
    List,
    /// `set`
    Set,
    /// `frozenset`
    FrozenSet,
    /// `tuple`
    Tuple,
    /// `dict`
    Dict,
    /// `OrderedDict`
    OrderedDict,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::List => "list",
            Origin::Set => "set",
            Origin::FrozenSet => "frozenset",
            Origin::Tuple => "tuple",
            Origin::Dict => "dict",
            Origin::OrderedDict => "OrderedDict",
        })
    }
}

/// A user-defined class referenced from a field.
///
/// Carries the record operations when the class has them; the resolver looks
/// at that, not at the name, to decide whether to recurse into it.
#[derive(Debug, Clone, Copy)]
pub struct ClassInfo {
    name: &'static str,
    record: Option<RecordType>,
}

impl ClassInfo {
    /// Class with record shape.
    pub fn record<R: Record>() -> Self {
        Self {
            name: R::TYPE_NAME,
            record: Some(RecordType::of::<R>()),
        }
    }

    /// Class without record operations. Values of it pass through untouched.
    pub fn opaque(name: &'static str) -> Self {
        Self { name, record: None }
    }

    /// Fully qualified class name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Record operations, if the class exposes them.
    pub fn record_type(&self) -> Option<RecordType> {
        self.record
    }
}

impl PartialEq for ClassInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.record.is_some() == other.record.is_some()
    }
}

/// A field's type expression as written.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// No annotation at all.
    Unspecified,
    /// `Any`.
    Any,
    /// `None`, only meaningful inside a union.
    NoneType,
    /// `...`, only meaningful as the second argument of `tuple`.
    Ellipsis,
    /// A scalar type with a conversion constructor.
    Scalar(PrimitiveKind),
    /// A protobuf-style enum, carried as a plain integer.
    ProtoEnum(&'static str),
    /// A parameterized collection such as `list[int]`.
    Generic(Origin, Vec<DeclaredType>),
    /// An unparameterized collection such as `list`.
    Bare(Origin),
    /// `A | B | ...`.
    Union(Vec<DeclaredType>),
    /// A user-defined class.
    Class(ClassInfo),
}

impl DeclaredType {
    /// `inner | None`.
    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Union(vec![inner, DeclaredType::NoneType])
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Unspecified => f.write_str("<unspecified>"),
            DeclaredType::Any => f.write_str("Any"),
            DeclaredType::NoneType => f.write_str("None"),
            DeclaredType::Ellipsis => f.write_str("..."),
            DeclaredType::Scalar(kind) => write!(f, "{kind}"),
            DeclaredType::ProtoEnum(name) => f.write_str(name),
            DeclaredType::Generic(origin, args) => {
                write!(f, "{origin}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            DeclaredType::Bare(origin) => write!(f, "{origin}"),
            DeclaredType::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            DeclaredType::Class(class) => f.write_str(class.name()),
        }
    }
}

/// Rust types that can appear as record fields report their declared type
/// through this trait.
pub trait Describe {
    /// The type expression this Rust type stands for.
    fn declared_type() -> DeclaredType;
}

macro_rules! describe_scalar {
    ($kind:ident: $($t:ty),*) => {$(
        impl Describe for $t {
            fn declared_type() -> DeclaredType {
                DeclaredType::Scalar(PrimitiveKind::$kind)
            }
        }
    )*};
}

describe_scalar!(Bool: bool);
describe_scalar!(Int: i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
describe_scalar!(Float: f32, f64);
describe_scalar!(Str: String);
describe_scalar!(Path: PathBuf);
describe_scalar!(Pattern: Regex);

impl Describe for EnumValue {
    fn declared_type() -> DeclaredType {
        DeclaredType::ProtoEnum("EnumValue")
    }
}

impl Describe for serde_json::Value {
    fn declared_type() -> DeclaredType {
        DeclaredType::Any
    }
}

impl Describe for serde_json::Map<String, serde_json::Value> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Bare(Origin::Dict)
    }
}

impl<T: Describe> Describe for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::optional(T::declared_type())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic(Origin::List, vec![T::declared_type()])
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic(Origin::Set, vec![T::declared_type()])
    }
}

impl<T: Describe> Describe for FrozenSet<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic(Origin::FrozenSet, vec![T::declared_type()])
    }
}

impl<T: Describe> Describe for TupleOf<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic(Origin::Tuple, vec![T::declared_type(), DeclaredType::Ellipsis])
    }
}

impl<V: Describe> Describe for IndexMap<String, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic(
            Origin::OrderedDict,
            vec![String::declared_type(), V::declared_type()],
        )
    }
}

impl<V: Describe> Describe for BTreeMap<String, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic(Origin::Dict, vec![String::declared_type(), V::declared_type()])
    }
}

macro_rules! describe_tuple {
    ($($name:ident),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn declared_type() -> DeclaredType {
                DeclaredType::Generic(Origin::Tuple, vec![$($name::declared_type()),+])
            }
        }
    };
}

describe_tuple!(A);
describe_tuple!(A, B);
describe_tuple!(A, B, C);
describe_tuple!(A, B, C, D);
