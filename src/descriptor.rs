//! Resolved type descriptors.
//!
//! [`resolve`] turns a [`DeclaredType`] into the closed set of shapes the
//! decoder dispatches on. Schemas resolve every field once, up front.

use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::Schema;
use crate::types::{DeclaredType, Origin};
use std::fmt;

/// Scalar kinds with a conversion constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `str`
    Str,
    /// Filesystem path.
    Path,
    /// Regular expression.
    Pattern,
    /// Unparameterized `list`/`tuple`/`set`: any array, elements untouched.
    Sequence,
    /// Unparameterized `dict`: any object, values untouched.
    Mapping,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Str => "str",
            PrimitiveKind::Path => "Path",
            PrimitiveKind::Pattern => "Pattern",
            PrimitiveKind::Sequence => "sequence",
            PrimitiveKind::Mapping => "mapping",
        })
    }
}

/// Handle on a record type's name and schema.
///
/// The schema is fetched lazily so a record can refer to itself, directly or
/// through other records, without resolving forever.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    schema: fn() -> Result<&'static Schema>,
}

impl RecordType {
    /// Handle for `R`.
    pub fn of<R: Record>() -> Self {
        Self {
            name: R::TYPE_NAME,
            schema: R::schema,
        }
    }

    /// Fully qualified record type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The record's schema, deriving it on first use.
    pub fn schema(&self) -> Result<&'static Schema> {
        (self.schema)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RecordType {}

/// Element layout of a tuple descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleShape {
    /// `tuple[A, B, C]`: exactly these elements, by position.
    Fixed(Vec<TypeDescriptor>),
    /// `tuple[T, ...]`: any number of `T`.
    Repeat(Box<TypeDescriptor>),
}

/// Classified shape of a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Scalar converted with its constructor.
    Primitive(PrimitiveKind),
    /// `T | None`.
    Optional(Box<TypeDescriptor>),
    /// `list[T]`.
    List(Box<TypeDescriptor>),
    /// `set[T]`.
    Set(Box<TypeDescriptor>),
    /// `frozenset[T]`.
    FrozenSet(Box<TypeDescriptor>),
    /// Fixed or repeated tuple.
    Tuple(TupleShape),
    /// String-keyed ordered mapping of `T`.
    OrderedMapping(Box<TypeDescriptor>),
    /// Nested record.
    Record(RecordType),
    /// Passed through unconverted.
    Opaque,
}

/// Classify a declared type.
pub fn resolve(declared: &DeclaredType) -> Result<TypeDescriptor> {
    match declared {
        DeclaredType::Unspecified | DeclaredType::Any | DeclaredType::NoneType => {
            Ok(TypeDescriptor::Opaque)
        }
        DeclaredType::ProtoEnum(_) => Ok(TypeDescriptor::Opaque),
        DeclaredType::Ellipsis => Err(unsupported(declared, "`...` is only valid inside tuple")),
        DeclaredType::Scalar(kind) => Ok(TypeDescriptor::Primitive(*kind)),
        DeclaredType::Bare(origin) => Ok(TypeDescriptor::Primitive(match origin {
            Origin::Dict | Origin::OrderedDict => PrimitiveKind::Mapping,
            _ => PrimitiveKind::Sequence,
        })),
        DeclaredType::Generic(origin, args) => resolve_generic(declared, *origin, args),
        DeclaredType::Union(members) => resolve_union(declared, members),
        DeclaredType::Class(class) => Ok(match class.record_type() {
            Some(record) => TypeDescriptor::Record(record),
            None => TypeDescriptor::Opaque,
        }),
    }
}

fn unsupported(declared: &DeclaredType, reason: &str) -> Error {
    Error::UnsupportedType {
        declared: declared.to_string(),
        reason: reason.to_string(),
    }
}

fn resolve_generic(
    declared: &DeclaredType,
    origin: Origin,
    args: &[DeclaredType],
) -> Result<TypeDescriptor> {
    match origin {
        Origin::List | Origin::Set | Origin::FrozenSet => {
            let [element] = args else {
                return Err(unsupported(declared, "expected exactly one type argument"));
            };
            let element = Box::new(resolve(element)?);
            Ok(match origin {
                Origin::List => TypeDescriptor::List(element),
                Origin::Set => TypeDescriptor::Set(element),
                _ => TypeDescriptor::FrozenSet(element),
            })
        }
        Origin::Tuple => match args {
            [element, DeclaredType::Ellipsis] if *element != DeclaredType::Ellipsis => Ok(
                TypeDescriptor::Tuple(TupleShape::Repeat(Box::new(resolve(element)?))),
            ),
            _ if args.contains(&DeclaredType::Ellipsis) => {
                Err(unsupported(declared, "`...` must follow exactly one element type"))
            }
            _ => Ok(TypeDescriptor::Tuple(TupleShape::Fixed(
                args.iter().map(resolve).collect::<Result<_>>()?,
            ))),
        },
        Origin::Dict | Origin::OrderedDict => {
            let [key, value] = args else {
                return Err(unsupported(declared, "expected key and value type arguments"));
            };
            match key {
                DeclaredType::Scalar(PrimitiveKind::Str) | DeclaredType::Any => {}
                _ => return Err(unsupported(declared, "mapping keys must be `str`")),
            }
            Ok(TypeDescriptor::OrderedMapping(Box::new(resolve(value)?)))
        }
    }
}

fn resolve_union(declared: &DeclaredType, members: &[DeclaredType]) -> Result<TypeDescriptor> {
    // Repeated members collapse, as `int | int` is just `int`.
    let mut distinct: Vec<&DeclaredType> = Vec::with_capacity(members.len());
    for member in members {
        if !distinct.contains(&member) {
            distinct.push(member);
        }
    }

    let nullable = distinct.iter().any(|m| **m == DeclaredType::NoneType);
    let concrete: Vec<&DeclaredType> = distinct
        .into_iter()
        .filter(|m| **m != DeclaredType::NoneType)
        .collect();

    match (concrete.as_slice(), nullable) {
        ([inner], true) => Ok(TypeDescriptor::Optional(Box::new(resolve(inner)?))),
        ([inner], false) => resolve(inner),
        ([], _) => Ok(TypeDescriptor::Opaque),
        _ => Err(Error::UnsupportedUnion {
            declared: declared.to_string(),
        }),
    }
}
