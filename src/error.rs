//! Unified error type for encoding, decoding, and board play.

use crate::board::Player;

/// Things that can go wrong when converting records or playing a game.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A value without record shape was used where a record was required.
    NotARecord {
        /// Name of the offending type or value kind.
        type_name: String,
    },
    /// Strict decode met a key the schema does not declare.
    UnknownField {
        /// The unexpected key.
        field: String,
        /// Fully qualified record type name.
        type_name: String,
    },
    /// A union with more than one non-null member was declared.
    UnsupportedUnion {
        /// Rendering of the declared union.
        declared: String,
    },
    /// A declared type the resolver cannot classify.
    UnsupportedType {
        /// Rendering of the declared type.
        declared: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A fixed-length tuple got the wrong number of elements.
    ArityMismatch {
        /// Arity declared by the tuple type.
        expected: usize,
        /// Number of elements found.
        actual: usize,
    },
    /// A field without a default was missing from the input.
    MissingRequiredField {
        /// The missing field.
        field: String,
        /// Fully qualified record type name.
        type_name: String,
    },
    /// A raw or typed value could not be converted to the target type.
    InvalidValue {
        /// What the target type accepts.
        expected: String,
        /// What was found instead.
        found: String,
    },
    /// An error raised while converting one field of a record.
    Field {
        /// The field being converted.
        field: String,
        /// Fully qualified record type name.
        type_name: String,
        /// The underlying failure.
        source: Box<Error>,
    },
    /// A board move that breaks the rules.
    IllegalMove(MoveError),
    /// Failed to write JSON text.
    Serialize(String),
    /// Failed to parse JSON text.
    Deserialize(String),
    /// Bad configuration (board dimensions, etc.).
    Config(String),
}

impl Error {
    pub(crate) fn invalid(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::InvalidValue {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Attach field context. Errors that already name their field and record
    /// are returned unchanged.
    pub fn at_field(self, field: &str, type_name: &str) -> Self {
        match self {
            Error::UnknownField { .. }
            | Error::MissingRequiredField { .. }
            | Error::Field { .. }
            | Error::IllegalMove(_)
            | Error::Serialize(_)
            | Error::Deserialize(_)
            | Error::Config(_) => self,
            other => Error::Field {
                field: field.to_string(),
                type_name: type_name.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with every layer of field context peeled off.
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Field { source, .. } = err {
            err = source;
        }
        err
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotARecord { type_name } => write!(f, "`{type_name}` is not a record"),
            Error::UnknownField { field, type_name } => {
                write!(f, "field `{field}` is not known for record `{type_name}`")
            }
            Error::UnsupportedUnion { declared } => write!(
                f,
                "deserializing union `{declared}` is not supported: \
                 only a single non-null member is allowed"
            ),
            Error::UnsupportedType { declared, reason } => {
                write!(f, "unsupported declared type `{declared}`: {reason}")
            }
            Error::ArityMismatch { expected, actual } => {
                write!(f, "expected {expected} tuple values but found {actual}")
            }
            Error::MissingRequiredField { field, type_name } => {
                write!(f, "record `{type_name}` is missing required field `{field}`")
            }
            Error::InvalidValue { expected, found } => {
                write!(f, "invalid value: expected {expected}, found {found}")
            }
            Error::Field {
                field,
                type_name,
                source,
            } => write!(f, "field `{field}` of `{type_name}`: {source}"),
            Error::IllegalMove(err) => write!(f, "illegal move: {err}"),
            Error::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Error::Deserialize(msg) => write!(f, "deserialization error: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Field { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() || err.is_data() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

impl From<MoveError> for Error {
    fn from(err: MoveError) -> Self {
        Error::IllegalMove(err)
    }
}

/// Why a move was rejected.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The other player is due to move.
    OutOfTurn {
        /// Whose turn it actually is.
        expected: Player,
    },
    /// The column already holds `rows` tokens.
    ColumnFull {
        /// The full column.
        column: usize,
    },
    /// The column index is past the right edge of the board.
    InvalidColumn {
        /// The requested column.
        column: usize,
        /// Number of columns on the board.
        columns: usize,
    },
    /// A recorded move landed on a different row than replaying it does.
    RowMismatch {
        /// Column of the recorded move.
        column: usize,
        /// Row the replay produced.
        expected: usize,
        /// Row stored in the record.
        found: usize,
    },
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::OutOfTurn { expected } => write!(f, "it is {expected}'s turn"),
            MoveError::ColumnFull { column } => write!(f, "column {column} is full"),
            MoveError::InvalidColumn { column, columns } => write!(
                f,
                "column {column} is out of range (board has {columns} columns)"
            ),
            MoveError::RowMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "move in column {column} recorded row {found} but lands on row {expected}"
            ),
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
