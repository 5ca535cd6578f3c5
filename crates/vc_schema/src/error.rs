use alloc::string::String;

use thiserror::Error;

/// An error produced while building a [`Schema`](crate::Schema) or while
/// writing into a [`DynamicMessage`](crate::DynamicMessage).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// Two message or enum types share the same full name.
    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),
    /// A message declares two fields with the same name or JSON name.
    #[error("message `{message}` declares field name `{field}` more than once")]
    DuplicateFieldName { message: String, field: String },
    /// A message declares two fields with the same number.
    #[error("message `{message}` declares field number {number} more than once")]
    DuplicateFieldNumber { message: String, number: u32 },
    /// Field numbers start at 1.
    #[error("field `{field}` has invalid number 0")]
    InvalidFieldNumber { field: String },
    /// A field refers to a message or enum type that is not in the schema.
    #[error("field `{field}` references unknown type `{type_name}`")]
    UnknownType { field: String, type_name: String },
    /// Oneof members must be singular.
    #[error("oneof member `{field}` must be a singular field")]
    InvalidOneofMember { field: String },
    /// Enums need at least one value.
    #[error("enum `{0}` declares no values")]
    EmptyEnum(String),
    /// A value does not match the type of the field it is written to.
    #[error("value does not match the type of field `{field}`")]
    MismatchingType { field: String },
    /// A field descriptor was used with a message of another type.
    #[error("field `{field}` does not belong to message `{message}`")]
    ForeignField { field: String, message: String },
}
