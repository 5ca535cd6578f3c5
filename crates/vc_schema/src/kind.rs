use core::fmt;

use alloc::string::String;
use alloc::vec::Vec;

use crate::{DynamicMessage, EnumDescriptor, MapKey, MessageDescriptor, Value};

// -----------------------------------------------------------------------------
// Kind

/// The type of a single field value.
///
/// For list fields this is the element type, for map fields the value type.
/// Enum and message kinds carry their descriptor, so two kinds compare equal
/// only if they name the same type of the same [`Schema`](crate::Schema).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    Enum(EnumDescriptor),
    Message(MessageDescriptor),
}

impl Kind {
    /// Returns `true` for every kind but [`Kind::Message`].
    #[inline]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Kind::Message(_))
    }

    /// Returns the message descriptor of a message kind.
    #[inline]
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(desc) => Some(desc),
            _ => None,
        }
    }

    /// Returns the enum descriptor of an enum kind.
    #[inline]
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(desc) => Some(desc),
            _ => None,
        }
    }

    /// Returns the zero value of this kind.
    ///
    /// Messages default to an empty instance, enums to their first value.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_schema::{Kind, Value};
    ///
    /// assert_eq!(Kind::Int64.default_value(), Value::I64(0));
    /// assert_eq!(Kind::String.default_value(), Value::from(""));
    /// ```
    pub fn default_value(&self) -> Value {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int32 => Value::I32(0),
            Kind::Int64 => Value::I64(0),
            Kind::Uint32 => Value::U32(0),
            Kind::Uint64 => Value::U64(0),
            Kind::Float => Value::F32(0.0),
            Kind::Double => Value::F64(0.0),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum(desc) => Value::EnumNumber(desc.default_number()),
            Kind::Message(desc) => Value::Message(DynamicMessage::new(desc.clone())),
        }
    }

    /// Returns `true` if `value` can be stored in a slot of this kind.
    ///
    /// Enums are open: any number is accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_schema::{Kind, Value};
    ///
    /// assert!(Kind::Uint32.accepts(&Value::U32(7)));
    /// assert!(!Kind::Uint32.accepts(&Value::I32(7)));
    /// ```
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Bool, Value::Bool(_))
            | (Kind::Int32, Value::I32(_))
            | (Kind::Int64, Value::I64(_))
            | (Kind::Uint32, Value::U32(_))
            | (Kind::Uint64, Value::U64(_))
            | (Kind::Float, Value::F32(_))
            | (Kind::Double, Value::F64(_))
            | (Kind::String, Value::String(_))
            | (Kind::Bytes, Value::Bytes(_))
            | (Kind::Enum(_), Value::EnumNumber(_)) => true,
            (Kind::Message(desc), Value::Message(msg)) => msg.descriptor() == desc,
            _ => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::Int32 => f.write_str("int32"),
            Kind::Int64 => f.write_str("int64"),
            Kind::Uint32 => f.write_str("uint32"),
            Kind::Uint64 => f.write_str("uint64"),
            Kind::Float => f.write_str("float"),
            Kind::Double => f.write_str("double"),
            Kind::String => f.write_str("string"),
            Kind::Bytes => f.write_str("bytes"),
            Kind::Enum(desc) => write!(f, "enum {}", desc.full_name()),
            Kind::Message(desc) => write!(f, "message {}", desc.full_name()),
        }
    }
}

// -----------------------------------------------------------------------------
// MapKeyKind

/// The kinds that may key a map field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKeyKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    String,
}

impl MapKeyKind {
    /// Returns `true` if `key` has this kind.
    #[inline]
    pub fn accepts(self, key: &MapKey) -> bool {
        matches!(
            (self, key),
            (MapKeyKind::Bool, MapKey::Bool(_))
                | (MapKeyKind::Int32, MapKey::I32(_))
                | (MapKeyKind::Int64, MapKey::I64(_))
                | (MapKeyKind::Uint32, MapKey::U32(_))
                | (MapKeyKind::Uint64, MapKey::U64(_))
                | (MapKeyKind::String, MapKey::String(_))
        )
    }

    /// The equivalent value kind.
    #[inline]
    pub fn as_kind(self) -> Kind {
        match self {
            MapKeyKind::Bool => Kind::Bool,
            MapKeyKind::Int32 => Kind::Int32,
            MapKeyKind::Int64 => Kind::Int64,
            MapKeyKind::Uint32 => Kind::Uint32,
            MapKeyKind::Uint64 => Kind::Uint64,
            MapKeyKind::String => Kind::String,
        }
    }
}

// -----------------------------------------------------------------------------
// Cardinality

/// How many values a field holds and how its presence is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// One value. Scalars use implicit presence: they are present only when
    /// holding a non-default value. Message fields and oneof members always
    /// track presence explicitly.
    Singular,
    /// One value with explicit presence.
    Optional,
    /// A list of values.
    Repeated,
    /// A map keyed by the given key kind.
    Map(MapKeyKind),
}
