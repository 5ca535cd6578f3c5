use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{DynamicMessage, MapKeyKind};

// -----------------------------------------------------------------------------
// Value

/// A field value.
///
/// Cloning is always deep: nested messages, lists and maps are duplicated.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    EnumNumber(i32),
    Message(DynamicMessage),
    List(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
}

impl Value {
    /// A short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Returns `true` for the zero value of a scalar and for empty
    /// collections. Messages are never considered default.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(v) => !*v,
            Value::I32(v) | Value::EnumNumber(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            // Negative zero is a distinct value.
            Value::F32(v) => v.to_bits() == 0,
            Value::F64(v) => v.to_bits() == 0,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Map(v) => v.is_empty(),
            Value::Message(_) => false,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    DynamicMessage => Message,
    BTreeMap<MapKey, Value> => Map,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Bool(v) => Value::Bool(v),
            MapKey::I32(v) => Value::I32(v),
            MapKey::I64(v) => Value::I64(v),
            MapKey::U32(v) => Value::U32(v),
            MapKey::U64(v) => Value::U64(v),
            MapKey::String(v) => Value::String(v),
        }
    }
}

// -----------------------------------------------------------------------------
// MapKey

/// A map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl MapKey {
    /// Parses the textual form of a key of the given kind.
    ///
    /// Booleans accept `1 t T TRUE true True` and `0 f F FALSE false False`.
    /// Integers take an optional sign followed by decimal digits, or a `0x`,
    /// `0o`, `0b` or legacy `0` octal prefix. Strings are taken verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_schema::{MapKey, MapKeyKind};
    ///
    /// assert_eq!(MapKey::parse(MapKeyKind::Bool, "T"), Some(MapKey::Bool(true)));
    /// assert_eq!(MapKey::parse(MapKeyKind::Int32, "-0x10"), Some(MapKey::I32(-16)));
    /// assert_eq!(MapKey::parse(MapKeyKind::Uint32, "-1"), None);
    /// assert_eq!(MapKey::parse(MapKeyKind::String, "a.b"), Some(MapKey::String("a.b".into())));
    /// ```
    pub fn parse(kind: MapKeyKind, text: &str) -> Option<MapKey> {
        Some(match kind {
            MapKeyKind::Bool => MapKey::Bool(parse_bool(text)?),
            MapKeyKind::Int32 => MapKey::I32(i32::try_from(parse_signed(text)?).ok()?),
            MapKeyKind::Int64 => MapKey::I64(i64::try_from(parse_signed(text)?).ok()?),
            MapKeyKind::Uint32 => MapKey::U32(u32::try_from(parse_unsigned(text)?).ok()?),
            MapKeyKind::Uint64 => MapKey::U64(u64::try_from(parse_unsigned(text)?).ok()?),
            MapKeyKind::String => MapKey::String(text.to_owned()),
        })
    }

    /// The kind of this key.
    #[inline]
    pub fn kind(&self) -> MapKeyKind {
        match self {
            MapKey::Bool(_) => MapKeyKind::Bool,
            MapKey::I32(_) => MapKeyKind::Int32,
            MapKey::I64(_) => MapKeyKind::Int64,
            MapKey::U32(_) => MapKeyKind::Uint32,
            MapKey::U64(_) => MapKeyKind::Uint64,
            MapKey::String(_) => MapKeyKind::String,
        }
    }
}

macro_rules! impl_map_key_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MapKey {
                #[inline]
                fn from(value: $ty) -> Self {
                    MapKey::$variant(value)
                }
            }
        )*
    };
}

impl_map_key_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    String => String,
}

impl From<&str> for MapKey {
    #[inline]
    fn from(value: &str) -> Self {
        MapKey::String(value.to_owned())
    }
}

// -----------------------------------------------------------------------------
// Parsing

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Digits after an optional radix prefix.
fn split_radix(text: &str) -> (u32, &str) {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &text[2..]),
            b'o' | b'O' => return (8, &text[2..]),
            b'b' | b'B' => return (2, &text[2..]),
            _ => return (8, &text[1..]),
        }
    }
    (10, text)
}

fn parse_magnitude(text: &str) -> Option<u128> {
    let (radix, digits) = split_radix(text);
    // `from_str_radix` would accept a second sign here.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok()
}

fn parse_signed(text: &str) -> Option<i128> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = i128::try_from(parse_magnitude(rest)?).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_unsigned(text: &str) -> Option<u128> {
    let rest = text.strip_prefix('+').unwrap_or(text);
    parse_magnitude(rest)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{MapKey, Value, parse_signed, parse_unsigned};
    use crate::MapKeyKind;

    #[test]
    fn integer_prefixes() {
        assert_eq!(parse_signed("42"), Some(42));
        assert_eq!(parse_signed("+42"), Some(42));
        assert_eq!(parse_signed("-42"), Some(-42));
        assert_eq!(parse_signed("0x2A"), Some(42));
        assert_eq!(parse_signed("0o52"), Some(42));
        assert_eq!(parse_signed("052"), Some(42));
        assert_eq!(parse_signed("0b101010"), Some(42));
        assert_eq!(parse_signed("0"), Some(0));
        assert_eq!(parse_signed(""), None);
        assert_eq!(parse_signed("-"), None);
        assert_eq!(parse_signed("0x"), None);
        assert_eq!(parse_signed("--1"), None);
        assert_eq!(parse_signed("08"), None);
        assert_eq!(parse_unsigned("-1"), None);
        assert_eq!(parse_unsigned("+7"), Some(7));
    }

    #[test]
    fn key_ranges() {
        assert_eq!(
            MapKey::parse(MapKeyKind::Int32, "2147483647"),
            Some(MapKey::I32(i32::MAX))
        );
        assert_eq!(MapKey::parse(MapKeyKind::Int32, "2147483648"), None);
        assert_eq!(
            MapKey::parse(MapKeyKind::Int64, "-9223372036854775808"),
            Some(MapKey::I64(i64::MIN))
        );
        assert_eq!(
            MapKey::parse(MapKeyKind::Uint64, "0xffffffffffffffff"),
            Some(MapKey::U64(u64::MAX))
        );
        assert_eq!(MapKey::parse(MapKeyKind::Bool, "yes"), None);
        assert_eq!(MapKey::parse(MapKeyKind::Bool, "False"), Some(MapKey::Bool(false)));
    }

    #[test]
    fn defaults() {
        assert!(Value::F64(0.0).is_default());
        assert!(!Value::F64(-0.0).is_default());
        assert!(Value::from("").is_default());
        assert!(!Value::from("a").is_default());
        assert!(Value::List(alloc::vec::Vec::new()).is_default());
        assert_eq!(Value::from(alloc::vec!["a", "b"]).as_list().map(<[_]>::len), Some(2));
    }
}
