//! Conversion of JSON documents into schema values.
//!
//! [`JsonConverter`] claims `serde_json::Value`s carried as [`Item::Opaque`]
//! (see the `From<serde_json::Value>` impl of [`Item`]) and shapes them after
//! the slot being written:
//!
//! | JSON     | Slot                                                       |
//! |----------|------------------------------------------------------------|
//! | `null`   | any; the slot is cleared                                   |
//! | number   | integers when exactly representable, floats, enum numbers  |
//! | string   | strings, bytes, integers (`0x`, `0o`, `0b` prefixes), floats, enum value names |
//! | boolean  | booleans                                                   |
//! | array    | lists                                                      |
//! | object   | messages (keys name fields) and maps (keys parse as map keys) |
//!
//! Enum value names are only known below a field; a standalone enum slot
//! takes numbers.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Map as JsonObject, Number, Value as Json};
use vc_schema::{
    DynamicMessage, FieldDescriptor, Kind, MapKey, MapKeyKind, MessageDescriptor, Value,
};

use crate::{Converter, Item, List, Map, Opaque, PatchError};

impl From<Json> for Item {
    #[inline]
    fn from(value: Json) -> Self {
        Item::Opaque(Opaque::new(value))
    }
}

// -----------------------------------------------------------------------------
// JsonConverter

/// A [`Converter`] from JSON documents.
///
/// By default an object key that names no field (or does not parse as a map
/// key) and a value that does not fit its slot fail the conversion. Both can
/// be skipped instead.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vc_patch::{Item, JsonConverter, Setup};
/// # use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema};
/// # let schema = Schema::builder()
/// #     .message(
/// #         MessageBuilder::new("demo.Point")
/// #             .field(FieldBuilder::new("x", 1, FieldType::Int32))
/// #             .field(FieldBuilder::new("y", 2, FieldType::Int32))
/// #             .field(FieldBuilder::new("tags", 3, FieldType::String).repeated()),
/// #     )
/// #     .build()
/// #     .unwrap();
/// # let point = schema.message_by_name("demo.Point").unwrap();
/// let setup = Setup::new().with_conversion(JsonConverter::new().ignore_unknown_keys(true));
/// let mut root = DynamicMessage::new(point);
///
/// setup.set(&mut root, "", json!({ "x": 1, "y": "0x10", "z": 3 })).unwrap();
/// setup.set(&mut root, "tags", json!(["a", "b"])).unwrap();
///
/// assert_eq!(setup.get(&root, "y"), Ok(Item::from(16)));
/// assert_eq!(setup.get(&root, "tags.1"), Ok(Item::from("b")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter {
    ignore_unknown_keys: bool,
    ignore_invalid_values: bool,
}

impl JsonConverter {
    #[inline]
    pub const fn new() -> Self {
        Self {
            ignore_unknown_keys: false,
            ignore_invalid_values: false,
        }
    }

    /// Skips object keys naming no field of a message or not parsing as a
    /// key of a map.
    #[inline]
    pub const fn ignore_unknown_keys(mut self, ignore: bool) -> Self {
        self.ignore_unknown_keys = ignore;
        self
    }

    /// Skips object entries and array elements whose value does not fit
    /// their slot.
    #[inline]
    pub const fn ignore_invalid_values(mut self, ignore: bool) -> Self {
        self.ignore_invalid_values = ignore;
        self
    }

    /// Converts `from` into the shape of `to`; `None` for `null`.
    pub fn convert_json(&self, to: &Item, from: &Json) -> Result<Option<Item>, PatchError> {
        if from.is_null() {
            return Ok(None);
        }
        let item = match to {
            Item::List(list) => {
                let items = self.list(list.field(), from)?;
                Item::List(List::new(list.field().clone(), items))
            }
            Item::Map(map) => {
                let entries = self.map(map.field(), from)?;
                Item::Map(Map::new(map.field().clone(), entries))
            }
            Item::Value(Value::Message(msg)) => {
                let object = from.as_object().ok_or(PatchError::NoConversionDefined)?;
                Item::Value(Value::Message(self.message(msg.descriptor(), object)?))
            }
            Item::Value(value) => {
                Item::Value(scalar(value, from).ok_or(PatchError::NoConversionDefined)?)
            }
            Item::Opaque(_) => return Err(PatchError::NoConversionDefined),
        };
        Ok(Some(item))
    }

    fn message(
        &self,
        desc: &MessageDescriptor,
        object: &JsonObject<String, Json>,
    ) -> Result<DynamicMessage, PatchError> {
        let mut msg = DynamicMessage::new(desc.clone());
        for (key, value) in object {
            let Some(field) = desc.resolve_field(key) else {
                if self.ignore_unknown_keys {
                    continue;
                }
                return Err(PatchError::conversion(format!(
                    "{} has no field \"{key}\"",
                    desc.full_name()
                )));
            };
            let converted = self
                .field(&field, value)
                .map_err(|err| invalid(err, key))
                .and_then(|converted| match converted {
                    Some(value) => msg.set(&field, value).map_err(|err| {
                        PatchError::conversion(format!("value of \"{key}\": {err}"))
                    }),
                    None => Ok(()),
                });
            match converted {
                Err(_) if self.ignore_invalid_values => continue,
                result => result?,
            }
        }
        Ok(msg)
    }

    /// The whole value of `field`.
    fn field(&self, field: &FieldDescriptor, from: &Json) -> Result<Option<Value>, PatchError> {
        if from.is_null() {
            return Ok(None);
        }
        if field.is_list() {
            return self.list(field, from).map(|items| Some(Value::List(items)));
        }
        if field.is_map() {
            return self.map(field, from).map(|entries| Some(Value::Map(entries)));
        }
        self.element(&field.kind(), from)
    }

    fn list(&self, field: &FieldDescriptor, from: &Json) -> Result<Vec<Value>, PatchError> {
        let array = from.as_array().ok_or(PatchError::NoConversionDefined)?;
        let kind = field.kind();
        let mut items = Vec::with_capacity(array.len());
        for (index, value) in array.iter().enumerate() {
            match self.element(&kind, value) {
                Ok(item) => items.push(item.unwrap_or_else(|| kind.default_value())),
                Err(_) if self.ignore_invalid_values => {}
                Err(err) => return Err(invalid(err, &index.to_string())),
            }
        }
        Ok(items)
    }

    fn map(
        &self,
        field: &FieldDescriptor,
        from: &Json,
    ) -> Result<BTreeMap<MapKey, Value>, PatchError> {
        let object = from.as_object().ok_or(PatchError::NoConversionDefined)?;
        let key_kind = field.map_key().ok_or(PatchError::NoConversionDefined)?;
        let kind = field.kind();
        let mut entries = BTreeMap::new();
        for (key, value) in object {
            let Some(parsed) = MapKey::parse(key_kind, key) else {
                if self.ignore_unknown_keys {
                    continue;
                }
                return Err(PatchError::conversion(format!(
                    "\"{key}\" is not a {key_kind:?} map key"
                )));
            };
            match self.element(&kind, value) {
                Ok(item) => {
                    entries.insert(parsed, item.unwrap_or_else(|| kind.default_value()));
                }
                Err(_) if self.ignore_invalid_values => {}
                Err(err) => return Err(invalid(err, key)),
            }
        }
        Ok(entries)
    }

    /// A single value of `kind`; `None` for `null`.
    fn element(&self, kind: &Kind, from: &Json) -> Result<Option<Value>, PatchError> {
        let value = match (kind, from) {
            (_, Json::Null) => return Ok(None),
            (Kind::Message(desc), Json::Object(object)) => Value::Message(self.message(desc, object)?),
            (Kind::Enum(desc), Json::String(name)) => desc
                .number_of(name)
                .map(Value::EnumNumber)
                .ok_or(PatchError::NoConversionDefined)?,
            (kind, from) => {
                scalar(&kind.default_value(), from).ok_or(PatchError::NoConversionDefined)?
            }
        };
        Ok(Some(value))
    }
}

impl Converter for JsonConverter {
    fn convert(&self, to: &Item, from: &Item) -> Result<Option<Item>, PatchError> {
        match from.as_opaque().and_then(Opaque::downcast_ref::<Json>) {
            Some(json) => self.convert_json(to, json),
            None => Err(PatchError::NoConversionDefined),
        }
    }
}

/// Names the key of a value that did not fit its slot.
fn invalid(err: PatchError, key: &str) -> PatchError {
    match err {
        PatchError::NoConversionDefined => {
            PatchError::conversion(format!("value of \"{key}\" does not fit its slot"))
        }
        err => err,
    }
}

// -----------------------------------------------------------------------------
// Scalars

/// Converts a JSON scalar into the variant of `like`.
fn scalar(like: &Value, from: &Json) -> Option<Value> {
    match from {
        Json::Number(number) => from_number(like, number),
        Json::String(text) => from_string(like, text),
        Json::Bool(flag) => matches!(like, Value::Bool(_)).then_some(Value::Bool(*flag)),
        _ => None,
    }
}

fn from_number(like: &Value, number: &Number) -> Option<Value> {
    Some(match like {
        Value::I32(_) => Value::I32(i32::try_from(integral(number)?).ok()?),
        Value::I64(_) => Value::I64(i64::try_from(integral(number)?).ok()?),
        Value::U32(_) => Value::U32(u32::try_from(integral(number)?).ok()?),
        Value::U64(_) => Value::U64(u64::try_from(integral(number)?).ok()?),
        Value::EnumNumber(_) => Value::EnumNumber(i32::try_from(integral(number)?).ok()?),
        Value::F32(_) => Value::F32(number.as_f64()? as f32),
        Value::F64(_) => Value::F64(number.as_f64()?),
        _ => return None,
    })
}

/// The exact integer value of `number`, if it has one.
fn integral(number: &Number) -> Option<i128> {
    if let Some(int) = number.as_i64() {
        return Some(int.into());
    }
    if let Some(int) = number.as_u64() {
        return Some(int.into());
    }
    let float = number.as_f64()?;
    let int = float as i128;
    (int as f64 == float).then_some(int)
}

fn from_string(like: &Value, text: &str) -> Option<Value> {
    Some(match like {
        Value::String(_) => Value::String(text.into()),
        Value::Bytes(_) => Value::Bytes(text.as_bytes().to_vec()),
        Value::I32(_) => key_value(MapKey::parse(MapKeyKind::Int32, text)?),
        Value::I64(_) => key_value(MapKey::parse(MapKeyKind::Int64, text)?),
        Value::U32(_) => key_value(MapKey::parse(MapKeyKind::Uint32, text)?),
        Value::U64(_) => key_value(MapKey::parse(MapKeyKind::Uint64, text)?),
        Value::EnumNumber(_) => match MapKey::parse(MapKeyKind::Int32, text)? {
            MapKey::I32(number) => Value::EnumNumber(number),
            _ => return None,
        },
        Value::F32(_) => Value::F32(text.parse().ok()?),
        Value::F64(_) => Value::F64(text.parse().ok()?),
        _ => return None,
    })
}

fn key_value(key: MapKey) -> Value {
    match key {
        MapKey::Bool(flag) => Value::Bool(flag),
        MapKey::I32(int) => Value::I32(int),
        MapKey::I64(int) => Value::I64(int),
        MapKey::U32(int) => Value::U32(int),
        MapKey::U64(int) => Value::U64(int),
        MapKey::String(text) => Value::String(text),
    }
}

// -----------------------------------------------------------------------------
// Tests
