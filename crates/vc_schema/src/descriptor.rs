use core::fmt;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::hash::HashMap;
use crate::{Cardinality, Kind, MapKeyKind, SchemaBuilder, Value};

// -----------------------------------------------------------------------------
// Pool data

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRepr {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    Enum(usize),
    Message(usize),
}

pub(crate) struct FieldData {
    pub name: String,
    pub json_name: String,
    pub number: u32,
    pub ty: TypeRepr,
    pub cardinality: Cardinality,
    pub oneof: Option<usize>,
}

pub(crate) struct MessageData {
    pub full_name: String,
    pub fields: Vec<FieldData>,
    pub oneofs: Vec<String>,
    pub by_name: HashMap<String, usize>,
    pub by_json_name: HashMap<String, usize>,
    pub by_number: HashMap<u32, usize>,
}

pub(crate) struct EnumData {
    pub full_name: String,
    pub values: Vec<(String, i32)>,
}

pub(crate) struct SchemaData {
    pub messages: Vec<MessageData>,
    pub enums: Vec<EnumData>,
    pub message_index: HashMap<String, usize>,
    pub enum_index: HashMap<String, usize>,
}

// -----------------------------------------------------------------------------
// Schema

/// An immutable pool of message and enum types.
///
/// Cloning is cheap, every clone refers to the same pool. Two schemas are
/// equal only if they are clones of each other, so descriptors taken from
/// separately built schemas never compare equal even if the declarations
/// are identical.
#[derive(Clone)]
pub struct Schema {
    data: Arc<SchemaData>,
}

impl Schema {
    /// Starts building a new schema.
    #[inline]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    #[inline]
    pub(crate) fn from_data(data: SchemaData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Looks a message type up by its full name.
    pub fn message_by_name(&self, full_name: &str) -> Option<MessageDescriptor> {
        let index = *self.data.message_index.get(full_name)?;
        Some(MessageDescriptor {
            schema: self.clone(),
            index,
        })
    }

    /// Looks an enum type up by its full name.
    pub fn enum_by_name(&self, full_name: &str) -> Option<EnumDescriptor> {
        let index = *self.data.enum_index.get(full_name)?;
        Some(EnumDescriptor {
            schema: self.clone(),
            index,
        })
    }

    /// Iterates over every message type, in declaration order.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        (0..self.data.messages.len()).map(|index| MessageDescriptor {
            schema: self.clone(),
            index,
        })
    }

    /// Iterates over every enum type, in declaration order.
    pub fn enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        (0..self.data.enums.len()).map(|index| EnumDescriptor {
            schema: self.clone(),
            index,
        })
    }
}

impl PartialEq for Schema {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field(
                "messages",
                &self.data.messages.iter().map(|m| &m.full_name).collect::<Vec<_>>(),
            )
            .field(
                "enums",
                &self.data.enums.iter().map(|e| &e.full_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MessageDescriptor

/// Describes a message type of a [`Schema`].
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    schema: Schema,
    index: usize,
}

impl MessageDescriptor {
    #[inline]
    fn data(&self) -> &MessageData {
        &self.schema.data.messages[self.index]
    }

    #[inline]
    fn field_at(&self, index: usize) -> FieldDescriptor {
        FieldDescriptor {
            message: self.clone(),
            index,
        }
    }

    /// The schema this type belongs to.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The fully qualified type name, e.g. `pkg.Message`.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// Number of declared fields.
    #[inline]
    pub fn field_len(&self) -> usize {
        self.data().fields.len()
    }

    /// Returns the field at `index` in declaration order.
    #[inline]
    pub fn field(&self, index: usize) -> Option<FieldDescriptor> {
        (index < self.field_len()).then(|| self.field_at(index))
    }

    /// Iterates over all declared fields, oneof members included.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.field_len()).map(|index| self.field_at(index))
    }

    /// Looks a field up by its declared name.
    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.data().by_name.get(name).map(|&i| self.field_at(i))
    }

    /// Looks a field up by its JSON name.
    pub fn field_by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        self.data().by_json_name.get(json_name).map(|&i| self.field_at(i))
    }

    /// Looks a field up by its number.
    pub fn field_by_number(&self, number: u32) -> Option<FieldDescriptor> {
        self.data().by_number.get(&number).map(|&i| self.field_at(i))
    }

    /// Resolves a textual field selector.
    ///
    /// The selector is matched against the declared name first, then the
    /// JSON name, and finally parsed as a decimal field number.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_schema::{FieldBuilder, FieldType, MessageBuilder, Schema};
    ///
    /// let schema = Schema::builder()
    ///     .message(MessageBuilder::new("demo.User").field(FieldBuilder::new("display_name", 3, FieldType::String)))
    ///     .build()
    ///     .unwrap();
    /// let user = schema.message_by_name("demo.User").unwrap();
    ///
    /// let by_name = user.resolve_field("display_name").unwrap();
    /// assert_eq!(user.resolve_field("displayName"), Some(by_name.clone()));
    /// assert_eq!(user.resolve_field("3"), Some(by_name));
    /// assert_eq!(user.resolve_field("4"), None);
    /// ```
    pub fn resolve_field(&self, selector: &str) -> Option<FieldDescriptor> {
        self.field_by_name(selector)
            .or_else(|| self.field_by_json_name(selector))
            .or_else(|| {
                let number = selector.parse::<u32>().ok()?;
                self.field_by_number(number)
            })
    }

    /// Names of the declared oneof groups.
    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.data().oneofs.iter().map(String::as_str)
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// Describes one field of a message type.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    #[inline]
    fn data(&self) -> &FieldData {
        &self.message.data().fields[self.index]
    }

    /// The message type declaring this field.
    #[inline]
    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// Position of the field in declaration order.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.data().name
    }

    #[inline]
    pub fn json_name(&self) -> &str {
        &self.data().json_name
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.data().number
    }

    #[inline]
    pub fn cardinality(&self) -> Cardinality {
        self.data().cardinality
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self.cardinality(), Cardinality::Map(_))
    }

    /// The key kind of a map field.
    #[inline]
    pub fn map_key(&self) -> Option<MapKeyKind> {
        match self.cardinality() {
            Cardinality::Map(key) => Some(key),
            _ => None,
        }
    }

    /// The name of the oneof group this field belongs to.
    pub fn containing_oneof(&self) -> Option<&str> {
        let oneof = self.data().oneof?;
        Some(&self.message.data().oneofs[oneof])
    }

    #[inline]
    pub(crate) fn oneof_index(&self) -> Option<usize> {
        self.data().oneof
    }

    /// Returns `true` if the field distinguishes "unset" from "set to the
    /// default value".
    pub fn has_presence(&self) -> bool {
        let data = self.data();
        match data.cardinality {
            Cardinality::Optional => true,
            Cardinality::Singular => {
                data.oneof.is_some() || matches!(data.ty, TypeRepr::Message(_))
            }
            Cardinality::Repeated | Cardinality::Map(_) => false,
        }
    }

    /// The value kind: the element kind of a list, the value kind of a map.
    pub fn kind(&self) -> Kind {
        let schema = self.message.schema();
        match self.data().ty {
            TypeRepr::Bool => Kind::Bool,
            TypeRepr::Int32 => Kind::Int32,
            TypeRepr::Int64 => Kind::Int64,
            TypeRepr::Uint32 => Kind::Uint32,
            TypeRepr::Uint64 => Kind::Uint64,
            TypeRepr::Float => Kind::Float,
            TypeRepr::Double => Kind::Double,
            TypeRepr::String => Kind::String,
            TypeRepr::Bytes => Kind::Bytes,
            TypeRepr::Enum(index) => Kind::Enum(EnumDescriptor {
                schema: schema.clone(),
                index,
            }),
            TypeRepr::Message(index) => Kind::Message(MessageDescriptor {
                schema: schema.clone(),
                index,
            }),
        }
    }

    /// Returns `true` if the value kind is a message type.
    #[inline]
    pub fn is_message(&self) -> bool {
        matches!(self.data().ty, TypeRepr::Message(_))
    }

    /// The value an unset field reads as.
    ///
    /// Lists and maps default to empty collections.
    pub fn default_value(&self) -> Value {
        match self.cardinality() {
            Cardinality::Repeated => Value::List(Vec::new()),
            Cardinality::Map(_) => Value::Map(Default::default()),
            Cardinality::Singular | Cardinality::Optional => self.kind().default_value(),
        }
    }

    /// Returns `true` if `value` can be stored in this field as a whole.
    ///
    /// A list field takes a [`Value::List`] whose elements all match the
    /// element kind, a map field a [`Value::Map`] whose keys and values match.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.cardinality(), value) {
            (Cardinality::Repeated, Value::List(items)) => {
                let kind = self.kind();
                items.iter().all(|item| kind.accepts(item))
            }
            (Cardinality::Map(key), Value::Map(entries)) => {
                let kind = self.kind();
                entries
                    .iter()
                    .all(|(k, v)| key.accepts(k) && kind.accepts(v))
            }
            (Cardinality::Repeated | Cardinality::Map(_), _) => false,
            (Cardinality::Singular | Cardinality::Optional, value) => self.kind().accepts(value),
        }
    }

    /// Returns `true` if both fields hold values of the same shape:
    /// same cardinality, same value kind and same map key kind.
    pub fn is_shape_of(&self, other: &FieldDescriptor) -> bool {
        let (lhs, rhs) = (self.cardinality(), other.cardinality());
        let same_cardinality = match (lhs, rhs) {
            (Cardinality::Repeated, Cardinality::Repeated) => true,
            (Cardinality::Map(a), Cardinality::Map(b)) => a == b,
            (
                Cardinality::Singular | Cardinality::Optional,
                Cardinality::Singular | Cardinality::Optional,
            ) => true,
            _ => false,
        };
        same_cardinality && self.kind() == other.kind()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("message", &self.message.full_name())
            .field("name", &self.name())
            .field("number", &self.number())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// EnumDescriptor

/// Describes an enum type of a [`Schema`].
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    schema: Schema,
    index: usize,
}

impl EnumDescriptor {
    #[inline]
    fn data(&self) -> &EnumData {
        &self.schema.data.enums[self.index]
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// Declared `(name, number)` pairs.
    pub fn values(&self) -> impl ExactSizeIterator<Item = (&str, i32)> + '_ {
        self.data().values.iter().map(|(name, n)| (name.as_str(), *n))
    }

    /// Number of the value called `name`.
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.data()
            .values
            .iter()
            .find_map(|(n, number)| (n == name).then_some(*number))
    }

    /// Name of the first value numbered `number`.
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.data()
            .values
            .iter()
            .find_map(|(name, n)| (*n == number).then_some(name.as_str()))
    }

    /// The first declared value, which unset enum fields read as.
    #[inline]
    pub fn default_number(&self) -> i32 {
        self.data().values.first().map_or(0, |(_, n)| *n)
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumDescriptor")
            .field(&self.full_name())
            .finish()
    }
}
