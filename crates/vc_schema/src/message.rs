use alloc::borrow::{Cow, ToOwned};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::{Cardinality, FieldDescriptor, MapKey, MessageDescriptor, SchemaError, Value};

// -----------------------------------------------------------------------------
// DynamicMessage

/// A record instance of a [`MessageDescriptor`].
///
/// Values are stored per field. A field is *present* when it holds a value
/// that [`has`](Self::has) reports:
///
/// - fields with explicit presence are present once written, even with a
///   default value;
/// - implicit-presence scalars are present only when non-default;
/// - lists and maps are present only when non-empty.
///
/// Equality only looks at present fields, so an empty list that was
/// materialized by [`get_mut`](Self::get_mut) equals an untouched one.
///
/// # Examples
///
/// ```
/// use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema, Value};
///
/// let schema = Schema::builder()
///     .message(
///         MessageBuilder::new("demo.Counter")
///             .field(FieldBuilder::new("hits", 1, FieldType::Uint64))
///             .field(FieldBuilder::new("limit", 2, FieldType::Uint64).optional()),
///     )
///     .build()
///     .unwrap();
/// let counter = schema.message_by_name("demo.Counter").unwrap();
/// let hits = counter.field_by_name("hits").unwrap();
/// let limit = counter.field_by_name("limit").unwrap();
///
/// let mut msg = DynamicMessage::new(counter.clone());
/// msg.set(&hits, Value::U64(0)).unwrap();
/// msg.set(&limit, Value::U64(0)).unwrap();
///
/// assert!(!msg.has(&hits));
/// assert!(msg.has(&limit));
/// assert_ne!(msg, DynamicMessage::new(counter));
/// ```
#[derive(Clone)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<usize, Value>,
}

impl DynamicMessage {
    /// An empty instance.
    #[inline]
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    #[inline]
    fn owns(&self, field: &FieldDescriptor) -> bool {
        field.containing_message() == &self.descriptor
    }

    fn check_owned(&self, field: &FieldDescriptor) -> Result<(), SchemaError> {
        if self.owns(field) {
            Ok(())
        } else {
            Err(SchemaError::ForeignField {
                field: field.name().to_owned(),
                message: self.descriptor.full_name().to_owned(),
            })
        }
    }

    /// Returns `true` if the field is present.
    pub fn has(&self, field: &FieldDescriptor) -> bool {
        if !self.owns(field) {
            return false;
        }
        let Some(value) = self.fields.get(&field.index()) else {
            return false;
        };
        match field.cardinality() {
            Cardinality::Repeated | Cardinality::Map(_) => !value.is_default(),
            Cardinality::Optional => true,
            Cardinality::Singular => field.has_presence() || !value.is_default(),
        }
    }

    /// Reads a field, falling back to its default value when unset.
    pub fn get(&self, field: &FieldDescriptor) -> Cow<'_, Value> {
        match self.fields.get(&field.index()) {
            Some(value) if self.owns(field) => Cow::Borrowed(value),
            _ => Cow::Owned(field.default_value()),
        }
    }

    /// Returns a mutable reference to a field, storing its default value
    /// first if it is unset.
    ///
    /// Materializing a oneof member clears the other members of its group.
    pub fn get_mut(&mut self, field: &FieldDescriptor) -> Result<&mut Value, SchemaError> {
        self.check_owned(field)?;
        if !self.fields.contains_key(&field.index()) {
            self.clear_oneof_siblings(field);
        }
        Ok(self
            .fields
            .entry(field.index())
            .or_insert_with(|| field.default_value()))
    }

    /// Mutable access to a list field, materializing it if needed.
    pub fn list_mut(&mut self, field: &FieldDescriptor) -> Result<&mut Vec<Value>, SchemaError> {
        let name = field.name();
        self.get_mut(field)?
            .as_list_mut()
            .ok_or_else(|| SchemaError::MismatchingType {
                field: name.to_owned(),
            })
    }

    /// Mutable access to a map field, materializing it if needed.
    pub fn map_mut(
        &mut self,
        field: &FieldDescriptor,
    ) -> Result<&mut BTreeMap<MapKey, Value>, SchemaError> {
        let name = field.name();
        self.get_mut(field)?
            .as_map_mut()
            .ok_or_else(|| SchemaError::MismatchingType {
                field: name.to_owned(),
            })
    }

    /// Writes a field after checking the value against its type.
    ///
    /// Setting a oneof member clears the other members of its group.
    pub fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), SchemaError> {
        self.check_owned(field)?;
        if !field.accepts(&value) {
            return Err(SchemaError::MismatchingType {
                field: field.name().to_owned(),
            });
        }
        self.clear_oneof_siblings(field);
        self.fields.insert(field.index(), value);
        Ok(())
    }

    /// Unsets a field.
    #[inline]
    pub fn clear(&mut self, field: &FieldDescriptor) {
        if self.owns(field) {
            self.fields.remove(&field.index());
        }
    }

    /// Unsets every field.
    #[inline]
    pub fn clear_all(&mut self) {
        self.fields.clear();
    }

    /// Iterates over the present fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.fields.iter().filter_map(|(&index, value)| {
            let field = self.descriptor.field(index)?;
            self.has(&field).then_some((field, value))
        })
    }

    fn clear_oneof_siblings(&mut self, field: &FieldDescriptor) {
        let Some(oneof) = field.oneof_index() else {
            return;
        };
        let siblings = self
            .descriptor
            .fields()
            .filter(|f| f.oneof_index() == Some(oneof) && f.index() != field.index())
            .map(|f| f.index())
            .collect::<Vec<_>>();
        for index in siblings {
            self.fields.remove(&index);
        }
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
            && self.descriptor.fields().all(|field| {
                match (self.has(&field), other.has(&field)) {
                    (true, true) => self.get(&field) == other.get(&field),
                    (false, false) => true,
                    _ => false,
                }
            })
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Fields<'a>(&'a DynamicMessage);

        impl fmt::Debug for Fields<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map()
                    .entries(self.0.fields().map(|(field, value)| (field.name().to_owned(), value)))
                    .finish()
            }
        }

        f.debug_struct("DynamicMessage")
            .field("type", &self.descriptor.full_name())
            .field("fields", &Fields(self))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
