use alloc::boxed::Box;
use alloc::collections::BTreeMap;

use vc_schema::{DynamicMessage, FieldDescriptor, MapKey, MapKeyKind, Value};

use super::storage::Backing;
use super::{Container, ContainerDescriptor, RecordContainer};
use super::{element_value, mismatch, schema_mismatch};
use crate::{Item, Map, NotFoundKind, Operation, PatchError};

// -----------------------------------------------------------------------------
// MapContainer

/// A [`Container`] over the entries of a map field.
///
/// Keys are parsed according to the key kind of the field. Setting an
/// absent key inserts it; lists are the only containers that support
/// [`insert`](Container::insert).
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use vc_patch::{Container, Item, MapContainer};
/// # use vc_schema::{FieldBuilder, FieldType, MapKeyKind, MessageBuilder, Schema};
/// # let schema = Schema::builder()
/// #     .message(MessageBuilder::new("demo.Scores").field(FieldBuilder::new("scores", 1, FieldType::Int64).map(MapKeyKind::Uint32)))
/// #     .build()
/// #     .unwrap();
/// # let field = schema.message_by_name("demo.Scores").unwrap().field_by_name("scores").unwrap();
///
/// let mut scores = BTreeMap::new();
/// let mut map = MapContainer::new(field, &mut scores);
///
/// map.set("0x10", Some(Item::from(3_i64))).unwrap();
/// assert_eq!(map.get("16").unwrap(), Item::from(3_i64));
/// assert!(map.get("17").is_err());
/// ```
pub struct MapContainer<'a> {
    field: FieldDescriptor,
    storage: Backing<'a, BTreeMap<MapKey, Value>>,
}

impl<'a> MapContainer<'a> {
    /// A writable container over `entries`, the content of `field`.
    #[inline]
    pub fn new(field: FieldDescriptor, entries: &'a mut BTreeMap<MapKey, Value>) -> Self {
        Self::from_storage(field, Backing::Backed(entries))
    }

    /// A read-only container over `entries`.
    #[inline]
    pub fn shared(field: FieldDescriptor, entries: &'a BTreeMap<MapKey, Value>) -> Self {
        Self::from_storage(field, Backing::Shared(entries))
    }

    #[inline]
    pub(crate) fn from_storage(
        field: FieldDescriptor,
        storage: Backing<'a, BTreeMap<MapKey, Value>>,
    ) -> Self {
        Self { field, storage }
    }

    #[inline]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    pub fn len(&self) -> usize {
        self.storage.get().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_kind(&self) -> MapKeyKind {
        self.field.map_key().unwrap_or(MapKeyKind::String)
    }

    /// Parses `key` without requiring it to be present.
    fn parse(&self, key: &str) -> Result<MapKey, PatchError> {
        MapKey::parse(self.key_kind(), key).ok_or_else(|| PatchError::not_found(NotFoundKind::Key, key))
    }

    /// Parses `key` and checks that it is present.
    fn existing(&self, key: &str) -> Result<MapKey, PatchError> {
        let parsed = self.parse(key)?;
        match self.storage.get() {
            Some(entries) if entries.contains_key(&parsed) => Ok(parsed),
            _ => Err(PatchError::not_found(NotFoundKind::Key, key)),
        }
    }

    fn materialize(&mut self) -> Result<&mut BTreeMap<MapKey, Value>, PatchError> {
        let field = self.field.clone();
        self.storage.materialize(|parent: &'a mut DynamicMessage| {
            parent.map_mut(&field).map_err(schema_mismatch)
        })
    }
}

impl<'a> Container<'a> for MapContainer<'a> {
    #[inline]
    fn is_read_only(&self) -> bool {
        self.storage.is_read_only()
    }

    #[inline]
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::Map(self.field.clone())
    }

    fn to_item(&self) -> Item {
        let entries = self.storage.get().cloned().unwrap_or_default();
        Item::Map(Map::new(self.field.clone(), entries))
    }

    fn get(&self, key: &str) -> Result<Item, PatchError> {
        let parsed = self.existing(key)?;
        self.storage
            .get()
            .and_then(|entries| entries.get(&parsed))
            .map(|value| Item::Value(value.clone()))
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Key, key))
    }

    fn get_new(&self, key: &str) -> Result<Item, PatchError> {
        self.parse(key)?;
        Ok(Item::Value(self.field.kind().default_value()))
    }

    fn mutable(self: Box<Self>, key: &str) -> Result<&'a mut Value, PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let parsed = self.existing(key)?;
        let field = self.field;
        let entries = self.storage.into_mut(|parent: &'a mut DynamicMessage| {
            parent.map_mut(&field).map_err(schema_mismatch)
        })?;
        entries
            .get_mut(&parsed)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Key, key))
    }

    fn access(self: Box<Self>, key: &str) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        let parsed = self.existing(key)?;
        if !self.field.is_message() {
            return Err(PatchError::AccessToNonContainer);
        }
        let child = match self.storage {
            Backing::Shared(entries) => entries
                .get(&parsed)
                .and_then(Value::as_message)
                .map(RecordContainer::shared),
            Backing::Backed(entries) => entries
                .get_mut(&parsed)
                .and_then(Value::as_message_mut)
                .map(RecordContainer::new),
            Backing::Absent | Backing::Detached(_) => None,
        };
        child
            .map(RecordContainer::boxed)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Key, key))
    }

    fn access_mutable(
        self: Box<Self>,
        key: &str,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let parsed = self.existing(key)?;
        if !self.field.is_message() {
            return Err(PatchError::AccessToNonContainer);
        }
        let field = self.field;
        let entries = self.storage.into_mut(|parent: &'a mut DynamicMessage| {
            parent.map_mut(&field).map_err(schema_mismatch)
        })?;
        match entries.get_mut(&parsed).and_then(Value::as_message_mut) {
            Some(child) => Ok(RecordContainer::new(child).boxed()),
            None => Err(PatchError::not_found(NotFoundKind::Key, key)),
        }
    }

    fn set(&mut self, key: &str, value: Option<Item>) -> Result<(), PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let Some(item) = value else {
            let parsed = self.existing(key)?;
            self.materialize()?.remove(&parsed);
            return Ok(());
        };
        let parsed = match self.existing(key) {
            Ok(parsed) => parsed,
            Err(err) => MapKey::parse(self.key_kind(), key).ok_or(err)?,
        };
        let value = element_value(&self.field, item)
            .ok_or_else(|| mismatch(Operation::Set).in_path(key))?;
        self.materialize()?.insert(parsed, value);
        Ok(())
    }

    fn append(&mut self, _: Option<Item>) -> Result<(), PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        Err(PatchError::AppendToNonList)
    }

    fn insert(&mut self, _: &str, _: Option<Item>) -> Result<(), PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        Err(PatchError::InsertToNonList)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;

    use vc_schema::{MapKey, Value};

    use super::MapContainer;
    use crate::testing::Fixture;
    use crate::{Container, Item, NotFoundKind, Operation, PatchError};

    #[test]
    fn keys_parse_per_key_kind() {
        let fx = Fixture::new();
        let field = fx.map.field_by_name("int32_to_string").unwrap();
        let entries = BTreeMap::from([(MapKey::I32(-8), Value::from("neg"))]);
        let map = MapContainer::shared(field, &entries);
        assert_eq!(map.get("-8"), Ok(Item::from("neg")));
        assert_eq!(map.get("-0x8"), Ok(Item::from("neg")));
        assert_eq!(map.get("8"), Err(PatchError::not_found(NotFoundKind::Key, "8")));
        assert_eq!(map.get("x"), Err(PatchError::not_found(NotFoundKind::Key, "x")));

        let field = fx.map.field_by_name("bool_to_string").unwrap();
        let entries = BTreeMap::from([(MapKey::Bool(true), Value::from("yes"))]);
        let map = MapContainer::shared(field, &entries);
        assert_eq!(map.get("T"), Ok(Item::from("yes")));
        assert_eq!(map.get("yes"), Err(PatchError::not_found(NotFoundKind::Key, "yes")));
    }

    #[test]
    fn set_inserts_absent_keys() {
        let fx = Fixture::new();
        let field = fx.map.field_by_name("string_to_string").unwrap();
        let mut entries = BTreeMap::new();
        let mut map = MapContainer::new(field, &mut entries);
        assert_eq!(map.set("a", Some(Item::from("1"))), Ok(()));
        assert_eq!(map.set("a", Some(Item::from("2"))), Ok(()));
        assert_eq!(
            map.set("b", Some(Item::from(2))),
            Err(PatchError::operation_failed(Operation::Set, PatchError::MismatchingType).in_path("b"))
        );
        assert_eq!(entries, BTreeMap::from([(MapKey::from("a"), Value::from("2"))]));
    }

    #[test]
    fn set_rejects_unparsable_keys() {
        let fx = Fixture::new();
        let field = fx.map.field_by_name("int32_to_string").unwrap();
        let mut entries = BTreeMap::new();
        let mut map = MapContainer::new(field, &mut entries);
        assert_eq!(
            map.set("4294967296", Some(Item::from("x"))),
            Err(PatchError::not_found(NotFoundKind::Key, "4294967296"))
        );
        assert_eq!(map.set("0b11", Some(Item::from("x"))), Ok(()));
        assert_eq!(entries, BTreeMap::from([(MapKey::I32(3), Value::from("x"))]));
    }

    #[test]
    fn clear_removes_existing_keys_only() {
        let fx = Fixture::new();
        let field = fx.map.field_by_name("string_to_string").unwrap();
        let mut entries = BTreeMap::from([(MapKey::from("a"), Value::from("1"))]);
        let mut map = MapContainer::new(field, &mut entries);
        assert_eq!(
            map.set("b", None),
            Err(PatchError::not_found(NotFoundKind::Key, "b"))
        );
        assert_eq!(map.set("a", None), Ok(()));
        assert!(entries.is_empty());
    }

    #[test]
    fn structural_operations_are_list_only() {
        let fx = Fixture::new();
        let field = fx.map.field_by_name("string_to_string").unwrap();
        let mut entries = BTreeMap::new();
        let mut map = MapContainer::new(field.clone(), &mut entries);
        assert_eq!(map.append(None), Err(PatchError::AppendToNonList));
        assert_eq!(map.insert("a", Some(Item::from("1"))), Err(PatchError::InsertToNonList));

        let entries = BTreeMap::new();
        let mut map = MapContainer::shared(field, &entries);
        assert_eq!(map.insert("a", None), Err(PatchError::MutationOfReadOnlyValue));
        assert_eq!(
            map.set("a", Some(Item::from("1"))),
            Err(PatchError::MutationOfReadOnlyValue)
        );
    }

    #[test]
    fn message_values_are_containers() {
        let fx = Fixture::new();
        let field = fx.map.field_by_name("string_to_message").unwrap();
        let mut entries = BTreeMap::from([(MapKey::from("k"), Value::from(fx.message([])))]);
        {
            let map = Box::new(MapContainer::new(field.clone(), &mut entries));
            let Ok(mut child) = map.access("k") else {
                panic!("value is a message");
            };
            assert_eq!(child.set("int32", Some(Item::from(4))), Ok(()));
        }
        assert_eq!(
            entries,
            BTreeMap::from([(
                MapKey::from("k"),
                Value::from(fx.message([("int32", Value::I32(4))]))
            )])
        );

        let map = Box::new(MapContainer::new(field, &mut entries));
        assert!(matches!(
            map.access("missing"),
            Err(PatchError::NotFound { kind: NotFoundKind::Key, .. })
        ));
    }
}
