use alloc::borrow::Cow;
use alloc::boxed::Box;

use vc_schema::{DynamicMessage, FieldDescriptor, MessageDescriptor, Value};

use super::storage::Backing;
use super::{Container, ContainerDescriptor, ListContainer, MapContainer};
use super::{field_value, mismatch, schema_mismatch};
use crate::{Item, List, Map, NotFoundKind, Operation, PatchError};

// -----------------------------------------------------------------------------
// RecordContainer

enum RecordStorage<'a> {
    /// An unset message field, read as the empty message.
    Absent(MessageDescriptor),
    Shared(&'a DynamicMessage),
    Exclusive(&'a mut DynamicMessage),
}

/// A [`Container`] over a [`DynamicMessage`].
///
/// Keys select fields by name, JSON name or number, in that order (see
/// [`MessageDescriptor::resolve_field`]).
///
/// # Examples
///
/// ```
/// use vc_patch::{Container, Item, RecordContainer};
/// # use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema};
/// # let schema = Schema::builder()
/// #     .message(MessageBuilder::new("demo.User").field(FieldBuilder::new("user_name", 1, FieldType::String)))
/// #     .build()
/// #     .unwrap();
/// # let user = schema.message_by_name("demo.User").unwrap();
///
/// let mut msg = DynamicMessage::new(user);
/// let mut container = RecordContainer::new(&mut msg);
///
/// container.set("userName", Some(Item::from("ada"))).unwrap();
/// assert_eq!(container.get("1").unwrap(), Item::from("ada"));
///
/// let container = RecordContainer::shared(&msg);
/// assert!(container.is_read_only());
/// ```
pub struct RecordContainer<'a> {
    storage: RecordStorage<'a>,
}

impl<'a> RecordContainer<'a> {
    /// A writable container.
    #[inline]
    pub fn new(msg: &'a mut DynamicMessage) -> Self {
        Self {
            storage: RecordStorage::Exclusive(msg),
        }
    }

    /// A read-only container.
    #[inline]
    pub fn shared(msg: &'a DynamicMessage) -> Self {
        Self {
            storage: RecordStorage::Shared(msg),
        }
    }

    /// A read-only container over the empty message of type `desc`.
    #[inline]
    pub fn absent(desc: MessageDescriptor) -> Self {
        Self {
            storage: RecordStorage::Absent(desc),
        }
    }

    #[inline]
    pub fn boxed(self) -> Box<dyn Container<'a> + 'a> {
        Box::new(self)
    }

    pub fn message_descriptor(&self) -> &MessageDescriptor {
        match &self.storage {
            RecordStorage::Absent(desc) => desc,
            RecordStorage::Shared(msg) => msg.descriptor(),
            RecordStorage::Exclusive(msg) => msg.descriptor(),
        }
    }

    /// The wrapped message, `None` if absent.
    pub fn message(&self) -> Option<&DynamicMessage> {
        match &self.storage {
            RecordStorage::Absent(_) => None,
            RecordStorage::Shared(msg) => Some(*msg),
            RecordStorage::Exclusive(msg) => Some(&**msg),
        }
    }

    fn field(&self, key: &str) -> Result<FieldDescriptor, PatchError> {
        self.message_descriptor()
            .resolve_field(key)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Field, key))
    }

    fn exclusive(&mut self) -> Result<&mut DynamicMessage, PatchError> {
        match &mut self.storage {
            RecordStorage::Exclusive(msg) => Ok(&mut **msg),
            _ => Err(PatchError::MutationOfReadOnlyValue),
        }
    }

    fn read(&self, field: &FieldDescriptor) -> Value {
        match self.message() {
            Some(msg) => msg.get(field).into_owned(),
            None => field.default_value(),
        }
    }

    /// Replaces the whole message with `value`; `None` clears every field.
    ///
    /// Fields that are unset in `value` are cleared, the rest are copied.
    pub fn set_self(&mut self, value: Option<Item>) -> Result<(), PatchError> {
        let Some(item) = value else {
            return self.clear_self();
        };
        let msg = self.exclusive()?;
        let source = match item {
            Item::Value(Value::Message(source)) if source.descriptor() == msg.descriptor() => source,
            _ => return Err(mismatch(Operation::Set)),
        };
        let desc = msg.descriptor().clone();
        for field in desc.fields() {
            if source.has(&field) {
                msg.set(&field, source.get(&field).into_owned())
                    .map_err(|_| mismatch(Operation::Set))?;
            } else {
                msg.clear(&field);
            }
        }
        Ok(())
    }

    /// Unsets every field.
    pub fn clear_self(&mut self) -> Result<(), PatchError> {
        self.exclusive()?.clear_all();
        Ok(())
    }
}

/// Wraps a field value read from a message.
fn field_item(field: FieldDescriptor, value: Value) -> Item {
    match value {
        Value::List(items) if field.is_list() => Item::List(List::new(field, items)),
        Value::Map(entries) if field.is_map() => Item::Map(Map::new(field, entries)),
        value => Item::Value(value),
    }
}

impl<'a> Container<'a> for RecordContainer<'a> {
    #[inline]
    fn is_read_only(&self) -> bool {
        !matches!(self.storage, RecordStorage::Exclusive(_))
    }

    #[inline]
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::Record(self.message_descriptor().clone())
    }

    fn to_item(&self) -> Item {
        let msg = match self.message() {
            Some(msg) => msg.clone(),
            None => DynamicMessage::new(self.message_descriptor().clone()),
        };
        Item::Value(Value::Message(msg))
    }

    fn is_present(&self, key: &str) -> bool {
        let Ok(field) = self.field(key) else {
            return true;
        };
        !field.has_presence() || self.message().is_some_and(|msg| msg.has(&field))
    }

    fn get(&self, key: &str) -> Result<Item, PatchError> {
        let field = self.field(key)?;
        let value = self.read(&field);
        Ok(field_item(field, value))
    }

    fn get_new(&self, key: &str) -> Result<Item, PatchError> {
        let field = self.field(key)?;
        let value = field.default_value();
        Ok(field_item(field, value))
    }

    fn mutable(self: Box<Self>, key: &str) -> Result<&'a mut Value, PatchError> {
        let RecordStorage::Exclusive(msg) = self.storage else {
            return Err(PatchError::MutationOfReadOnlyValue);
        };
        let field = msg
            .descriptor()
            .resolve_field(key)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Field, key))?;
        msg.get_mut(&field).map_err(schema_mismatch)
    }

    fn access(self: Box<Self>, key: &str) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        let field = self.field(key)?;
        if field.is_list() {
            let storage = match self.storage {
                RecordStorage::Absent(_) => Backing::Absent,
                RecordStorage::Shared(msg) => match msg.get(&field) {
                    Cow::Borrowed(Value::List(items)) => Backing::Shared(items),
                    _ => Backing::Absent,
                },
                RecordStorage::Exclusive(msg) if msg.has(&field) => {
                    Backing::Backed(msg.list_mut(&field).map_err(schema_mismatch)?)
                }
                RecordStorage::Exclusive(msg) => Backing::Detached(msg),
            };
            return Ok(Box::new(ListContainer::from_storage(field, storage)));
        }
        if field.is_map() {
            let storage = match self.storage {
                RecordStorage::Absent(_) => Backing::Absent,
                RecordStorage::Shared(msg) => match msg.get(&field) {
                    Cow::Borrowed(Value::Map(entries)) => Backing::Shared(entries),
                    _ => Backing::Absent,
                },
                RecordStorage::Exclusive(msg) if msg.has(&field) => {
                    Backing::Backed(msg.map_mut(&field).map_err(schema_mismatch)?)
                }
                RecordStorage::Exclusive(msg) => Backing::Detached(msg),
            };
            return Ok(Box::new(MapContainer::from_storage(field, storage)));
        }
        let Some(desc) = field.kind().as_message().cloned() else {
            return Err(PatchError::AccessToNonContainer);
        };
        let child = match self.storage {
            RecordStorage::Absent(_) => RecordContainer::absent(desc),
            RecordStorage::Shared(msg) => match msg.get(&field) {
                Cow::Borrowed(Value::Message(child)) => RecordContainer::shared(child),
                _ => RecordContainer::absent(desc),
            },
            RecordStorage::Exclusive(msg) if msg.has(&field) => {
                match msg.get_mut(&field).map_err(schema_mismatch)? {
                    Value::Message(child) => RecordContainer::new(child),
                    _ => return Err(PatchError::MismatchingType),
                }
            }
            RecordStorage::Exclusive(_) => RecordContainer::absent(desc),
        };
        Ok(child.boxed())
    }

    fn access_mutable(
        self: Box<Self>,
        key: &str,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        let RecordStorage::Exclusive(msg) = self.storage else {
            return Err(PatchError::MutationOfReadOnlyValue);
        };
        let field = msg
            .descriptor()
            .resolve_field(key)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Field, key))?;
        if field.is_list() {
            let items = msg.list_mut(&field).map_err(schema_mismatch)?;
            return Ok(Box::new(ListContainer::new(field, items)));
        }
        if field.is_map() {
            let entries = msg.map_mut(&field).map_err(schema_mismatch)?;
            return Ok(Box::new(MapContainer::new(field, entries)));
        }
        if field.is_message() {
            return match msg.get_mut(&field).map_err(schema_mismatch)? {
                Value::Message(child) => Ok(RecordContainer::new(child).boxed()),
                _ => Err(PatchError::MismatchingType),
            };
        }
        if field.has_presence() && !msg.has(&field) {
            msg.get_mut(&field).map_err(schema_mismatch)?;
        }
        Err(PatchError::AccessToNonContainer)
    }

    fn set(&mut self, key: &str, value: Option<Item>) -> Result<(), PatchError> {
        let msg = self.exclusive()?;
        let field = msg
            .descriptor()
            .resolve_field(key)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Field, key))?;
        let Some(item) = value else {
            msg.clear(&field);
            return Ok(());
        };
        let value = field_value(&field, item).ok_or_else(|| mismatch(Operation::Set).in_path(key))?;
        msg.set(&field, value)
            .map_err(|_| mismatch(Operation::Set).in_path(key))
    }

    fn append(&mut self, _: Option<Item>) -> Result<(), PatchError> {
        self.exclusive()?;
        Err(PatchError::AppendToNonList)
    }

    fn insert(&mut self, _: &str, _: Option<Item>) -> Result<(), PatchError> {
        self.exclusive()?;
        Err(PatchError::InsertToNonList)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use vc_schema::Value;

    use super::RecordContainer;
    use crate::testing::{Fixture, entries};
    use crate::{Container, ContainerDescriptor, Item, NotFoundKind, Operation, PatchError};

    #[test]
    fn fields_resolve_by_name_json_name_and_number() {
        let fx = Fixture::new();
        let msg = fx.message([("display_name", Value::from("x"))]);
        let c = RecordContainer::shared(&msg);
        assert_eq!(c.get("display_name"), Ok(Item::from("x")));
        assert_eq!(c.get("displayName"), Ok(Item::from("x")));
        assert_eq!(c.get("11"), Ok(Item::from("x")));
        assert_eq!(
            c.get("unknown"),
            Err(PatchError::not_found(NotFoundKind::Field, "unknown"))
        );
        assert_eq!(
            c.get("99"),
            Err(PatchError::not_found(NotFoundKind::Field, "99"))
        );
    }

    #[test]
    fn unset_fields_read_as_defaults() {
        let fx = Fixture::new();
        let msg = fx.message([]);
        let c = RecordContainer::shared(&msg);
        assert_eq!(c.get("int32"), Ok(Item::from(0)));
        assert_eq!(
            c.get("message"),
            Ok(Item::from(fx.message([])))
        );
        let Ok(Item::Value(Value::Message(list))) = c.get("list") else {
            panic!("list is a message field");
        };
        assert_eq!(list, fx.list([]));
    }

    #[test]
    fn collections_are_typed_by_their_field() {
        let fx = Fixture::new();
        let msg = fx.list([("string", Value::from(vec!["a", "b"]))]);
        let c = RecordContainer::shared(&msg);
        let Ok(Item::List(list)) = c.get("string") else {
            panic!("string is a list field");
        };
        assert_eq!(list.field().name(), "string");
        assert_eq!(list.items(), [Value::from("a"), Value::from("b")]);

        let Ok(Item::List(empty)) = c.get_new("string") else {
            panic!("string is a list field");
        };
        assert!(empty.is_empty());
    }

    #[test]
    fn presence() {
        let fx = Fixture::new();
        let msg = fx.message([("optional_int32", Value::I32(0))]);
        let c = RecordContainer::shared(&msg);
        assert!(c.is_present("optional_int32"));
        assert!(c.is_present("int32"));
        assert!(!c.is_present("message"));
        assert!(!RecordContainer::absent(fx.message.clone()).is_present("optional_int32"));
    }

    #[test]
    fn set_checks_types() {
        let fx = Fixture::new();
        let mut msg = fx.message([]);
        let mut c = RecordContainer::new(&mut msg);
        assert_eq!(c.set("string", Some(Item::from("a"))), Ok(()));
        assert_eq!(
            c.set("string", Some(Item::from(1))),
            Err(PatchError::operation_failed(Operation::Set, PatchError::MismatchingType).in_path("string"))
        );
        assert_eq!(
            c.set("message", Some(Item::from(fx.list([])))),
            Err(PatchError::operation_failed(Operation::Set, PatchError::MismatchingType).in_path("message"))
        );
        assert_eq!(c.set("int32", Some(Item::from(5))), Ok(()));
        assert_eq!(c.set("int32", None), Ok(()));
        assert_eq!(msg, fx.message([("string", Value::from("a"))]));
    }

    #[test]
    fn set_accepts_typed_and_native_collections() {
        let fx = Fixture::new();
        let source = fx.list([("string", Value::from(vec!["a"]))]);
        let Ok(typed) = RecordContainer::shared(&source).get("string") else {
            panic!("string exists");
        };

        let mut msg = fx.list([]);
        let mut c = RecordContainer::new(&mut msg);
        assert_eq!(c.set("string", Some(typed.clone())), Ok(()));
        assert_eq!(
            c.set("int32", Some(typed)),
            Err(PatchError::operation_failed(Operation::Set, PatchError::MismatchingType).in_path("int32"))
        );
        assert_eq!(c.set("int32", Some(Item::from(vec![1, 2]))), Ok(()));
        assert_eq!(
            msg,
            fx.list([
                ("string", Value::from(vec!["a"])),
                ("int32", Value::from(vec![1, 2])),
            ])
        );

        let mut msg = fx.map([]);
        let mut c = RecordContainer::new(&mut msg);
        let value = entries([("k", "v")]);
        assert_eq!(c.set("string_to_string", Some(Item::Value(value.clone()))), Ok(()));
        assert_eq!(
            c.set("int32_to_string", Some(Item::Value(value.clone()))),
            Err(PatchError::operation_failed(Operation::Set, PatchError::MismatchingType).in_path("int32_to_string"))
        );
        assert_eq!(msg, fx.map([("string_to_string", value)]));
    }

    #[test]
    fn read_only_rejects_writes() {
        let fx = Fixture::new();
        let msg = fx.message([]);
        let mut c = RecordContainer::shared(&msg);
        assert_eq!(
            c.set("string", Some(Item::from("a"))),
            Err(PatchError::MutationOfReadOnlyValue)
        );
        assert_eq!(c.set("string", None), Err(PatchError::MutationOfReadOnlyValue));
        assert_eq!(c.append(None), Err(PatchError::MutationOfReadOnlyValue));
        assert_eq!(c.insert("0", None), Err(PatchError::MutationOfReadOnlyValue));
        assert_eq!(c.set_self(None), Err(PatchError::MutationOfReadOnlyValue));
        assert!(matches!(
            Box::new(c).access_mutable("message"),
            Err(PatchError::MutationOfReadOnlyValue)
        ));
    }

    #[test]
    fn structural_operations_are_list_only() {
        let fx = Fixture::new();
        let mut msg = fx.message([]);
        let mut c = RecordContainer::new(&mut msg);
        assert_eq!(c.append(None), Err(PatchError::AppendToNonList));
        assert_eq!(c.insert("0", None), Err(PatchError::InsertToNonList));
    }

    #[test]
    fn access_does_not_materialize() {
        let fx = Fixture::new();
        let mut msg = fx.message([]);
        {
            let Ok(child) = Box::new(RecordContainer::new(&mut msg)).access("message") else {
                panic!("message is a message field");
            };
            assert!(child.is_read_only());
            assert_eq!(
                child.descriptor(),
                ContainerDescriptor::Record(fx.message.clone())
            );
        }
        {
            let Ok(list) = Box::new(RecordContainer::new(&mut msg)).access("list") else {
                panic!("list is a message field");
            };
            let Ok(strings) = list.access("string") else {
                panic!("string is a list field");
            };
            assert!(strings.is_read_only());
        }
        assert_eq!(msg, fx.message([]));
    }

    #[test]
    fn detached_list_materializes_on_write() {
        let fx = Fixture::new();
        let mut msg = fx.list([]);
        {
            let Ok(mut strings) = Box::new(RecordContainer::new(&mut msg)).access("string") else {
                panic!("string is a list field");
            };
            assert!(!strings.is_read_only());
            assert_eq!(strings.append(Some(Item::from("a"))), Ok(()));
        }
        assert_eq!(msg, fx.list([("string", Value::from(vec!["a"]))]));
    }

    #[test]
    fn access_mutable_materializes() {
        let fx = Fixture::new();
        let mut msg = fx.message([]);
        {
            let Ok(child) = Box::new(RecordContainer::new(&mut msg)).access_mutable("message") else {
                panic!("message is a message field");
            };
            assert!(!child.is_read_only());
        }
        assert_eq!(msg, fx.message([("message", fx.message([]).into())]));

        assert!(matches!(
            Box::new(RecordContainer::new(&mut msg)).access_mutable("optional_int32"),
            Err(PatchError::AccessToNonContainer)
        ));
        assert_eq!(
            msg,
            fx.message([
                ("message", fx.message([]).into()),
                ("optional_int32", Value::I32(0)),
            ])
        );
    }

    #[test]
    fn scalars_are_not_containers() {
        let fx = Fixture::new();
        let msg = fx.message([]);
        let err = Box::new(RecordContainer::shared(&msg)).access("string");
        assert!(matches!(err, Err(PatchError::AccessToNonContainer)));
    }

    #[test]
    fn mutable_sets_default_for_presence_fields() {
        let fx = Fixture::new();
        let mut msg = fx.message([]);
        let Ok(value) = Box::new(RecordContainer::new(&mut msg)).mutable("optional_int32") else {
            panic!("optional_int32 exists");
        };
        *value = Value::I32(3);
        assert_eq!(msg, fx.message([("optional_int32", Value::I32(3))]));

        let msg = fx.message([]);
        let err = Box::new(RecordContainer::shared(&msg)).mutable("int32");
        assert!(matches!(err, Err(PatchError::MutationOfReadOnlyValue)));
    }

    #[test]
    fn set_self_copies_fields() {
        let fx = Fixture::new();
        let mut msg = fx.message([("string", Value::from("old")), ("int32", Value::I32(1))]);
        let source = fx.message([("string", Value::from("new")), ("optional_int32", Value::I32(0))]);
        let mut c = RecordContainer::new(&mut msg);
        assert_eq!(c.set_self(Some(Item::from(source.clone()))), Ok(()));
        assert_eq!(
            c.set_self(Some(Item::from(fx.list([])))),
            Err(PatchError::operation_failed(Operation::Set, PatchError::MismatchingType))
        );
        assert_eq!(msg, source);

        let mut c = RecordContainer::new(&mut msg);
        assert_eq!(c.set_self(None), Ok(()));
        assert_eq!(msg, fx.message([]));
    }
}
