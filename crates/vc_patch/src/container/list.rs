use alloc::boxed::Box;
use alloc::vec::Vec;

use vc_schema::{DynamicMessage, FieldDescriptor, Value};

use super::storage::Backing;
use super::{Container, ContainerDescriptor, RecordContainer};
use super::{element_value, index_up_to, mismatch, schema_mismatch, zero_element};
use crate::{Item, List, NotFoundKind, Operation, PatchError};

// -----------------------------------------------------------------------------
// ListContainer

/// A [`Container`] over the elements of a list field.
///
/// Keys are signed decimal indexes, negative ones counting from the end.
/// Setting `None` removes the element and shifts the following ones left.
///
/// # Examples
///
/// ```
/// use vc_patch::{Container, Item, ListContainer};
/// # use vc_schema::{FieldBuilder, FieldType, MessageBuilder, Schema, Value};
/// # let schema = Schema::builder()
/// #     .message(MessageBuilder::new("demo.Tags").field(FieldBuilder::new("tags", 1, FieldType::String).repeated()))
/// #     .build()
/// #     .unwrap();
/// # let field = schema.message_by_name("demo.Tags").unwrap().field_by_name("tags").unwrap();
///
/// let mut tags = vec![Value::from("a"), Value::from("c")];
/// let mut list = ListContainer::new(field, &mut tags);
///
/// list.insert("-1", Some(Item::from("b"))).unwrap();
/// list.set("0", None).unwrap();
/// assert_eq!(list.get("-1").unwrap(), Item::from("c"));
/// assert_eq!(tags, [Value::from("b"), Value::from("c")]);
/// ```
pub struct ListContainer<'a> {
    field: FieldDescriptor,
    storage: Backing<'a, Vec<Value>>,
}

impl<'a> ListContainer<'a> {
    /// A writable container over `items`, the elements of `field`.
    #[inline]
    pub fn new(field: FieldDescriptor, items: &'a mut Vec<Value>) -> Self {
        Self::from_storage(field, Backing::Backed(items))
    }

    /// A read-only container over `items`.
    #[inline]
    pub fn shared(field: FieldDescriptor, items: &'a Vec<Value>) -> Self {
        Self::from_storage(field, Backing::Shared(items))
    }

    #[inline]
    pub(crate) fn from_storage(field: FieldDescriptor, storage: Backing<'a, Vec<Value>>) -> Self {
        Self { field, storage }
    }

    #[inline]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn items(&self) -> &[Value] {
        self.storage.get().map(Vec::as_slice).unwrap_or_default()
    }

    fn index(&self, key: &str) -> Result<usize, PatchError> {
        index_up_to(self.len(), key)
    }

    fn materialize(&mut self) -> Result<&mut Vec<Value>, PatchError> {
        let field = self.field.clone();
        self.storage.materialize(|parent: &'a mut DynamicMessage| {
            parent.list_mut(&field).map_err(schema_mismatch)
        })
    }

    fn element(&self, op: Operation, value: Option<Item>) -> Result<Value, PatchError> {
        match value {
            None => Ok(zero_element(&self.field)),
            Some(item) => element_value(&self.field, item).ok_or_else(|| mismatch(op)),
        }
    }
}

impl<'a> Container<'a> for ListContainer<'a> {
    #[inline]
    fn is_read_only(&self) -> bool {
        self.storage.is_read_only()
    }

    #[inline]
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::List(self.field.clone())
    }

    fn to_item(&self) -> Item {
        Item::List(List::new(self.field.clone(), self.items().to_vec()))
    }

    fn get(&self, key: &str) -> Result<Item, PatchError> {
        let index = self.index(key)?;
        Ok(Item::Value(self.items()[index].clone()))
    }

    /// Only checks that `key` is an index, not that it is in range.
    fn get_new(&self, key: &str) -> Result<Item, PatchError> {
        key.parse::<i64>()
            .map_err(|_| PatchError::not_found(NotFoundKind::Index, key))?;
        Ok(Item::Value(zero_element(&self.field)))
    }

    fn mutable(self: Box<Self>, key: &str) -> Result<&'a mut Value, PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let index = self.index(key)?;
        let field = self.field;
        let items = self.storage.into_mut(|parent: &'a mut DynamicMessage| {
            parent.list_mut(&field).map_err(schema_mismatch)
        })?;
        Ok(&mut items[index])
    }

    fn access(self: Box<Self>, key: &str) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        let index = self.index(key)?;
        if !self.field.is_message() {
            return Err(PatchError::AccessToNonContainer);
        }
        let child = match self.storage {
            Backing::Shared(items) => items.get(index).and_then(Value::as_message).map(RecordContainer::shared),
            Backing::Backed(items) => items
                .get_mut(index)
                .and_then(Value::as_message_mut)
                .map(RecordContainer::new),
            Backing::Absent | Backing::Detached(_) => None,
        };
        child
            .map(RecordContainer::boxed)
            .ok_or_else(|| PatchError::not_found(NotFoundKind::Index, key))
    }

    fn access_mutable(
        self: Box<Self>,
        key: &str,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let index = self.index(key)?;
        if !self.field.is_message() {
            return Err(PatchError::AccessToNonContainer);
        }
        let field = self.field;
        let items = self.storage.into_mut(|parent: &'a mut DynamicMessage| {
            parent.list_mut(&field).map_err(schema_mismatch)
        })?;
        match items.get_mut(index).and_then(Value::as_message_mut) {
            Some(child) => Ok(RecordContainer::new(child).boxed()),
            None => Err(PatchError::not_found(NotFoundKind::Index, key)),
        }
    }

    fn set(&mut self, key: &str, value: Option<Item>) -> Result<(), PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let index = self.index(key)?;
        let Some(item) = value else {
            self.materialize()?.remove(index);
            return Ok(());
        };
        let value = element_value(&self.field, item)
            .ok_or_else(|| mismatch(Operation::Set).in_path(key))?;
        self.materialize()?[index] = value;
        Ok(())
    }

    fn append(&mut self, value: Option<Item>) -> Result<(), PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let value = self.element(Operation::Append, value)?;
        self.materialize()?.push(value);
        Ok(())
    }

    fn insert(&mut self, key: &str, value: Option<Item>) -> Result<(), PatchError> {
        if self.is_read_only() {
            return Err(PatchError::MutationOfReadOnlyValue);
        }
        let index = index_up_to(self.len() + 1, key)?;
        let value = self
            .element(Operation::Insert, value)
            .map_err(|err| err.in_path(key))?;
        let items = self.materialize()?;
        items.push(value);
        items[index..].rotate_right(1);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
