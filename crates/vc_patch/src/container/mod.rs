//! Uniform views over messages, lists and maps.
//!
//! A [`Container`] wraps one composite node of a message tree and addresses
//! its children with a single path segment: a field selector for messages,
//! a signed index for lists and a textual key for maps.
//!
//! Containers are created per call and borrow the tree. The descending
//! methods ([`access`](Container::access),
//! [`access_mutable`](Container::access_mutable) and
//! [`mutable`](Container::mutable)) consume the container and hand out
//! borrows with the lifetime of the whole tree.

// -----------------------------------------------------------------------------
// Modules

mod list;
mod map;
mod record;
mod storage;

// -----------------------------------------------------------------------------
// Exports

pub use list::ListContainer;
pub use map::MapContainer;
pub use record::RecordContainer;

// -----------------------------------------------------------------------------
// Container

use alloc::boxed::Box;

use vc_schema::{FieldDescriptor, MessageDescriptor, Value};

use crate::{Item, PatchError};

/// Describes what a container wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerDescriptor {
    Record(MessageDescriptor),
    /// A list, typed by its field.
    List(FieldDescriptor),
    /// A map, typed by its field.
    Map(FieldDescriptor),
    /// A container provided by a
    /// [`ContainerTransformer`](crate::ContainerTransformer) that is none of
    /// the above.
    Other,
}

/// A read/write view over one message, list or map.
///
/// Keys are single path segments. Writes on a read-only container fail with
/// [`PatchError::MutationOfReadOnlyValue`]; type mismatches are reported as
/// [`PatchError::OperationFailed`] around [`PatchError::MismatchingType`].
pub trait Container<'a> {
    /// Returns `true` if the container can not be written through.
    fn is_read_only(&self) -> bool;

    fn descriptor(&self) -> ContainerDescriptor;

    /// A copy of the wrapped message, list or map.
    fn to_item(&self) -> Item;

    /// Returns `false` if the slot is currently unset.
    ///
    /// Slots without presence tracking are always reported as present.
    fn is_present(&self, key: &str) -> bool {
        let _ = key;
        true
    }

    /// Reads a slot.
    fn get(&self, key: &str) -> Result<Item, PatchError>;

    /// Reads a slot into a value that shares nothing with the tree.
    ///
    /// Items are owned, so this is [`get`](Self::get) unless the container
    /// wraps shared storage.
    fn get_copy(&self, key: &str) -> Result<Item, PatchError> {
        self.get(key)
    }

    /// A zero value shaped like the slot, without touching storage.
    fn get_new(&self, key: &str) -> Result<Item, PatchError>;

    /// A zero element for [`append`](Self::append) and
    /// [`insert`](Self::insert), `None` if the container is not a list.
    fn new_element(&self) -> Option<Item> {
        match self.descriptor() {
            ContainerDescriptor::List(field) => Some(Item::Value(zero_element(&field))),
            _ => None,
        }
    }

    /// Mutable access to a slot. Unset slots with presence tracking are set
    /// to their default value first.
    fn mutable(self: Box<Self>, key: &str) -> Result<&'a mut Value, PatchError>;

    /// Descends into a child message, list or map without writing anything.
    ///
    /// Children of read-only containers and unset children are read-only.
    fn access(self: Box<Self>, key: &str) -> Result<Box<dyn Container<'a> + 'a>, PatchError>;

    /// Descends into a child, setting unset children to their default value.
    fn access_mutable(self: Box<Self>, key: &str)
    -> Result<Box<dyn Container<'a> + 'a>, PatchError>;

    /// Writes a slot; `None` clears it.
    fn set(&mut self, key: &str, value: Option<Item>) -> Result<(), PatchError>;

    /// Appends to a list; `None` appends a zero element.
    fn append(&mut self, value: Option<Item>) -> Result<(), PatchError>;

    /// Inserts into a list before `key`; `None` inserts a zero element.
    fn insert(&mut self, key: &str, value: Option<Item>) -> Result<(), PatchError>;
}

// -----------------------------------------------------------------------------
// Helpers

use vc_schema::SchemaError;

use crate::{NotFoundKind, Operation};

/// `OperationFailed { op, MismatchingType }`.
#[inline]
pub(crate) fn mismatch(op: Operation) -> PatchError {
    PatchError::operation_failed(op, PatchError::MismatchingType)
}

/// Normalizes a signed index into `0..len`.
///
/// Inserting passes `len + 1` so that the end of the list is addressable.
pub(crate) fn index_up_to(len: usize, key: &str) -> Result<usize, PatchError> {
    let not_found = || PatchError::not_found(NotFoundKind::Index, key);
    let index = key.parse::<i64>().map_err(|_| not_found())?;
    let len = i64::try_from(len).map_err(|_| not_found())?;
    if index < -len || index >= len {
        return Err(not_found());
    }
    let index = if index < 0 { index + len } else { index };
    usize::try_from(index).map_err(|_| not_found())
}

/// A zero value for a single element of `field`.
#[inline]
pub(crate) fn zero_element(field: &FieldDescriptor) -> Value {
    field.kind().default_value()
}

/// Schema errors past field resolution can only be type errors.
#[inline]
pub(crate) fn schema_mismatch(_: SchemaError) -> PatchError {
    PatchError::MismatchingType
}

/// Unwraps `item` into a value storable in `field` as a whole.
///
/// Typed lists and maps are accepted when their field has the same shape.
pub(crate) fn field_value(field: &FieldDescriptor, item: Item) -> Option<Value> {
    let value = match item {
        Item::List(list) if list.field().is_shape_of(field) => Value::List(list.into_items()),
        Item::Map(map) if map.field().is_shape_of(field) => Value::Map(map.into_entries()),
        Item::Value(value) => value,
        Item::List(_) | Item::Map(_) | Item::Opaque(_) => return None,
    };
    field.accepts(&value).then_some(value)
}

/// Unwraps `item` into a single list element or map value of `field`.
pub(crate) fn element_value(field: &FieldDescriptor, item: Item) -> Option<Value> {
    match item {
        Item::Value(value) if field.kind().accepts(&value) => Some(value),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Tests
