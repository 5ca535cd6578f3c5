//! Values passed in and out of containers.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use vc_schema::{DynamicMessage, FieldDescriptor, MapKey, Value};

// -----------------------------------------------------------------------------
// Item

/// A value read from or written to a container slot.
///
/// Whole list and map fields are read as [`Item::List`] / [`Item::Map`],
/// which remember the field that typed them. Writes accept those as well as
/// plain [`Value::List`] / [`Value::Map`] collections with matching
/// elements. [`Item::Opaque`] carries foreign values that only a
/// [`Converter`](crate::Converter) can turn into something storable.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Value(Value),
    List(List),
    Map(Map),
    Opaque(Opaque),
}

impl Item {
    #[inline]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Item::Value(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Item::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Item::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Item::Opaque(opaque) => Some(opaque),
            _ => None,
        }
    }

    /// Returns the item as a plain [`Value`], unwrapping typed collections.
    ///
    /// Opaque items have no value representation.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Item::Value(value) => Some(value),
            Item::List(list) => Some(Value::List(list.items)),
            Item::Map(map) => Some(Value::Map(map.entries)),
            Item::Opaque(_) => None,
        }
    }
}

macro_rules! impl_item_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Item {
                #[inline]
                fn from(value: $ty) -> Self {
                    Item::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_item_from_value!(bool, i32, i64, u32, u64, f32, f64, String, &str, DynamicMessage);

impl From<Value> for Item {
    #[inline]
    fn from(value: Value) -> Self {
        Item::Value(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Item {
    #[inline]
    fn from(items: Vec<T>) -> Self {
        Item::Value(Value::from(items))
    }
}

impl From<List> for Item {
    #[inline]
    fn from(list: List) -> Self {
        Item::List(list)
    }
}

impl From<Map> for Item {
    #[inline]
    fn from(map: Map) -> Self {
        Item::Map(map)
    }
}

impl From<Opaque> for Item {
    #[inline]
    fn from(opaque: Opaque) -> Self {
        Item::Opaque(opaque)
    }
}

// -----------------------------------------------------------------------------
// List

/// The elements of a list field, together with the field.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    field: FieldDescriptor,
    items: Vec<Value>,
}

impl List {
    /// Wraps `items` as the content of the list `field`.
    ///
    /// Element types are checked when the list is written to a message.
    #[inline]
    pub fn new(field: FieldDescriptor, items: Vec<Value>) -> Self {
        Self { field, items }
    }

    #[inline]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    #[inline]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    #[inline]
    pub fn items_mut(&mut self) -> &mut Vec<Value> {
        &mut self.items
    }

    #[inline]
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A zero element of the list's element type.
    #[inline]
    pub fn new_element(&self) -> Value {
        self.field.kind().default_value()
    }
}

// -----------------------------------------------------------------------------
// Map

/// The entries of a map field, together with the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    field: FieldDescriptor,
    entries: BTreeMap<MapKey, Value>,
}

impl Map {
    /// Wraps `entries` as the content of the map `field`.
    #[inline]
    pub fn new(field: FieldDescriptor, entries: BTreeMap<MapKey, Value>) -> Self {
        Self { field, entries }
    }

    #[inline]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    #[inline]
    pub fn entries(&self) -> &BTreeMap<MapKey, Value> {
        &self.entries
    }

    #[inline]
    pub fn entries_mut(&mut self) -> &mut BTreeMap<MapKey, Value> {
        &mut self.entries
    }

    #[inline]
    pub fn into_entries(self) -> BTreeMap<MapKey, Value> {
        self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A zero value of the map's value type.
    #[inline]
    pub fn new_value(&self) -> Value {
        self.field.kind().default_value()
    }
}

// -----------------------------------------------------------------------------
// Opaque

/// A shared, type-erased foreign value.
///
/// Equality is identity: two opaque items are equal only if one is a clone
/// of the other.
///
/// # Examples
///
/// ```
/// use vc_patch::{Item, Opaque};
///
/// let item = Item::from(Opaque::new(vec![1.5_f64, 2.5]));
/// let numbers = item.as_opaque().and_then(|o| o.downcast_ref::<Vec<f64>>());
/// assert_eq!(numbers.map(Vec::len), Some(2));
/// ```
#[derive(Clone)]
pub struct Opaque {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: core::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// The [`TypeId`] of the wrapped value.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        (*self.value).type_id()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Opaque {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.type_name).finish()
    }
}
