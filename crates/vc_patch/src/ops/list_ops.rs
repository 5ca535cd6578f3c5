use vc_schema::DynamicMessage;

use crate::access::within;
use crate::container::zero_element;
use crate::{ContainerDescriptor, Item, Path, PatchError, RecordContainer, Setup};

impl Setup {
    /// Appends `value` to the list at `path`.
    ///
    /// The value runs through the converters against a zero element of the
    /// list. An unset list field is allocated by the first append.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_patch::{Item, PatchError};
    /// # use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema, Value};
    /// # let schema = Schema::builder()
    /// #     .message(
    /// #         MessageBuilder::new("demo.Doc")
    /// #             .field(FieldBuilder::new("title", 1, FieldType::String))
    /// #             .field(FieldBuilder::new("tags", 2, FieldType::String).repeated()),
    /// #     )
    /// #     .build()
    /// #     .unwrap();
    /// # let doc = schema.message_by_name("demo.Doc").unwrap();
    /// let mut root = DynamicMessage::new(doc);
    ///
    /// vc_patch::append(&mut root, "tags", "b").unwrap();
    /// vc_patch::insert(&mut root, "tags.0", "a").unwrap();
    /// assert_eq!(vc_patch::get(&root, "tags.0"), Ok(Item::from("a")));
    /// assert_eq!(vc_patch::get(&root, "tags.-1"), Ok(Item::from("b")));
    ///
    /// assert_eq!(
    ///     vc_patch::append(&mut root, "title", "c"),
    ///     Err(PatchError::AccessToNonContainer.in_path("title")),
    /// );
    /// ```
    pub fn append(
        &self,
        root: &mut DynamicMessage,
        path: &str,
        value: impl Into<Item>,
    ) -> Result<(), PatchError> {
        let path = Path::new(path);
        if path.is_root() {
            return Err(PatchError::AppendToNonList);
        }
        let mut list = self.walk(RecordContainer::new(root).boxed(), path, false)?;
        let placeholder = list
            .new_element()
            .ok_or_else(|| PatchError::AppendToNonList.in_path(path.as_str()))?;
        let converted = self
            .coerce(&placeholder, value.into())
            .map_err(|err| err.in_path(&path.join_values(["*"])))?;
        list.append(converted).map_err(|err| err.in_path(path.as_str()))
    }

    /// Inserts `value` into a list before the index that ends `path`.
    ///
    /// The index may also be the length of the list, which appends, and
    /// negative indexes count from the end: `-1` appends as well. Maps do not
    /// support insertion, write their keys with [`Setup::set`] instead.
    pub fn insert(
        &self,
        root: &mut DynamicMessage,
        path: &str,
        value: impl Into<Item>,
    ) -> Result<(), PatchError> {
        let path = Path::new(path);
        if path.is_root() {
            return Err(PatchError::InsertToNonList);
        }
        let (mut list, last) = self.parent(RecordContainer::new(root).boxed(), path)?;
        let placeholder = match list.descriptor() {
            ContainerDescriptor::Map(field) => Some(Item::Value(zero_element(&field))),
            _ => list.new_element(),
        };
        let placeholder = placeholder.ok_or_else(|| within(PatchError::InsertToNonList, &last))?;
        let converted = self
            .coerce(&placeholder, value.into())
            .map_err(|err| err.in_path(last.preceding_path_with_current().as_str()))?;
        list.insert(last.value(), converted)
            .map_err(|err| within(err, &last))
    }
}

// -----------------------------------------------------------------------------
// Tests
