use vc_schema::DynamicMessage;

use crate::access::within;
use crate::{Container, Item, Path, PatchError, RecordContainer, Setup};

impl Setup {
    /// Writes `value` to the slot at `path`.
    ///
    /// The value runs through the converters against a zero value of the
    /// slot (see [`Setup::get_new`]) and is then type checked by the
    /// container. Map keys that do not exist yet are inserted; list indexes
    /// must exist. Writing the empty path replaces `root` with a message of
    /// the same type, field by field.
    ///
    /// Unset messages on the way are not allocated: writing below them fails
    /// with [`PatchError::MutationOfReadOnlyValue`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_patch::{Item, Operation, PatchError};
    /// # use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema, Value};
    /// # let schema = Schema::builder()
    /// #     .message(
    /// #         MessageBuilder::new("demo.Node")
    /// #             .field(FieldBuilder::new("label", 1, FieldType::String))
    /// #             .field(FieldBuilder::new("weight", 2, FieldType::Int32))
    /// #             .field(FieldBuilder::new("child", 3, FieldType::message("demo.Node"))),
    /// #     )
    /// #     .build()
    /// #     .unwrap();
    /// # let node = schema.message_by_name("demo.Node").unwrap();
    /// let mut root = DynamicMessage::new(node.clone());
    ///
    /// assert_eq!(
    ///     vc_patch::set(&mut root, "child.weight", 3),
    ///     Err(PatchError::MutationOfReadOnlyValue.in_path("child")),
    /// );
    /// vc_patch::set(&mut root, "child", DynamicMessage::new(node)).unwrap();
    /// assert_eq!(vc_patch::set(&mut root, "child.weight", 3), Ok(()));
    /// assert_eq!(vc_patch::get(&root, "child.weight"), Ok(Item::from(3)));
    ///
    /// let mismatch = PatchError::operation_failed(Operation::Set, PatchError::MismatchingType);
    /// assert_eq!(
    ///     vc_patch::set(&mut root, "child.weight", "heavy"),
    ///     Err(mismatch.in_path("child.weight")),
    /// );
    /// ```
    pub fn set(
        &self,
        root: &mut DynamicMessage,
        path: &str,
        value: impl Into<Item>,
    ) -> Result<(), PatchError> {
        self.assign(root, Path::new(path), Some(value.into()))
    }

    /// Unsets the slot at `path`.
    ///
    /// Fields return to their default value, map entries are removed and
    /// list elements are deleted, shifting the following ones. Clearing the
    /// empty path unsets every field of `root`.
    pub fn clear(&self, root: &mut DynamicMessage, path: &str) -> Result<(), PatchError> {
        self.assign(root, Path::new(path), None)
    }

    /// Writes or, for `None`, clears the slot at `path`.
    pub(crate) fn assign(
        &self,
        root: &mut DynamicMessage,
        path: Path<'_>,
        value: Option<Item>,
    ) -> Result<(), PatchError> {
        if path.is_root() {
            let mut container = RecordContainer::new(root);
            let converted = match value {
                Some(value) => self.coerce(&container.to_item(), value)?,
                None => None,
            };
            return container.set_self(converted);
        }
        let (mut parent, last) = self.parent(RecordContainer::new(root).boxed(), path)?;
        let key = last.value();
        let converted = match value {
            Some(value) => {
                let placeholder = parent.get_new(key).map_err(|err| within(err, &last))?;
                self.coerce(&placeholder, value)
                    .map_err(|err| err.in_path(last.preceding_path_with_current().as_str()))?
            }
            None => None,
        };
        parent.set(key, converted).map_err(|err| within(err, &last))
    }

    /// Writes the slot at `path` back to itself.
    ///
    /// This checks that the slot is writable without changing the tree.
    /// Unset slots stay unset.
    pub(crate) fn set_to_itself(
        &self,
        root: &mut DynamicMessage,
        path: Path<'_>,
    ) -> Result<(), PatchError> {
        let (mut parent, last) = self.parent(RecordContainer::new(root).boxed(), path)?;
        if path.is_root() {
            return Ok(());
        }
        let key = last.value();
        if !parent.is_present(key) {
            if parent.is_read_only() {
                return Err(within(PatchError::MutationOfReadOnlyValue, &last));
            }
            return Ok(());
        }
        let value = parent.get(key).map_err(|err| within(err, &last))?;
        parent.set(key, Some(value)).map_err(|err| within(err, &last))
    }
}

// -----------------------------------------------------------------------------
// Tests
