use vc_schema::{DynamicMessage, Value};

use crate::access::within;
use crate::{Item, Path, PatchError, RecordContainer, Setup};

impl Setup {
    /// Reads the slot at `path`.
    ///
    /// Lists and maps read as a whole are [`Item::List`] and [`Item::Map`].
    /// Unset fields read as their default value. The empty path reads a
    /// copy of `root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_patch::{Item, NotFoundKind, PatchError};
    /// # use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema, Value};
    /// # let schema = Schema::builder()
    /// #     .message(
    /// #         MessageBuilder::new("demo.Node")
    /// #             .field(FieldBuilder::new("label", 1, FieldType::String))
    /// #             .field(FieldBuilder::new("child", 2, FieldType::message("demo.Node"))),
    /// #     )
    /// #     .build()
    /// #     .unwrap();
    /// # let node = schema.message_by_name("demo.Node").unwrap();
    /// let mut root = DynamicMessage::new(node.clone());
    /// vc_patch::set(&mut root, "child", DynamicMessage::new(node)).unwrap();
    /// vc_patch::set(&mut root, "child.label", "leaf").unwrap();
    ///
    /// assert_eq!(vc_patch::get(&root, "child.label"), Ok(Item::from("leaf")));
    /// assert_eq!(vc_patch::get(&root, "child.child.label"), Ok(Item::from("")));
    /// assert_eq!(
    ///     vc_patch::get(&root, "child.name"),
    ///     Err(PatchError::not_found(NotFoundKind::Field, "name").in_path("child")),
    /// );
    /// ```
    pub fn get(&self, root: &DynamicMessage, path: &str) -> Result<Item, PatchError> {
        let path = Path::new(path);
        if path.is_root() {
            return Ok(Item::Value(Value::Message(root.clone())));
        }
        let (parent, last) = self.parent(RecordContainer::shared(root).boxed(), path)?;
        parent.get(last.value()).map_err(|err| within(err, &last))
    }

    /// Reads a copy of the slot at `path` that shares nothing with `root`.
    pub fn get_copy(&self, root: &DynamicMessage, path: &str) -> Result<Item, PatchError> {
        let path = Path::new(path);
        if path.is_root() {
            return Ok(Item::Value(Value::Message(root.clone())));
        }
        let (parent, last) = self.parent(RecordContainer::shared(root).boxed(), path)?;
        parent.get_copy(last.value()).map_err(|err| within(err, &last))
    }

    /// A zero value shaped like the slot at `path`.
    ///
    /// The slot itself does not need to exist, only its parent: list
    /// indexes and map keys are parsed but not looked up.
    pub fn get_new(&self, root: &DynamicMessage, path: &str) -> Result<Item, PatchError> {
        let path = Path::new(path);
        if path.is_root() {
            return Ok(Item::Value(Value::Message(DynamicMessage::new(
                root.descriptor().clone(),
            ))));
        }
        let (parent, last) = self.parent(RecordContainer::shared(root).boxed(), path)?;
        parent.get_new(last.value()).map_err(|err| within(err, &last))
    }

    /// Mutable access to the slot at `path`.
    ///
    /// Every message on the way is set to its default value if unset, and
    /// so is the slot itself when it is an unset field with presence.
    pub fn get_mut<'a>(
        &self,
        root: &'a mut DynamicMessage,
        path: &str,
    ) -> Result<&'a mut Value, PatchError> {
        let last = Path::new(path).last();
        let parent = self.walk(RecordContainer::new(root).boxed(), last.preceding_path(), true)?;
        parent.mutable(last.value()).map_err(|err| within(err, &last))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use vc_schema::Value;

    use crate::testing::{Fixture, entries};
    use crate::{Item, NotFoundKind, PatchError, Setup};

    #[test]
    fn reads_nested_slots() {
        let fx = Fixture::new();
        let msg = fx.message([
            ("list", fx.list([("string", Value::from(vec!["a", "b"]))]).into()),
            ("map", fx.map([("int32_to_string", entries([(7_i32, "seven")]))]).into()),
            ("message", fx.message([("int32", Value::I32(4))]).into()),
        ]);

        assert_eq!(crate::get(&msg, "list.string.-1"), Ok(Item::from("b")));
        assert_eq!(crate::get(&msg, "map.int32_to_string.0x7"), Ok(Item::from("seven")));
        assert_eq!(crate::get(&msg, "message.int32"), Ok(Item::from(4)));
        assert_eq!(crate::get(&msg, "3.1.0"), Ok(Item::from("a")));
        assert_eq!(crate::get(&msg, ""), Ok(Item::from(msg.clone())));
        assert!(matches!(crate::get(&msg, "list.string"), Ok(Item::List(list)) if list.len() == 2));
    }

    #[test]
    fn reads_unset_slots_as_defaults() {
        let fx = Fixture::new();
        let msg = fx.message([]);

        assert_eq!(crate::get(&msg, "message.message.string"), Ok(Item::from("")));
        assert_eq!(crate::get(&msg, "message"), Ok(Item::from(fx.message([]))));
        assert_eq!(
            crate::get(&msg, "list.string.0"),
            Err(PatchError::not_found(NotFoundKind::Index, "0").in_path("list.string"))
        );
        assert_eq!(
            crate::get(&msg, "map.string_to_string.k"),
            Err(PatchError::not_found(NotFoundKind::Key, "k").in_path("map.string_to_string"))
        );
    }

    #[test]
    fn read_errors_name_the_failing_location() {
        let fx = Fixture::new();
        let msg = fx.with_strings(&["a"]);

        assert_eq!(crate::get(&msg, "nope"), Err(PatchError::not_found(NotFoundKind::Field, "nope")));
        assert_eq!(
            crate::get(&msg, "string.length"),
            Err(PatchError::AccessToNonContainer.in_path("string"))
        );
        assert_eq!(
            crate::get(&msg, "list.string.x"),
            Err(PatchError::not_found(NotFoundKind::Index, "x").in_path("list.string"))
        );
    }

    #[test]
    fn copies_are_detached() {
        let fx = Fixture::new();
        let msg = fx.message([("message", fx.message([("string", Value::from("x"))]).into())]);

        let Ok(Item::Value(Value::Message(mut copy))) = crate::get_copy(&msg, "message") else {
            panic!("message is a message");
        };
        copy.clear_all();
        assert_eq!(crate::get(&msg, "message.string"), Ok(Item::from("x")));
    }

    #[test]
    fn new_values_only_need_the_parent() {
        let fx = Fixture::new();
        let msg = fx.with_strings(&["a"]);

        assert_eq!(crate::get_new(&msg, "list.string.9"), Ok(Item::from("")));
        assert_eq!(crate::get_new(&msg, "map.int32_to_string.12"), Ok(Item::from("")));
        assert_eq!(crate::get_new(&msg, "message"), Ok(Item::from(fx.message([]))));
        assert_eq!(crate::get_new(&msg, ""), Ok(Item::from(fx.message([]))));
        assert_eq!(
            crate::get_new(&msg, "map.int32_to_string.twelve"),
            Err(PatchError::not_found(NotFoundKind::Key, "twelve").in_path("map.int32_to_string"))
        );
    }

    #[test]
    fn reads_keep_the_tree() {
        let fx = Fixture::new();
        let msg = fx.message([("list", fx.list([]).into())]);
        let before = msg.clone();
        let setup = Setup::new();

        let _ = setup.get(&msg, "message.message.list.string");
        let _ = setup.get(&msg, "optional_int32");
        let _ = setup.get_new(&msg, "list.message.0.map");
        assert_eq!(msg, before);
    }

    #[test]
    fn get_mut_materializes_the_way() {
        let fx = Fixture::new();
        let mut msg = fx.message([]);

        if let Ok(value) = crate::get_mut(&mut msg, "message.optional_int32") {
            *value = Value::I32(9);
        }
        assert_eq!(crate::get(&msg, "message.optional_int32"), Ok(Item::from(9)));

        assert!(matches!(crate::get_mut(&mut msg, "list"), Ok(Value::Message(_))));
        assert_eq!(
            crate::get_mut(&mut msg, "list.string.0").map(|v| v.clone()),
            Err(PatchError::not_found(NotFoundKind::Index, "0").in_path("list.string"))
        );
        assert_eq!(
            crate::get_mut(&mut msg, "").map(|v| v.clone()),
            Err(PatchError::not_found(NotFoundKind::Field, ""))
        );
    }
}
