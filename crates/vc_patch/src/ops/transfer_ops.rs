use vc_schema::{DynamicMessage, Value};

use crate::access::within;
use crate::{Item, Path, PatchError, RecordContainer, Setup};

impl Setup {
    /// Writes a copy of the slot at `source` to `target`.
    ///
    /// The empty `source` copies the whole root. Copying a slot onto itself
    /// only checks that it can be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_patch::Item;
    /// # use vc_schema::{DynamicMessage, FieldBuilder, FieldType, MessageBuilder, Schema, Value};
    /// # let schema = Schema::builder()
    /// #     .message(
    /// #         MessageBuilder::new("demo.Pair")
    /// #             .field(FieldBuilder::new("left", 1, FieldType::String))
    /// #             .field(FieldBuilder::new("right", 2, FieldType::String)),
    /// #     )
    /// #     .build()
    /// #     .unwrap();
    /// # let pair = schema.message_by_name("demo.Pair").unwrap();
    /// let mut root = DynamicMessage::new(pair);
    /// vc_patch::set(&mut root, "left", "l").unwrap();
    ///
    /// vc_patch::copy(&mut root, "right", "left").unwrap();
    /// assert_eq!(vc_patch::get(&root, "right"), Ok(Item::from("l")));
    ///
    /// vc_patch::swap(&mut root, "left", "right").unwrap();
    /// vc_patch::relocate(&mut root, "right", "left").unwrap();
    /// assert_eq!(vc_patch::get(&root, "left"), Ok(Item::from("")));
    /// assert_eq!(vc_patch::get(&root, "right"), Ok(Item::from("l")));
    /// ```
    pub fn copy(
        &self,
        root: &mut DynamicMessage,
        target: &str,
        source: &str,
    ) -> Result<(), PatchError> {
        if target == source {
            return self.set_to_itself(root, Path::new(target));
        }
        let value = self.get_copy(root, source)?;
        self.assign(root, Path::new(target), Some(value))
    }

    /// Moves the slot at `source` to `target`, leaving `source` unset.
    ///
    /// This is not atomic: if `source` can not be cleared once `target` was
    /// written, `target` is written back to its previous value and the
    /// clearing error is returned. A failure of that restore is only logged.
    pub fn relocate(
        &self,
        root: &mut DynamicMessage,
        target: &str,
        source: &str,
    ) -> Result<(), PatchError> {
        if target == source {
            return self.set_to_itself(root, Path::new(target));
        }
        let (target, source) = (Path::new(target), Path::new(source));
        let moved = self.snapshot(root, source)?;
        let previous = self.snapshot(root, target)?;

        self.assign(root, target, moved)?;
        if let Err(err) = self.assign(root, source, None) {
            self.restore(root, target, previous);
            return Err(err);
        }
        Ok(())
    }

    /// Exchanges the slots at `first` and `second`.
    ///
    /// When one side is the empty path only the other side is written, as
    /// replacing the root already moves the other value into place. Like
    /// [`relocate`](Self::relocate) this is not atomic: on failure both slots
    /// are written back to their previous values, logging restore failures.
    pub fn swap(
        &self,
        root: &mut DynamicMessage,
        first: &str,
        second: &str,
    ) -> Result<(), PatchError> {
        if first == second {
            return self.set_to_itself(root, Path::new(first));
        }
        let (first, second) = (Path::new(first), Path::new(second));
        let first_value = self.snapshot(root, first)?;
        let second_value = self.snapshot(root, second)?;

        let exchanged = self.exchange(root, (first, &first_value), (second, &second_value));
        if let Err(err) = exchanged {
            self.restore(root, first, first_value);
            self.restore(root, second, second_value);
            return Err(err);
        }
        Ok(())
    }

    fn exchange(
        &self,
        root: &mut DynamicMessage,
        (first, first_value): (Path<'_>, &Option<Item>),
        (second, second_value): (Path<'_>, &Option<Item>),
    ) -> Result<(), PatchError> {
        if !second.is_root() {
            self.assign(root, first, second_value.clone())?;
        }
        if !first.is_root() {
            self.assign(root, second, first_value.clone())?;
        }
        Ok(())
    }

    /// A detached copy of the slot at `path`, `None` if it is unset so
    /// that writing the snapshot back unsets it again.
    ///
    /// The slot must exist: list indexes must be in range and map keys
    /// must be present.
    fn snapshot(&self, root: &DynamicMessage, path: Path<'_>) -> Result<Option<Item>, PatchError> {
        if path.is_root() {
            return Ok(Some(Item::Value(Value::Message(root.clone()))));
        }
        let (parent, last) = self.parent(RecordContainer::shared(root).boxed(), path)?;
        let value = parent.get_copy(last.value()).map_err(|err| within(err, &last))?;
        Ok(parent.is_present(last.value()).then_some(value))
    }

    /// Best effort compensation; the error being reported is the one that
    /// triggered it.
    fn restore(&self, root: &mut DynamicMessage, path: Path<'_>, value: Option<Item>) {
        if let Err(err) = self.assign(root, path, value) {
            log::warn!("failed to restore \"{path}\" after a failed transfer: {err}");
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use vc_schema::{DynamicMessage, Value};

    use crate::testing::{Fixture, entries};
    use crate::{
        Container, ContainerTransformer, Item, NotFoundKind, Operation, PatchError, Setup,
        Transformed,
    };

    fn set_mismatch() -> PatchError {
        PatchError::operation_failed(Operation::Set, PatchError::MismatchingType)
    }

    fn sample(fx: &Fixture) -> DynamicMessage {
        fx.message([
            ("string", Value::from("s")),
            ("int32", Value::I32(3)),
            ("message", fx.message([("string", Value::from("inner")), ("int32", Value::I32(7))]).into()),
            ("list", fx.list([("string", Value::from(vec!["a", "b", "c"]))]).into()),
            ("map", fx.map([("string_to_string", entries([("k", "v")]))]).into()),
        ])
    }

    #[test]
    fn self_transfers_keep_the_tree() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let before = msg.clone();

        for path in ["", "string", "message", "message.int32", "list.string.1", "map.string_to_string.k", "optional_int32"] {
            assert_eq!(crate::copy(&mut msg, path, path), Ok(()), "{path}");
            assert_eq!(crate::relocate(&mut msg, path, path), Ok(()), "{path}");
            assert_eq!(crate::swap(&mut msg, path, path), Ok(()), "{path}");
        }
        assert_eq!(msg, before);
    }

    #[test]
    fn copies_values() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);

        assert_eq!(crate::copy(&mut msg, "message.string", "string"), Ok(()));
        assert_eq!(crate::copy(&mut msg, "list.string.0", "map.string_to_string.k"), Ok(()));
        assert_eq!(crate::copy(&mut msg, "map.string_to_string.l", "list.string.-1"), Ok(()));
        assert_eq!(crate::get(&msg, "message.string"), Ok(Item::from("s")));
        assert_eq!(crate::get(&msg, "list.string.0"), Ok(Item::from("v")));
        assert_eq!(crate::get(&msg, "map.string_to_string.l"), Ok(Item::from("c")));
        assert_eq!(crate::get(&msg, "string"), Ok(Item::from("s")));
    }

    #[test]
    fn copies_are_deep() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);

        assert_eq!(crate::copy(&mut msg, "message.message", "message"), Ok(()));
        assert_eq!(crate::set(&mut msg, "message.message.string", "changed"), Ok(()));
        assert_eq!(crate::get(&msg, "message.string"), Ok(Item::from("inner")));

        assert_eq!(crate::copy(&mut msg, "message", ""), Ok(()));
        assert_eq!(crate::get(&msg, "message.message.string"), Ok(Item::from("inner")));
        assert_eq!(crate::get(&msg, "message.list.string.2"), Ok(Item::from("c")));
    }

    #[test]
    fn copy_errors() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let before = msg.clone();

        assert_eq!(
            crate::copy(&mut msg, "string", "unknown"),
            Err(PatchError::not_found(NotFoundKind::Field, "unknown"))
        );
        assert_eq!(
            crate::copy(&mut msg, "string", "list.string.7"),
            Err(PatchError::not_found(NotFoundKind::Index, "7").in_path("list.string"))
        );
        assert_eq!(crate::copy(&mut msg, "int32", "string"), Err(set_mismatch().in_path("int32")));
        assert_eq!(crate::copy(&mut msg, "", "message.list"), Err(set_mismatch()));
        assert_eq!(msg, before);
    }

    #[test]
    fn moves_values() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);

        assert_eq!(crate::relocate(&mut msg, "message.string", "string"), Ok(()));
        assert_eq!(crate::get(&msg, "message.string"), Ok(Item::from("s")));
        assert_eq!(crate::get(&msg, "string"), Ok(Item::from("")));

        assert_eq!(crate::relocate(&mut msg, "map.string_to_string.k", "list.string.0"), Ok(()));
        assert_eq!(crate::get(&msg, "map.string_to_string.k"), Ok(Item::from("a")));
        assert_eq!(crate::get(&msg, "list.string.0"), Ok(Item::from("b")));

        assert_eq!(crate::relocate(&mut msg, "list", "message.list"), Ok(()));
        assert_eq!(crate::get(&msg, "list"), Ok(Item::from(fx.list([]))));
    }

    #[test]
    fn moving_unset_slots_unsets_the_target() {
        let fx = Fixture::new();
        let mut msg = fx.message([("optional_int32", Value::I32(5)), ("message", fx.message([]).into())]);

        assert_eq!(crate::relocate(&mut msg, "optional_int32", "message.optional_int32"), Ok(()));
        assert_eq!(msg, fx.message([("message", fx.message([]).into())]));
    }

    #[test]
    fn move_restores_the_target_when_the_source_cannot_be_cleared() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let before = msg.clone();

        // `oneof` is unset, so everything below it is read-only.
        let err = crate::relocate(&mut msg, "string", "oneof.string");
        assert_eq!(err, Err(PatchError::MutationOfReadOnlyValue.in_path("oneof")));
        assert_eq!(msg, before);
    }

    #[test]
    fn failed_move_leaves_the_tree_untouched() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let before = msg.clone();

        assert_eq!(crate::relocate(&mut msg, "int32", "string"), Err(set_mismatch().in_path("int32")));
        assert_eq!(
            crate::relocate(&mut msg, "list.string.9", "string"),
            Err(PatchError::not_found(NotFoundKind::Index, "9").in_path("list.string"))
        );
        assert_eq!(
            crate::relocate(&mut msg, "map.string_to_string.new", "string"),
            Err(PatchError::not_found(NotFoundKind::Key, "new").in_path("map.string_to_string"))
        );
        assert_eq!(msg, before);
    }

    #[test]
    fn swaps_values() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let before = msg.clone();

        assert_eq!(crate::swap(&mut msg, "string", "message.string"), Ok(()));
        assert_eq!(crate::get(&msg, "string"), Ok(Item::from("inner")));
        assert_eq!(crate::get(&msg, "message.string"), Ok(Item::from("s")));
        assert_eq!(crate::swap(&mut msg, "string", "message.string"), Ok(()));
        assert_eq!(msg, before);

        assert_eq!(crate::swap(&mut msg, "list.string.0", "list.string.-1"), Ok(()));
        assert_eq!(crate::get(&msg, "list"), crate::get(&fx.with_strings(&["c", "b", "a"]), "list"));
    }

    #[test]
    fn swaps_with_unset_slots() {
        let fx = Fixture::new();
        let mut msg = fx.message([("optional_int32", Value::I32(0)), ("message", fx.message([]).into())]);

        assert_eq!(crate::swap(&mut msg, "optional_int32", "message.optional_int32"), Ok(()));
        assert_eq!(
            msg,
            fx.message([("message", fx.message([("optional_int32", Value::I32(0))]).into())])
        );
    }

    #[test]
    fn swapping_with_the_root_writes_once() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let inner = fx.message([("string", Value::from("inner")), ("int32", Value::I32(7))]);

        assert_eq!(crate::swap(&mut msg, "", "message"), Ok(()));
        assert_eq!(msg, inner);
    }

    #[test]
    fn failed_swap_rolls_back() {
        let fx = Fixture::new();
        let mut msg = sample(&fx);
        let before = msg.clone();

        assert_eq!(crate::swap(&mut msg, "string", "int32"), Err(set_mismatch().in_path("string")));
        assert_eq!(msg, before);

        // The first write succeeds, the second one is rejected.
        assert_eq!(
            crate::swap(&mut msg, "message.string", "oneof.string"),
            Err(PatchError::MutationOfReadOnlyValue.in_path("oneof"))
        );
        assert_eq!(msg, before);
    }

    /// Refuses records whose `display_name` is "stop".
    struct Tripwire;

    impl ContainerTransformer for Tripwire {
        fn transform<'a>(
            &self,
            container: Box<dyn Container<'a> + 'a>,
        ) -> Result<Transformed<'a>, PatchError> {
            if container.get("display_name") == Ok(Item::from("stop")) {
                return Err(PatchError::conversion("tripped"));
            }
            Ok(Transformed::Declined(container))
        }
    }

    #[test]
    fn failed_restores_are_swallowed() {
        let fx = Fixture::new();
        let mut msg = fx.with_strings(&["stop"]);
        let setup = Setup::new().with_container_transformation(Tripwire);

        // Once the target is written every walk from the root trips,
        // clearing the source and restoring the target alike.
        let err = setup.relocate(&mut msg, "display_name", "list.string.0");
        assert_eq!(err, Err(PatchError::conversion("tripped")));
        assert_eq!(crate::get(&msg, "display_name"), Ok(Item::from("stop")));
        assert_eq!(crate::get(&msg, "list.string.0"), Ok(Item::from("stop")));
    }
}
