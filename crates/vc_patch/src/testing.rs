//! Test schema shared by the unit tests of this crate.

use alloc::vec::Vec;

use vc_schema::{
    DynamicMessage, EnumBuilder, FieldBuilder, FieldType, MapKey, MapKeyKind, MessageBuilder,
    MessageDescriptor, Schema, Value,
};

/// The test schema.
///
/// Descriptors of two fixtures never compare equal, so every tree of one
/// test must be built from the same fixture.
pub(crate) struct Fixture {
    pub schema: Schema,
    pub message: MessageDescriptor,
    pub list: MessageDescriptor,
    pub map: MessageDescriptor,
    pub oneof: MessageDescriptor,
}

impl Fixture {
    pub fn new() -> Self {
        let message = MessageBuilder::new("test.TestMessage")
            .field(FieldBuilder::new("string", 1, FieldType::String))
            .field(FieldBuilder::new("message", 2, FieldType::message("test.TestMessage")))
            .field(FieldBuilder::new("list", 3, FieldType::message("test.TestList")))
            .field(FieldBuilder::new("map", 4, FieldType::message("test.TestMap")))
            .field(FieldBuilder::new("int32", 5, FieldType::Int32))
            .field(FieldBuilder::new("optional_int32", 6, FieldType::Int32).optional())
            .field(FieldBuilder::new("bytes", 7, FieldType::Bytes))
            .field(FieldBuilder::new("color", 8, FieldType::enumeration("test.Color")))
            .field(FieldBuilder::new("oneof", 9, FieldType::message("test.TestOneof")))
            .field(FieldBuilder::new("double", 10, FieldType::Double))
            .field(FieldBuilder::new("display_name", 11, FieldType::String))
            .field(FieldBuilder::new("uint64", 12, FieldType::Uint64))
            .field(FieldBuilder::new("bool", 13, FieldType::Bool));
        let list = MessageBuilder::new("test.TestList")
            .field(FieldBuilder::new("string", 1, FieldType::String).repeated())
            .field(FieldBuilder::new("message", 2, FieldType::message("test.TestMessage")).repeated())
            .field(FieldBuilder::new("int32", 3, FieldType::Int32).repeated());
        let map = MessageBuilder::new("test.TestMap")
            .field(FieldBuilder::new("string_to_string", 1, FieldType::String).map(MapKeyKind::String))
            .field(
                FieldBuilder::new("string_to_message", 2, FieldType::message("test.TestMessage"))
                    .map(MapKeyKind::String),
            )
            .field(FieldBuilder::new("int32_to_string", 3, FieldType::String).map(MapKeyKind::Int32))
            .field(FieldBuilder::new("bool_to_string", 4, FieldType::String).map(MapKeyKind::Bool));
        let oneof = MessageBuilder::new("test.TestOneof").oneof(
            "choice",
            [
                FieldBuilder::new("string", 1, FieldType::String),
                FieldBuilder::new("message", 2, FieldType::message("test.TestMessage")),
                FieldBuilder::new("int32", 3, FieldType::Int32),
            ],
        );
        let color = EnumBuilder::new("test.Color")
            .value("COLOR_UNSPECIFIED", 0)
            .value("RED", 1)
            .value("GREEN", 2);

        let schema = Schema::builder()
            .message(message)
            .message(list)
            .message(map)
            .message(oneof)
            .enumeration(color)
            .build()
            .expect("test schema is valid");
        let lookup = |name: &str| schema.message_by_name(name).expect("declared above");
        Self {
            message: lookup("test.TestMessage"),
            list: lookup("test.TestList"),
            map: lookup("test.TestMap"),
            oneof: lookup("test.TestOneof"),
            schema,
        }
    }

    /// A `test.TestMessage` with the given fields set.
    pub fn message<'a>(&self, fields: impl IntoIterator<Item = (&'a str, Value)>) -> DynamicMessage {
        build(&self.message, fields)
    }

    /// A `test.TestList` with the given fields set.
    pub fn list<'a>(&self, fields: impl IntoIterator<Item = (&'a str, Value)>) -> DynamicMessage {
        build(&self.list, fields)
    }

    /// A `test.TestMap` with the given fields set.
    pub fn map<'a>(&self, fields: impl IntoIterator<Item = (&'a str, Value)>) -> DynamicMessage {
        build(&self.map, fields)
    }

    /// A `test.TestOneof` with the given fields set.
    pub fn oneof<'a>(&self, fields: impl IntoIterator<Item = (&'a str, Value)>) -> DynamicMessage {
        build(&self.oneof, fields)
    }

    /// A `test.TestMessage` holding only `list.string`.
    pub fn with_strings(&self, items: &[&str]) -> DynamicMessage {
        let strings = items.iter().copied().map(Value::from).collect::<Vec<_>>();
        self.message([("list", self.list([("string", Value::List(strings))]).into())])
    }
}

/// An instance of `desc` with the given fields set.
pub(crate) fn build<'a>(
    desc: &MessageDescriptor,
    fields: impl IntoIterator<Item = (&'a str, Value)>,
) -> DynamicMessage {
    let mut msg = DynamicMessage::new(desc.clone());
    for (name, value) in fields {
        let field = desc.resolve_field(name).expect("field exists");
        msg.set(&field, value).expect("value matches field");
    }
    msg
}

/// A map value from `(key, value)` pairs.
pub(crate) fn entries<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Value
where
    K: Into<MapKey>,
    V: Into<Value>,
{
    Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
}
