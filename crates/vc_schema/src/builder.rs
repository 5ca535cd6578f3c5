use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use crate::descriptor::{EnumData, FieldData, MessageData, SchemaData, TypeRepr};
use crate::hash::{HashMap, new_map};
use crate::{Cardinality, MapKeyKind, Schema, SchemaError};

// -----------------------------------------------------------------------------
// FieldType

/// The declared type of a field, with message and enum types named by their
/// full name. Names are resolved by [`SchemaBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    Enum(String),
    Message(String),
}

impl FieldType {
    /// A reference to the message type called `full_name`.
    #[inline]
    pub fn message(full_name: impl Into<String>) -> Self {
        FieldType::Message(full_name.into())
    }

    /// A reference to the enum type called `full_name`.
    #[inline]
    pub fn enumeration(full_name: impl Into<String>) -> Self {
        FieldType::Enum(full_name.into())
    }
}

// -----------------------------------------------------------------------------
// FieldBuilder

/// Declares one field of a [`MessageBuilder`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    json_name: Option<String>,
    number: u32,
    ty: FieldType,
    cardinality: Cardinality,
}

impl FieldBuilder {
    /// A singular field with implicit presence.
    pub fn new(name: impl Into<String>, number: u32, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            json_name: None,
            number,
            ty,
            cardinality: Cardinality::Singular,
        }
    }

    /// Gives the field explicit presence.
    #[inline]
    pub fn optional(mut self) -> Self {
        self.cardinality = Cardinality::Optional;
        self
    }

    /// Turns the field into a list of its type.
    #[inline]
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Turns the field into a map from `key` to its type.
    #[inline]
    pub fn map(mut self, key: MapKeyKind) -> Self {
        self.cardinality = Cardinality::Map(key);
        self
    }

    /// Overrides the JSON name derived from the field name.
    #[inline]
    pub fn json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = Some(json_name.into());
        self
    }
}

// -----------------------------------------------------------------------------
// MessageBuilder

/// Declares a message type of a [`SchemaBuilder`].
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    full_name: String,
    fields: Vec<(FieldBuilder, Option<usize>)>,
    oneofs: Vec<String>,
}

impl MessageBuilder {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
            oneofs: Vec::new(),
        }
    }

    /// Adds a field.
    #[inline]
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push((field, None));
        self
    }

    /// Adds a oneof group: at most one of `fields` is set at any time.
    pub fn oneof(
        mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldBuilder>,
    ) -> Self {
        let index = self.oneofs.len();
        self.oneofs.push(name.into());
        self.fields
            .extend(fields.into_iter().map(|field| (field, Some(index))));
        self
    }
}

// -----------------------------------------------------------------------------
// EnumBuilder

/// Declares an enum type of a [`SchemaBuilder`].
#[derive(Debug, Clone)]
pub struct EnumBuilder {
    full_name: String,
    values: Vec<(String, i32)>,
}

impl EnumBuilder {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            values: Vec::new(),
        }
    }

    /// Adds a value. The first value is the default.
    #[inline]
    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push((name.into(), number));
        self
    }
}

// -----------------------------------------------------------------------------
// SchemaBuilder

/// Collects type declarations and resolves them into a [`Schema`].
///
/// # Examples
///
/// ```
/// use vc_schema::{EnumBuilder, FieldBuilder, FieldType, MapKeyKind, MessageBuilder, Schema};
///
/// let schema = Schema::builder()
///     .enumeration(EnumBuilder::new("demo.Color").value("RED", 0).value("BLUE", 1))
///     .message(
///         MessageBuilder::new("demo.Palette")
///             .field(FieldBuilder::new("named", 1, FieldType::enumeration("demo.Color")).map(MapKeyKind::String)),
///     )
///     .build()
///     .unwrap();
///
/// let named = schema.message_by_name("demo.Palette").unwrap().field_by_name("named").unwrap();
/// assert!(named.is_map());
/// assert_eq!(named.json_name(), "named");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    messages: Vec<MessageBuilder>,
    enums: Vec<EnumBuilder>,
}

impl SchemaBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message type.
    #[inline]
    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds an enum type.
    #[inline]
    pub fn enumeration(mut self, enumeration: EnumBuilder) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Resolves type references and validates every declaration.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut message_index: HashMap<String, usize> = new_map();
        let mut enum_index: HashMap<String, usize> = new_map();

        for (index, message) in self.messages.iter().enumerate() {
            if message_index.insert(message.full_name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateType(message.full_name.clone()));
            }
        }
        for (index, enumeration) in self.enums.iter().enumerate() {
            if message_index.contains_key(&enumeration.full_name)
                || enum_index.insert(enumeration.full_name.clone(), index).is_some()
            {
                return Err(SchemaError::DuplicateType(enumeration.full_name.clone()));
            }
        }

        let enums = self
            .enums
            .into_iter()
            .map(|enumeration| {
                if enumeration.values.is_empty() {
                    return Err(SchemaError::EmptyEnum(enumeration.full_name));
                }
                Ok(EnumData {
                    full_name: enumeration.full_name,
                    values: enumeration.values,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let messages = self
            .messages
            .into_iter()
            .map(|message| build_message(message, &message_index, &enum_index))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "built schema with {} message and {} enum types",
            messages.len(),
            enums.len()
        );

        Ok(Schema::from_data(SchemaData {
            messages,
            enums,
            message_index,
            enum_index,
        }))
    }
}

fn build_message(
    message: MessageBuilder,
    message_index: &HashMap<String, usize>,
    enum_index: &HashMap<String, usize>,
) -> Result<MessageData, SchemaError> {
    let mut by_name: HashMap<String, usize> = new_map();
    let mut by_json_name: HashMap<String, usize> = new_map();
    let mut by_number: HashMap<u32, usize> = new_map();
    let mut fields = Vec::with_capacity(message.fields.len());

    for (index, (field, oneof)) in message.fields.into_iter().enumerate() {
        if field.number == 0 {
            return Err(SchemaError::InvalidFieldNumber { field: field.name });
        }
        if oneof.is_some() && field.cardinality != Cardinality::Singular {
            return Err(SchemaError::InvalidOneofMember { field: field.name });
        }

        let ty = resolve_type(&field.name, field.ty, message_index, enum_index)?;
        let json_name = field.json_name.unwrap_or_else(|| json_name_of(&field.name));

        let duplicate_name = |name: &str| SchemaError::DuplicateFieldName {
            message: message.full_name.clone(),
            field: name.to_owned(),
        };
        if by_name.insert(field.name.clone(), index).is_some() {
            return Err(duplicate_name(&field.name));
        }
        // A JSON name may coincide with its own field name, not with another one.
        match by_json_name.insert(json_name.clone(), index) {
            Some(other) if other != index => return Err(duplicate_name(&json_name)),
            _ => {}
        }
        if by_name.get(&json_name).is_some_and(|&other| other != index) {
            return Err(duplicate_name(&json_name));
        }
        if by_number.insert(field.number, index).is_some() {
            return Err(SchemaError::DuplicateFieldNumber {
                message: message.full_name.clone(),
                number: field.number,
            });
        }

        fields.push(FieldData {
            name: field.name,
            json_name,
            number: field.number,
            ty,
            cardinality: field.cardinality,
            oneof,
        });
    }

    Ok(MessageData {
        full_name: message.full_name,
        fields,
        oneofs: message.oneofs,
        by_name,
        by_json_name,
        by_number,
    })
}

fn resolve_type(
    field: &str,
    ty: FieldType,
    message_index: &HashMap<String, usize>,
    enum_index: &HashMap<String, usize>,
) -> Result<TypeRepr, SchemaError> {
    let unknown = |type_name: String| SchemaError::UnknownType {
        field: field.to_owned(),
        type_name,
    };
    Ok(match ty {
        FieldType::Bool => TypeRepr::Bool,
        FieldType::Int32 => TypeRepr::Int32,
        FieldType::Int64 => TypeRepr::Int64,
        FieldType::Uint32 => TypeRepr::Uint32,
        FieldType::Uint64 => TypeRepr::Uint64,
        FieldType::Float => TypeRepr::Float,
        FieldType::Double => TypeRepr::Double,
        FieldType::String => TypeRepr::String,
        FieldType::Bytes => TypeRepr::Bytes,
        FieldType::Enum(name) => match enum_index.get(&name) {
            Some(&index) => TypeRepr::Enum(index),
            None => return Err(unknown(name)),
        },
        FieldType::Message(name) => match message_index.get(&name) {
            Some(&index) => TypeRepr::Message(index),
            None => return Err(unknown(name)),
        },
    })
}

/// lowerCamelCase: underscores are dropped and the following letter is
/// upper-cased.
fn json_name_of(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{EnumBuilder, FieldBuilder, FieldType, MessageBuilder, SchemaBuilder, json_name_of};
    use crate::{Cardinality, Kind, MapKeyKind, SchemaError};

    #[test]
    fn json_names() {
        assert_eq!(json_name_of("string"), "string");
        assert_eq!(json_name_of("string_to_string"), "stringToString");
        assert_eq!(json_name_of("a__b"), "aB");
        assert_eq!(json_name_of("trailing_"), "trailing");
    }

    #[test]
    fn recursive_types_resolve() {
        let schema = SchemaBuilder::new()
            .message(
                MessageBuilder::new("t.Tree")
                    .field(FieldBuilder::new("child", 1, FieldType::message("t.Tree")))
                    .field(
                        FieldBuilder::new("forest", 2, FieldType::message("t.Tree"))
                            .map(MapKeyKind::String),
                    ),
            )
            .build()
            .unwrap();

        let tree = schema.message_by_name("t.Tree").unwrap();
        let child = tree.field_by_name("child").unwrap();
        assert_eq!(child.kind(), Kind::Message(tree.clone()));
        assert!(child.has_presence());

        let forest = tree.field_by_number(2).unwrap();
        assert_eq!(forest.cardinality(), Cardinality::Map(MapKeyKind::String));
        assert!(!forest.has_presence());
        assert_eq!(forest.kind(), Kind::Message(tree));
    }

    #[test]
    fn descriptors_of_distinct_schemas_differ() {
        let build = || {
            SchemaBuilder::new()
                .message(MessageBuilder::new("t.M"))
                .build()
                .unwrap()
        };
        let (a, b) = (build(), build());
        assert_eq!(a.message_by_name("t.M"), a.message_by_name("t.M"));
        assert_ne!(a.message_by_name("t.M"), b.message_by_name("t.M"));
    }

    #[test]
    fn oneof_members_have_presence() {
        let schema = SchemaBuilder::new()
            .message(MessageBuilder::new("t.M").oneof(
                "choice",
                [
                    FieldBuilder::new("a", 1, FieldType::String),
                    FieldBuilder::new("b", 2, FieldType::Int32),
                ],
            ))
            .build()
            .unwrap();

        let m = schema.message_by_name("t.M").unwrap();
        let a = m.field_by_name("a").unwrap();
        assert!(a.has_presence());
        assert_eq!(a.containing_oneof(), Some("choice"));
        assert_eq!(m.oneofs().collect::<alloc::vec::Vec<_>>(), ["choice"]);
    }

    #[test]
    fn build_failures() {
        let err = SchemaBuilder::new()
            .message(MessageBuilder::new("t.M").field(FieldBuilder::new(
                "x",
                1,
                FieldType::message("t.Missing"),
            )))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));

        let err = SchemaBuilder::new()
            .message(
                MessageBuilder::new("t.M")
                    .field(FieldBuilder::new("x", 1, FieldType::Bool))
                    .field(FieldBuilder::new("y", 1, FieldType::Bool)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldNumber { number: 1, .. }));

        let err = SchemaBuilder::new()
            .message(
                MessageBuilder::new("t.M")
                    .field(FieldBuilder::new("a_b", 1, FieldType::Bool))
                    .field(FieldBuilder::new("aB", 2, FieldType::Bool)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));

        let err = SchemaBuilder::new()
            .message(MessageBuilder::new("t.M"))
            .enumeration(EnumBuilder::new("t.M").value("A", 0))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("t.M".into()));

        let err = SchemaBuilder::new()
            .message(MessageBuilder::new("t.M").oneof(
                "o",
                [FieldBuilder::new("x", 1, FieldType::Bool).repeated()],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOneofMember { .. }));
    }
}
