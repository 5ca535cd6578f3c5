use core::mem::discriminant;

use vc_schema::Value;

use crate::{Converter, Item, PatchError};

// -----------------------------------------------------------------------------
// IdentityConverter

/// Passes values through unchanged when they already have the destination
/// type. It is always the last step of [`Setup::convert`](crate::Setup::convert).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    fn convert(&self, to: &Item, from: &Item) -> Result<Option<Item>, PatchError> {
        if is_same_type(to, from) {
            Ok(Some(from.clone()))
        } else {
            Err(PatchError::NoConversionDefined)
        }
    }
}

/// Returns `true` if `from` can be stored where `to` came from as is.
///
/// Native collections are compared by their first elements; empty ones fit
/// any collection of the same kind.
///
/// # Examples
///
/// ```
/// use vc_patch::{is_same_type, Item};
///
/// assert!(is_same_type(&Item::from(0), &Item::from(5)));
/// assert!(!is_same_type(&Item::from(0), &Item::from(5_i64)));
/// assert!(is_same_type(&Item::from(vec!["a"]), &Item::from(Vec::<String>::new())));
/// ```
pub fn is_same_type(to: &Item, from: &Item) -> bool {
    match (to, from) {
        (Item::Value(to), Item::Value(from)) => same_value_type(to, from),
        (Item::List(to), Item::List(from)) => to.field().is_shape_of(from.field()),
        (Item::Map(to), Item::Map(from)) => to.field().is_shape_of(from.field()),
        (Item::List(to), Item::Value(value @ Value::List(_))) => to.field().accepts(value),
        (Item::Map(to), Item::Value(value @ Value::Map(_))) => to.field().accepts(value),
        (Item::Value(value @ Value::List(_)), Item::List(from)) => from.field().accepts(value),
        (Item::Value(value @ Value::Map(_)), Item::Map(from)) => from.field().accepts(value),
        (Item::Opaque(to), Item::Opaque(from)) => to.value_type_id() == from.value_type_id(),
        _ => false,
    }
}

fn same_value_type(to: &Value, from: &Value) -> bool {
    match (to, from) {
        (Value::Message(to), Value::Message(from)) => to.descriptor() == from.descriptor(),
        (Value::List(to), Value::List(from)) => match (to.first(), from.first()) {
            (Some(to), Some(from)) => same_value_type(to, from),
            _ => true,
        },
        (Value::Map(to), Value::Map(from)) => {
            match (to.first_key_value(), from.first_key_value()) {
                (Some((tk, tv)), Some((fk, fv))) => tk.kind() == fk.kind() && same_value_type(tv, fv),
                _ => true,
            }
        }
        _ => discriminant(to) == discriminant(from),
    }
}

// -----------------------------------------------------------------------------
// Tests
