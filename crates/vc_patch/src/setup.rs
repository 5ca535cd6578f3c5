//! Per-call configuration of the path operators.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::convert::IdentityConverter;
use crate::{Container, Item, PatchError};

// -----------------------------------------------------------------------------
// Converter

/// Turns a value into one assignable to a destination slot.
///
/// `to` is a zero value shaped like the destination (see
/// [`Container::get_new`]). A converter that does not handle the pair returns
/// [`PatchError::NoConversionDefined`] so that the next one is tried.
/// Returning `Ok(None)` clears the destination instead of writing it.
///
/// Closures with the same signature are converters.
///
/// # Examples
///
/// ```
/// use vc_patch::{Converter, Item, PatchError};
/// use vc_schema::Value;
///
/// // Writes integers into string slots.
/// let stringify = |to: &Item, from: &Item| match (to, from) {
///     (Item::Value(Value::String(_)), Item::Value(Value::I64(n))) => Ok(Some(Item::from(n.to_string()))),
///     _ => Err(PatchError::NoConversionDefined),
/// };
///
/// let converted = stringify.convert(&Item::from(""), &Item::from(7_i64));
/// assert_eq!(converted, Ok(Some(Item::from("7"))));
/// ```
pub trait Converter {
    fn convert(&self, to: &Item, from: &Item) -> Result<Option<Item>, PatchError>;
}

impl<F> Converter for F
where
    F: Fn(&Item, &Item) -> Result<Option<Item>, PatchError>,
{
    #[inline]
    fn convert(&self, to: &Item, from: &Item) -> Result<Option<Item>, PatchError> {
        self(to, from)
    }
}

// -----------------------------------------------------------------------------
// ContainerTransformer

/// The outcome of a [`ContainerTransformer`].
pub enum Transformed<'a> {
    /// The container to use from now on.
    Replaced(Box<dyn Container<'a> + 'a>),
    /// The transformer does not apply; the original container is handed back.
    Declined(Box<dyn Container<'a> + 'a>),
}

/// Replaces containers right after they are reached by a path walk.
///
/// Transformers run on the root container and after every descent, in
/// registration order, until one returns [`Transformed::Replaced`].
pub trait ContainerTransformer {
    fn transform<'a>(
        &self,
        container: Box<dyn Container<'a> + 'a>,
    ) -> Result<Transformed<'a>, PatchError>;
}

// -----------------------------------------------------------------------------
// Setup

/// Ordered converters and container transformers used by the operators.
///
/// Every operator is available as a method; the crate-level functions run
/// them with `Setup::default()`.
///
/// # Examples
///
/// ```
/// use vc_patch::{Item, PatchError, Setup};
/// use vc_schema::Value;
///
/// let setup = Setup::new().with_conversion(|to: &Item, from: &Item| match (to, from) {
///     (Item::Value(Value::I32(_)), Item::Value(Value::I64(n))) => i32::try_from(*n)
///         .map(|n| Some(Item::from(n)))
///         .map_err(|_| PatchError::conversion("out of range")),
///     _ => Err(PatchError::NoConversionDefined),
/// });
///
/// assert_eq!(setup.convert(&Item::from(0), &Item::from(5_i64)), Ok(Some(Item::from(5))));
/// assert_eq!(setup.convert(&Item::from(0), &Item::from(9)), Ok(Some(Item::from(9))));
/// assert_eq!(setup.convert(&Item::from(0), &Item::from("9")), Err(PatchError::NoConversionDefined));
/// ```
#[derive(Default)]
pub struct Setup {
    converters: Vec<Box<dyn Converter>>,
    transformers: Vec<Box<dyn ContainerTransformer>>,
}

impl Setup {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a converter after the ones already registered.
    pub fn with_conversion(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Adds several converters after the ones already registered.
    pub fn with_conversions(
        mut self,
        converters: impl IntoIterator<Item = Box<dyn Converter>>,
    ) -> Self {
        self.converters.extend(converters);
        self
    }

    /// Adds a container transformer after the ones already registered.
    pub fn with_container_transformation(
        mut self,
        transformer: impl ContainerTransformer + 'static,
    ) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Adds several container transformers after the ones already registered.
    pub fn with_container_transformations(
        mut self,
        transformers: impl IntoIterator<Item = Box<dyn ContainerTransformer>>,
    ) -> Self {
        self.transformers.extend(transformers);
        self
    }

    /// Runs the conversion chain: the registered converters in order, then
    /// the identity check.
    ///
    /// Returns [`PatchError::NoConversionDefined`] if nothing claims the pair.
    pub fn convert(&self, to: &Item, from: &Item) -> Result<Option<Item>, PatchError> {
        for (index, converter) in self.converters.iter().enumerate() {
            match converter.convert(to, from) {
                Err(PatchError::NoConversionDefined) => continue,
                Ok(converted) => {
                    log::debug!("converter #{index} claimed a value");
                    return Ok(converted);
                }
                Err(err) => return Err(err),
            }
        }
        IdentityConverter.convert(to, from)
    }

    /// Like [`convert`](Self::convert), but passes unclaimed values through
    /// unchanged. The destination container checks their type.
    pub(crate) fn coerce(&self, to: &Item, from: Item) -> Result<Option<Item>, PatchError> {
        for (index, converter) in self.converters.iter().enumerate() {
            match converter.convert(to, &from) {
                Err(PatchError::NoConversionDefined) => continue,
                Ok(converted) => {
                    log::debug!("converter #{index} claimed a value");
                    return Ok(converted);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Some(from))
    }

    /// Runs the container transformers in order until one replaces
    /// `container`.
    pub fn transform<'a>(
        &self,
        container: Box<dyn Container<'a> + 'a>,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        let mut container = container;
        for (index, transformer) in self.transformers.iter().enumerate() {
            match transformer.transform(container)? {
                Transformed::Replaced(replaced) => {
                    log::debug!("container transformer #{index} replaced a container");
                    return Ok(replaced);
                }
                Transformed::Declined(original) => container = original,
            }
        }
        Ok(container)
    }
}

impl fmt::Debug for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setup")
            .field("converters", &self.converters.len())
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
