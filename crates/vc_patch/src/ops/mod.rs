//! Path operators over a root message.
//!
//! Every operator is a method of [`Setup`]; the functions of this module run
//! them with the default setup (no converters, no container transformers).
//!
//! ## Menu
//!
//! - Reads: [`get`], [`get_copy`], [`get_new`] and [`get_mut`].
//! - Writes: [`set`], [`clear`], [`append`] and [`insert`].
//! - Transfers: [`copy`], [`relocate`] and [`swap`].
//! - Descents: [`access`] and [`access_mutable`].
//!
//! Paths address a slot through the containers between the root and the
//! slot, see [`Path`](crate::Path). The empty path addresses the root.
//!
//! Errors carry at most one [`PatchError::InPath`] naming the failing
//! location.

// -----------------------------------------------------------------------------
// Modules

mod list_ops;
mod read_ops;
mod transfer_ops;
mod write_ops;

// -----------------------------------------------------------------------------
// Parent

use alloc::boxed::Box;

use vc_schema::{DynamicMessage, Value};

use crate::{Container, Item, Path, PatchError, Segment, Setup};

impl Setup {
    /// Walks to the container holding the last segment of `path`.
    ///
    /// Single segment paths resolve to the transformed root.
    pub(crate) fn parent<'a, 'p>(
        &self,
        root: Box<dyn Container<'a> + 'a>,
        path: Path<'p>,
    ) -> Result<(Box<dyn Container<'a> + 'a>, Segment<'p>), PatchError> {
        let last = path.last();
        let parent = self.walk(root, last.preceding_path(), false)?;
        Ok((parent, last))
    }
}

// -----------------------------------------------------------------------------
// Default setup

/// Reads the slot at `path`. See [`Setup::get`].
#[inline]
pub fn get(root: &DynamicMessage, path: &str) -> Result<Item, PatchError> {
    Setup::default().get(root, path)
}

/// Reads a detached copy of the slot at `path`. See [`Setup::get_copy`].
#[inline]
pub fn get_copy(root: &DynamicMessage, path: &str) -> Result<Item, PatchError> {
    Setup::default().get_copy(root, path)
}

/// A zero value shaped like the slot at `path`. See [`Setup::get_new`].
#[inline]
pub fn get_new(root: &DynamicMessage, path: &str) -> Result<Item, PatchError> {
    Setup::default().get_new(root, path)
}

/// Mutable access to the slot at `path`. See [`Setup::get_mut`].
#[inline]
pub fn get_mut<'a>(root: &'a mut DynamicMessage, path: &str) -> Result<&'a mut Value, PatchError> {
    Setup::default().get_mut(root, path)
}

/// Writes the slot at `path`. See [`Setup::set`].
#[inline]
pub fn set(root: &mut DynamicMessage, path: &str, value: impl Into<Item>) -> Result<(), PatchError> {
    Setup::default().set(root, path, value)
}

/// Unsets the slot at `path`. See [`Setup::clear`].
#[inline]
pub fn clear(root: &mut DynamicMessage, path: &str) -> Result<(), PatchError> {
    Setup::default().clear(root, path)
}

/// Appends to the list at `path`. See [`Setup::append`].
#[inline]
pub fn append(root: &mut DynamicMessage, path: &str, value: impl Into<Item>) -> Result<(), PatchError> {
    Setup::default().append(root, path, value)
}

/// Inserts into a list before the index ending `path`. See [`Setup::insert`].
#[inline]
pub fn insert(root: &mut DynamicMessage, path: &str, value: impl Into<Item>) -> Result<(), PatchError> {
    Setup::default().insert(root, path, value)
}

/// Copies the slot at `source` to `target`. See [`Setup::copy`].
#[inline]
pub fn copy(root: &mut DynamicMessage, target: &str, source: &str) -> Result<(), PatchError> {
    Setup::default().copy(root, target, source)
}

/// Moves the slot at `source` to `target`. See [`Setup::relocate`].
#[inline]
pub fn relocate(root: &mut DynamicMessage, target: &str, source: &str) -> Result<(), PatchError> {
    Setup::default().relocate(root, target, source)
}

/// Exchanges the slots at `first` and `second`. See [`Setup::swap`].
#[inline]
pub fn swap(root: &mut DynamicMessage, first: &str, second: &str) -> Result<(), PatchError> {
    Setup::default().swap(root, first, second)
}

/// Descends from `container` along `path`. See [`Setup::access`].
#[inline]
pub fn access<'a>(
    container: Box<dyn Container<'a> + 'a>,
    path: &str,
) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
    Setup::default().access(container, path)
}

/// Descends from `container` along `path`, materializing unset children.
/// See [`Setup::access_mutable`].
#[inline]
pub fn access_mutable<'a>(
    container: Box<dyn Container<'a> + 'a>,
    path: &str,
) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
    Setup::default().access_mutable(container, path)
}
