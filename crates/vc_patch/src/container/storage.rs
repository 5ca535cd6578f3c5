use core::mem;

use vc_schema::DynamicMessage;

use crate::PatchError;

/// Where the collection behind a list or map container lives.
pub(crate) enum Backing<'a, T> {
    /// Reached through an unset ancestor; nothing can be written.
    Absent,
    /// A shared borrow; nothing can be written.
    Shared(&'a T),
    /// Writable, but the field is unset in `parent`. The first write
    /// allocates the collection there.
    Detached(&'a mut DynamicMessage),
    /// Writable storage.
    Backed(&'a mut T),
}

impl<'a, T> Backing<'a, T> {
    #[inline]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Backing::Absent | Backing::Shared(_))
    }

    /// The current collection, `None` while absent or detached.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        match self {
            Backing::Shared(target) => Some(*target),
            Backing::Backed(target) => Some(&**target),
            Backing::Absent | Backing::Detached(_) => None,
        }
    }

    /// Writable storage, allocated through `project` when detached.
    pub fn materialize<F>(&mut self, project: F) -> Result<&mut T, PatchError>
    where
        F: FnOnce(&'a mut DynamicMessage) -> Result<&'a mut T, PatchError>,
    {
        match mem::replace(self, Backing::Absent) {
            Backing::Detached(parent) => *self = Backing::Backed(project(parent)?),
            other => *self = other,
        }
        match self {
            Backing::Backed(target) => Ok(&mut **target),
            _ => Err(PatchError::MutationOfReadOnlyValue),
        }
    }

    /// Like [`materialize`](Self::materialize), keeping the full lifetime.
    pub fn into_mut<F>(self, project: F) -> Result<&'a mut T, PatchError>
    where
        F: FnOnce(&'a mut DynamicMessage) -> Result<&'a mut T, PatchError>,
    {
        match self {
            Backing::Backed(target) => Ok(target),
            Backing::Detached(parent) => project(parent),
            Backing::Absent | Backing::Shared(_) => Err(PatchError::MutationOfReadOnlyValue),
        }
    }
}
