use alloc::boxed::Box;

use crate::{Container, Path, PatchError, Segment, Setup};

// -----------------------------------------------------------------------------
// Walker

impl Setup {
    /// Descends from `container` along `path` without writing anything.
    ///
    /// The container transformers run on `container` and on every container
    /// reached. Unset children are read-only, see [`Container::access`].
    /// The empty path returns the (transformed) container itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_patch::{Container, RecordContainer, Setup};
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
    /// let mut root = DynamicMessage::new(node);
    ///
    /// let child = Setup::new().access(RecordContainer::new(&mut root).boxed(), "child.child");
    /// assert!(child.is_ok_and(|c| c.is_read_only()));
    /// ```
    pub fn access<'a>(
        &self,
        container: Box<dyn Container<'a> + 'a>,
        path: &str,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        self.walk(container, Path::new(path), false)
    }

    /// Descends from `container` along `path`, setting unset children to
    /// their default value on the way.
    pub fn access_mutable<'a>(
        &self,
        container: Box<dyn Container<'a> + 'a>,
        path: &str,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        self.walk(container, Path::new(path), true)
    }

    /// Empty segments step nowhere and skip the transformers.
    pub(crate) fn walk<'a>(
        &self,
        container: Box<dyn Container<'a> + 'a>,
        path: Path<'_>,
        mutable: bool,
    ) -> Result<Box<dyn Container<'a> + 'a>, PatchError> {
        let mut current = self.transform(container)?;
        if path.is_root() {
            return Ok(current);
        }
        for segment in path {
            if segment.value().is_empty() {
                continue;
            }
            let next = if mutable {
                current.access_mutable(segment.value())
            } else {
                current.access(segment.value())
            };
            let next = next.map_err(|err| blame(err, &segment))?;
            current = self
                .transform(next)
                .map_err(|err| err.in_path(segment.preceding_path_with_current().as_str()))?;
        }
        Ok(current)
    }
}

/// Attributes a failed descent: to the segment itself when it names a
/// scalar, otherwise to the container that reported the error.
fn blame(err: PatchError, segment: &Segment<'_>) -> PatchError {
    if *err.root_cause() == PatchError::AccessToNonContainer {
        err.in_path(segment.preceding_path_with_current().as_str())
    } else {
        within(err, segment)
    }
}

/// Wraps an error reported by the parent of `segment`.
///
/// The root container reports without a path.
pub(crate) fn within(err: PatchError, segment: &Segment<'_>) -> PatchError {
    if segment.is_first() {
        err
    } else {
        err.in_path(segment.preceding_path().as_str())
    }
}

// -----------------------------------------------------------------------------
// Tests
