use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::Path;

// -----------------------------------------------------------------------------
// NotFoundKind & Operation

/// What a path segment failed to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundKind {
    Field,
    Index,
    Key,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotFoundKind::Field => "field",
            NotFoundKind::Index => "index",
            NotFoundKind::Key => "key",
        })
    }
}

/// A writing container operation, as named in [`PatchError::OperationFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Set,
    Append,
    Insert,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Set => "set",
            Operation::Append => "append",
            Operation::Insert => "insert",
        })
    }
}

// -----------------------------------------------------------------------------
// PatchError

/// An error returned by path operations.
///
/// Operators report the lowest level error wrapped in at most one
/// [`PatchError::InPath`] naming the full failing location.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PatchError {
    /// A segment names no field, index or key.
    #[error("{kind} \"{value}\" not found")]
    NotFound { kind: NotFoundKind, value: String },
    /// A segment tried to descend into a scalar.
    #[error(
        "cannot descend into specified key; attempted to access a sub-value in an entity that is not a message, list or map"
    )]
    AccessToNonContainer,
    #[error("cannot append to non list field")]
    AppendToNonList,
    #[error("cannot insert to non list field")]
    InsertToNonList,
    #[error("cannot mutate read-only value")]
    MutationOfReadOnlyValue,
    /// Always reported inside [`PatchError::OperationFailed`].
    #[error("mismatching type")]
    MismatchingType,
    /// A write was rejected.
    #[error("cannot {op}: {cause}")]
    OperationFailed {
        op: Operation,
        cause: Box<PatchError>,
    },
    /// Returned by a [`Converter`](crate::Converter) that does not handle the
    /// given pair of values, so that the next one is tried.
    #[error("no conversion defined for the provided types")]
    NoConversionDefined,
    /// A converter recognised the value but could not convert it.
    #[error("conversion failed: {0}")]
    Conversion(Cow<'static, str>),
    #[error(transparent)]
    InPath(ErrInPath),
}

impl PatchError {
    #[inline]
    pub fn not_found(kind: NotFoundKind, value: impl Into<String>) -> Self {
        PatchError::NotFound {
            kind,
            value: value.into(),
        }
    }

    #[inline]
    pub fn operation_failed(op: Operation, cause: PatchError) -> Self {
        PatchError::OperationFailed {
            op,
            cause: Box::new(cause),
        }
    }

    #[inline]
    pub fn conversion(reason: impl Into<Cow<'static, str>>) -> Self {
        PatchError::Conversion(reason.into())
    }

    /// Attributes the error to `path`.
    ///
    /// If the error already carries a path, the two are joined instead of
    /// nesting a second wrapper.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_patch::{NotFoundKind, PatchError};
    ///
    /// let err = PatchError::not_found(NotFoundKind::Index, "3")
    ///     .in_path("message")
    ///     .in_path("list");
    /// assert_eq!(err.path(), Some("list.message"));
    /// assert_eq!(err.to_string(), r#"path "list.message": index "3" not found"#);
    /// ```
    pub fn in_path(self, path: &str) -> Self {
        match self {
            PatchError::InPath(mut inner) => {
                inner.path = Path::new(path).join([Path::new(&inner.path)]);
                PatchError::InPath(inner)
            }
            cause => PatchError::InPath(ErrInPath {
                path: path.into(),
                cause: Box::new(cause),
            }),
        }
    }

    /// The path carried by an [`PatchError::InPath`] error.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        match self {
            PatchError::InPath(inner) => Some(&inner.path),
            _ => None,
        }
    }

    /// The innermost error, with path and operation wrappers removed.
    pub fn root_cause(&self) -> &PatchError {
        let mut current = self;
        loop {
            current = match current {
                PatchError::InPath(inner) => &*inner.cause,
                PatchError::OperationFailed { cause, .. } => &**cause,
                other => return other,
            };
        }
    }
}

// -----------------------------------------------------------------------------
// ErrInPath

/// An error attributed to a location, see [`PatchError::in_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrInPath {
    path: String,
    cause: Box<PatchError>,
}

impl ErrInPath {
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn cause(&self) -> &PatchError {
        &self.cause
    }
}

impl fmt::Display for ErrInPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            fmt::Display::fmt(&self.cause, f)
        } else {
            write!(f, "path \"{}\": {}", self.path, self.cause)
        }
    }
}

impl core::error::Error for ErrInPath {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{NotFoundKind, Operation, PatchError};

    #[test]
    fn wraps_coalesce() {
        let err = PatchError::operation_failed(Operation::Set, PatchError::MismatchingType)
            .in_path("key")
            .in_path("map")
            .in_path("message");
        assert_eq!(err.path(), Some("message.map.key"));
        assert_eq!(
            err.to_string(),
            "path \"message.map.key\": cannot set: mismatching type"
        );
        assert_eq!(err.root_cause(), &PatchError::MismatchingType);
    }

    #[test]
    fn empty_path_displays_cause_only() {
        let err = PatchError::AppendToNonList.in_path("");
        assert_eq!(err.to_string(), "cannot append to non list field");
        assert_eq!(err.path(), Some(""));
    }

    #[test]
    fn not_found_message() {
        let err = PatchError::not_found(NotFoundKind::Key, "unknown");
        assert_eq!(err.to_string(), "key \"unknown\" not found");
    }
}
