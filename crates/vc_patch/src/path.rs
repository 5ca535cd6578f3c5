//! Dotted addresses into a message tree.

use core::fmt;
use core::iter::FusedIterator;

use alloc::string::String;

// -----------------------------------------------------------------------------
// Path

/// The character separating path segments.
pub const SEPARATOR: char = '.';

/// A dot-separated address such as `list.message.0.string`.
///
/// Segments are never collapsed: `"a..b"` has three segments, the middle
/// one empty. The empty path has a single empty segment and addresses the
/// root. There is no escaping, so names containing `.` are not addressable.
///
/// # Examples
///
/// ```
/// use vc_patch::Path;
///
/// let path = Path::new("list.message.-1");
/// assert_eq!(path.segments_count(), 3);
///
/// let last = path.last();
/// assert_eq!(last.value(), "-1");
/// assert_eq!(last.preceding_path().as_str(), "list.message");
///
/// let values: Vec<_> = path.iter().map(|s| s.value()).collect();
/// assert_eq!(values, ["list", "message", "-1"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Path<'a>(&'a str);

impl<'a> Path<'a> {
    #[inline]
    pub const fn new(path: &'a str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'a str {
        self.0
    }

    /// Returns `true` for the empty path, which addresses the root.
    #[inline]
    pub const fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The first segment.
    pub fn first(&self) -> Segment<'a> {
        let end = self.0.find(SEPARATOR).unwrap_or(self.0.len());
        Segment {
            path: self.0,
            start: 0,
            end,
        }
    }

    /// The last segment.
    pub fn last(&self) -> Segment<'a> {
        let start = self.0.rfind(SEPARATOR).map_or(0, |i| i + 1);
        Segment {
            path: self.0,
            start,
            end: self.0.len(),
        }
    }

    #[inline]
    pub fn segments_count(&self) -> usize {
        self.0.matches(SEPARATOR).count() + 1
    }

    /// Iterates over the segments from first to last.
    ///
    /// The iterator is recomputed from the string, so calling `iter` again
    /// restarts from the first segment.
    #[inline]
    pub fn iter(&self) -> Segments<'a> {
        Segments {
            next: Some(self.first()),
        }
    }

    /// Appends every path in `others`, each preceded by a separator.
    ///
    /// ```
    /// use vc_patch::Path;
    ///
    /// assert_eq!(Path::new("a").join([Path::new("b.c"), Path::new("")]), "a.b.c.");
    /// ```
    pub fn join<'b>(&self, others: impl IntoIterator<Item = Path<'b>>) -> String {
        self.join_values(others.into_iter().map(|p| p.0))
    }

    /// Appends the value of every segment in `segments`.
    pub fn join_segments<'b>(&self, segments: impl IntoIterator<Item = Segment<'b>>) -> String {
        self.join_values(segments.into_iter().map(|s| s.value()))
    }

    /// Appends every raw segment value in `values`.
    pub fn join_values<'b>(&self, values: impl IntoIterator<Item = &'b str>) -> String {
        let mut out = String::from(self.0);
        for value in values {
            out.push(SEPARATOR);
            out.push_str(value);
        }
        out
    }
}

impl<'a> From<&'a str> for Path<'a> {
    #[inline]
    fn from(path: &'a str) -> Self {
        Self(path)
    }
}

impl<'a> From<&'a String> for Path<'a> {
    #[inline]
    fn from(path: &'a String) -> Self {
        Self(path)
    }
}

impl fmt::Display for Path<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl<'a> IntoIterator for Path<'a> {
    type Item = Segment<'a>;
    type IntoIter = Segments<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// -----------------------------------------------------------------------------
// Segment

/// One segment of a [`Path`], remembering its position in the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment<'a> {
    path: &'a str,
    start: usize,
    end: usize,
}

impl<'a> Segment<'a> {
    /// The text of the segment.
    #[inline]
    pub fn value(&self) -> &'a str {
        &self.path[self.start..self.end]
    }

    /// The whole path this segment belongs to.
    #[inline]
    pub fn path(&self) -> Path<'a> {
        Path(self.path)
    }

    #[inline]
    pub fn is_first(&self) -> bool {
        self.start == 0
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.end == self.path.len()
    }

    /// The segment after this one.
    pub fn next_segment(&self) -> Option<Segment<'a>> {
        if self.is_last() {
            return None;
        }
        let start = self.end + 1;
        let end = self.path[start..]
            .find(SEPARATOR)
            .map_or(self.path.len(), |i| start + i);
        Some(Segment {
            path: self.path,
            start,
            end,
        })
    }

    /// The segment before this one.
    pub fn previous_segment(&self) -> Option<Segment<'a>> {
        if self.is_first() {
            return None;
        }
        let end = self.start - 1;
        let start = self.path[..end].rfind(SEPARATOR).map_or(0, |i| i + 1);
        Some(Segment {
            path: self.path,
            start,
            end,
        })
    }

    /// Everything before this segment, without the trailing separator.
    #[inline]
    pub fn preceding_path(&self) -> Path<'a> {
        Path(&self.path[..self.start.saturating_sub(1)])
    }

    /// Everything up to and including this segment.
    #[inline]
    pub fn preceding_path_with_current(&self) -> Path<'a> {
        Path(&self.path[..self.end])
    }

    /// Everything after this segment, without the leading separator.
    #[inline]
    pub fn following_path(&self) -> Path<'a> {
        Path(&self.path[(self.end + 1).min(self.path.len())..])
    }

    /// Everything from this segment on.
    #[inline]
    pub fn following_path_with_current(&self) -> Path<'a> {
        Path(&self.path[self.start..])
    }
}

impl fmt::Display for Segment<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

// -----------------------------------------------------------------------------
// Segments

/// Iterator over the segments of a [`Path`], see [`Path::iter`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    next: Option<Segment<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_segment();
        Some(current)
    }
}

impl FusedIterator for Segments<'_> {}

// -----------------------------------------------------------------------------
// Tests
