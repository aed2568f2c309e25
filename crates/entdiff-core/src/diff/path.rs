use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Represents a single step from a composite to one of its children.
///
/// ```
/// # use entdiff_core::diff::PathSegment;
/// let key = PathSegment::key("owner");
/// let index = PathSegment::index(2);
/// assert_eq!(key.to_string(), "\"owner\"");
/// assert_eq!(index.to_string(), "2");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Entity field lookup.
    Key(String),
    /// Collection slot lookup.
    Index(usize),
}

impl PathSegment {
    /// Creates a key segment.
    #[must_use]
    pub fn key<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::Key(value.into())
    }

    /// Creates an index segment.
    #[must_use]
    pub fn index(value: usize) -> Self {
        Self::Index(value)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", JsonValue::String(key.clone())),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Key(key) => serializer.serialize_str(key),
            Self::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

/// Location of a change relative to the root composite of a comparison.
///
/// Displays as a JSON array, which is the form used in rendered headers.
///
/// ```
/// # use entdiff_core::diff::{Path, PathSegment};
/// let path = Path::new().with_segment(PathSegment::key("items"))
///     .with_segment(PathSegment::index(0));
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "[\"items\",0]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new segment, returning the extended path.
    #[must_use]
    pub fn with_segment(mut self, segment: PathSegment) -> Self {
        self.0.push(segment);
        self
    }

    /// Returns the underlying segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Descends into `segment`.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// Returns to the parent, yielding the segment left.
    ///
    /// ```
    /// # use entdiff_core::diff::{Path, PathSegment};
    /// let mut path = Path::new().with_segment(PathSegment::index(0));
    /// assert_eq!(path.pop(), Some(PathSegment::index(0)));
    /// assert!(path.is_empty());
    /// ```
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(value: Vec<PathSegment>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        let mut separator = "";
        for segment in &self.0 {
            write!(f, "{separator}{segment}")?;
            separator = ",";
        }
        write!(f, "]")
    }
}
