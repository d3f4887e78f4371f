//! Field paths for locating errors inside composite form input.
//!
//! A [`FieldPath`] is what lets a form map an error back to the input that
//! produced it, e.g. `techs[1].knowledge`.

use std::fmt::{self, Display};
use std::str::FromStr;

/// One step into a composite value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named object field (`email`).
    Field(String),
    /// A position in a list (`[0]`).
    Index(usize),
}

impl Segment {
    /// Returns the field name, if this segment is a field.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Segment::Field(name) => Some(name),
            Segment::Index(_) => None,
        }
    }
}

/// A location inside a form value.
///
/// Paths are built incrementally while validation descends into objects and
/// arrays. Appending never mutates the receiver, so sibling paths can share
/// a parent.
///
/// The display form does not escape field names. A name containing `.` or
/// `[` renders the same as a deeper path and parses back as one, so compare
/// paths by value or by `segments()` rather than by their strings.
///
/// # Example
///
/// ```rust
/// use formcheck::FieldPath;
///
/// let path = FieldPath::root()
///     .push_field("techs")
///     .push_index(1)
///     .push_field("knowledge");
///
/// assert_eq!(path.to_string(), "techs[1].knowledge");
/// assert_eq!(path, "techs[1].knowledge".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The path of the value handed to `validate` itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(Segment::Field(name.into()))
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Returns the enclosing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// True when the final segment is the field `name`.
    pub fn ends_with_field(&self, name: &str) -> bool {
        self.last().and_then(Segment::as_field) == Some(name)
    }

    /// True when `self` is `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Returned when a string is not a well-formed field path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field path '{input}' at byte {position}")]
pub struct PathParseError {
    pub input: String,
    pub position: usize,
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    /// Parses the `Display` form back into a path. The empty string is the
    /// root path. Every `.` and `[` starts a new segment, so field names
    /// that contain them do not survive a round trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |position| PathParseError {
            input: s.to_string(),
            position,
        };

        let bytes = s.as_bytes();
        let mut segments = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let close = s[pos..].find(']').ok_or_else(|| fail(pos))? + pos;
                    let index = s[pos + 1..close].parse().map_err(|_| fail(pos + 1))?;
                    segments.push(Segment::Index(index));
                    pos = close + 1;
                }
                b'.' if !segments.is_empty() => {
                    let start = pos + 1;
                    let end = field_end(s, start);
                    if end == start {
                        return Err(fail(start));
                    }
                    segments.push(Segment::Field(s[start..end].to_string()));
                    pos = end;
                }
                b'.' => return Err(fail(pos)),
                _ if segments.is_empty() => {
                    let end = field_end(s, pos);
                    segments.push(Segment::Field(s[pos..end].to_string()));
                    pos = end;
                }
                _ => return Err(fail(pos)),
            }
        }

        Ok(Self { segments })
    }
}

fn field_end(s: &str, start: usize) -> usize {
    s[start..]
        .find(['.', '['])
        .map_or(s.len(), |offset| start + offset)
}
