#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{PathError, PathResult},
    keys::SEPARATOR,
};

/// Identifies a file or directory inside a backend container.
///
/// A `StorePath` is a container name (bucket, table, cache name) plus an
/// ordered list of path segments. A path with zero segments denotes the
/// container root directory. Two paths are equal iff container and segment
/// sequence match; case rules beyond that are backend-defined and enforced
/// by a [`PathValidator`](crate::PathValidator).
///
/// Construction validates structure only: segments must be non-empty, must
/// not contain the path separator, and must not be `..`. Backend naming
/// rules (length limits, character sets, reserved names) are a validator
/// concern, not a path concern.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorePath {
    container: String,
    segments: Vec<String>,
}

impl StorePath {
    /// Create a path from a container name and segments.
    pub fn new<C, I, S>(container: C, segments: I) -> PathResult<Self>
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let container = container.into();
        validate_container(&container)?;

        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            validate_segment(segment)?;
        }

        Ok(Self {
            container,
            segments,
        })
    }

    /// The root directory of a container (zero segments).
    pub fn root<C: Into<String>>(container: C) -> PathResult<Self> {
        Self::new(container, std::iter::empty::<String>())
    }

    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this path is the container root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, i.e. the file or directory name. `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The parent directory. `None` for the container root.
    #[must_use]
    pub fn parent(&self) -> Option<StorePath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(StorePath {
            container: self.container.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// A child of this path with one more segment appended.
    pub fn child<S: Into<String>>(&self, segment: S) -> PathResult<StorePath> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(StorePath {
            container: self.container.clone(),
            segments,
        })
    }

    /// Fully qualified name: container and segments joined by the separator.
    ///
    /// Used as the identity of this path in cache keys and error messages.
    #[must_use]
    pub fn full_qualified_name(&self) -> String {
        let mut name = self.container.clone();
        for segment in &self.segments {
            name.push(SEPARATOR);
            name.push_str(segment);
        }
        name
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_qualified_name())
    }
}

fn validate_container(container: &str) -> PathResult<()> {
    if container.is_empty() {
        return Err(PathError::EmptyContainer);
    }
    if container.contains(SEPARATOR) {
        return Err(PathError::InvalidContainer {
            container: container.to_string(),
            reason: "must not contain the path separator",
        });
    }
    Ok(())
}

fn validate_segment(segment: &str) -> PathResult<()> {
    let reason = if segment.is_empty() {
        Some("must not be empty")
    } else if segment.contains(SEPARATOR) {
        Some("must not contain the path separator")
    } else if segment == ".." || segment == "." {
        Some("must not be a relative directory reference")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(PathError::InvalidSegment {
            segment: segment.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
