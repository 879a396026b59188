//! Parsed tag lists.
//!
//! Tags are persisted as one comma-separated string. Display and
//! normalization work on a [`TagList`] instead: an ordered sequence of
//! trimmed, non-empty tags. The tag filter is the exception and runs against
//! the stored string, see [`Bookmark::tags_contain`](crate::types::bookmark::Bookmark::tags_contain).

use serde::{Deserialize, Serialize};

/// An ordered list of trimmed, non-empty tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    /// Parses the comma-separated storage form. Blank entries are dropped.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Canonical storage encoding: tags joined by `,` with no padding.
    pub fn to_storage_string(&self) -> String {
        self.0.join(",")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<String>> for TagList {
    fn from(tags: Vec<String>) -> Self {
        Self::parse(&tags.join(","))
    }
}
