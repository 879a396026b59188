use serde::{Deserialize, Serialize};

use super::serde_helpers::double_option;
use super::tags::TagList;

/// Display data of the category a bookmark is filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Represents a saved, enriched bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub favicon: String,
    pub summary: String,
    /// Comma-separated storage form, kept exactly as written.
    pub tags: String,
    pub category_id: Option<String>,
    pub created_at: i64,
    /// Joined category display data, present when `category_id` resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Bookmark {
    /// Tags parsed into trimmed, non-empty entries.
    pub fn tag_list(&self) -> TagList {
        TagList::parse(&self.tags)
    }

    /// Case-insensitive substring match of `fragment` against the stored tag
    /// string, separators included. An empty fragment matches everything.
    pub fn tags_contain(&self, fragment: &str) -> bool {
        self.tags.to_lowercase().contains(&fragment.to_lowercase())
    }
}

/// Fully assembled fields for a new bookmark row.
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub favicon: String,
    pub summary: String,
    pub tags: String,
    pub category_id: Option<String>,
}

/// Partial update restricted to the mutable bookmark fields.
///
/// `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default, alias = "categoryId", deserialize_with = "double_option")]
    pub category_id: Option<Option<String>>,
}

impl BookmarkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.tags.is_none()
            && self.category_id.is_none()
    }
}
