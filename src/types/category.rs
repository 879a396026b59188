use serde::{Deserialize, Serialize};

use super::serde_helpers::double_option;

/// Owner id of the shared default categories visible to every user.
pub const NIL_USER: &str = "00000000-0000-0000-0000-000000000000";

/// Color assigned when a category is created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// A stored category. Children are never stored; see [`CategoryNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub parent_id: Option<String>,
    pub created_at: i64,
}

impl Category {
    /// True if this is one of the shared default categories.
    pub fn is_default(&self) -> bool {
        self.user_id == NIL_USER
    }
}

/// A category with its derived children, produced by tree construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,
}

/// Partial update of a category's mutable fields.
///
/// `parent_id: Some(None)` detaches the category to the root level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "parentId", deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.parent_id.is_none()
    }
}
