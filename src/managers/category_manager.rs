//! Category Manager for linkmark.
//!
//! Implements `CategoryManagerTrait`: ownership-scoped CRUD over hierarchical
//! categories plus tree construction, backed by SQLite via `rusqlite`.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::category::{
    Category, CategoryNode, CategoryPatch, NewCategory, DEFAULT_CATEGORY_COLOR, NIL_USER,
};
use crate::types::errors::CategoryError;

const CATEGORY_COLUMNS: &str = "id, user_id, name, color, parent_id, created_at";

/// Trait defining category management operations.
///
/// Every lookup by id is scoped to the owner; a category owned by someone
/// else is reported as `NotFound`, exactly like one that does not exist.
pub trait CategoryManagerTrait {
    fn create(&mut self, user_id: &str, input: NewCategory) -> Result<Category, CategoryError>;
    /// Own categories plus the shared defaults, ordered by name.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Category>, CategoryError>;
    fn get_by_id(&self, id: &str, user_id: &str) -> Result<Category, CategoryError>;
    fn update(&mut self, id: &str, user_id: &str, patch: CategoryPatch) -> Result<Category, CategoryError>;
    fn delete(&mut self, id: &str, user_id: &str) -> Result<(), CategoryError>;
    fn tree(&self, user_id: &str) -> Result<Vec<CategoryNode>, CategoryError>;
}

/// Category manager backed by a SQLite connection.
pub struct CategoryManager<'a> {
    conn: &'a Connection,
}

impl<'a> CategoryManager<'a> {
    /// Creates a new `CategoryManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Reads a single `Category` row into a struct.
    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            color: row.get(3)?,
            parent_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    /// Looks up a category the user may reference: one of their own or a default.
    pub fn get_visible(&self, id: &str, user_id: &str) -> Result<Option<Category>, CategoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1 AND (user_id = ?2 OR user_id = ?3)"
        );
        Ok(self
            .conn
            .query_row(&sql, params![id, user_id, NIL_USER], Self::row_to_category)
            .optional()?)
    }

    fn validate_name(name: &str) -> Result<String, CategoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::Validation("name is required".to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Accepts `#RGB` or `#RRGGBB`.
    fn validate_color(color: &str) -> Result<String, CategoryError> {
        let color = color.trim();
        let valid = match color.strip_prefix('#') {
            Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => false,
        };
        if !valid {
            return Err(CategoryError::Validation(format!(
                "color must be a hex value like {DEFAULT_CATEGORY_COLOR}, got '{color}'"
            )));
        }
        Ok(color.to_string())
    }

    fn require_visible_parent(&self, parent_id: &str, user_id: &str) -> Result<Category, CategoryError> {
        self.get_visible(parent_id, user_id)?
            .ok_or_else(|| CategoryError::ParentNotFound(parent_id.to_string()))
    }

    /// Rejects a parent assignment that would close a cycle through `id`.
    fn ensure_acyclic(&self, id: &str, parent: &Category, user_id: &str) -> Result<(), CategoryError> {
        let mut seen = HashSet::new();
        let mut cursor = Some(parent.clone());
        while let Some(current) = cursor {
            if current.id == id {
                return Err(CategoryError::Validation(
                    "a category cannot be nested under itself or its descendants".to_string(),
                ));
            }
            if !seen.insert(current.id.clone()) {
                break;
            }
            cursor = match current.parent_id.as_deref() {
                Some(pid) => self.get_visible(pid, user_id)?,
                None => None,
            };
        }
        Ok(())
    }
}

/// Builds a forest from flat categories.
///
/// Pass one indexes every category; pass two attaches each to its parent when
/// the parent is present in `categories`, otherwise it becomes a root. Input
/// order is preserved among siblings. Categories caught in a parent cycle are
/// promoted to roots at the first member encountered, so every category
/// appears exactly once in the output.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let index: HashMap<String, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); categories.len()];
    let mut roots = Vec::new();
    for (i, category) in categories.iter().enumerate() {
        match category.parent_id.as_deref().and_then(|pid| index.get(pid)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut slots: Vec<Option<Category>> = categories.into_iter().map(Some).collect();
    let mut forest: Vec<CategoryNode> = roots
        .into_iter()
        .filter_map(|i| assemble(i, &children, &mut slots))
        .collect();

    for i in 0..slots.len() {
        if let Some(node) = assemble(i, &children, &mut slots) {
            forest.push(node);
        }
    }
    forest
}

struct Frame {
    node: CategoryNode,
    index: usize,
    next_child: usize,
}

/// Builds the subtree under `root` from the categories still in `slots`.
/// Walks with an explicit stack so chain depth is bounded by the heap.
fn assemble(root: usize, children: &[Vec<usize>], slots: &mut [Option<Category>]) -> Option<CategoryNode> {
    let category = slots[root].take()?;
    let mut stack = vec![Frame {
        node: CategoryNode { category, children: Vec::new() },
        index: root,
        next_child: 0,
    }];
    loop {
        let top = stack.last_mut()?;
        if let Some(&child) = children[top.index].get(top.next_child) {
            top.next_child += 1;
            if let Some(category) = slots[child].take() {
                stack.push(Frame {
                    node: CategoryNode { category, children: Vec::new() },
                    index: child,
                    next_child: 0,
                });
            }
            continue;
        }
        let done = stack.pop()?.node;
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(done),
            None => return Some(done),
        }
    }
}

impl<'a> CategoryManagerTrait for CategoryManager<'a> {
    fn create(&mut self, user_id: &str, input: NewCategory) -> Result<Category, CategoryError> {
        let name = Self::validate_name(&input.name)?;
        let color = match input.color.as_deref() {
            Some(c) => Self::validate_color(c)?,
            None => DEFAULT_CATEGORY_COLOR.to_string(),
        };
        let parent_id = input.parent_id.filter(|p| !p.trim().is_empty());
        if let Some(pid) = parent_id.as_deref() {
            self.require_visible_parent(pid, user_id)?;
        }

        let category = Category {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name,
            color,
            parent_id,
            created_at: Self::now(),
        };

        self.conn.execute(
            "INSERT INTO categories (id, user_id, name, color, parent_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                category.id,
                category.user_id,
                category.name,
                category.color,
                category.parent_id,
                category.created_at
            ],
        )?;

        debug!(user_id, category_id = %category.id, "category created");
        Ok(category)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Category>, CategoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE user_id = ?1 OR user_id = ?2 \
             ORDER BY name COLLATE NOCASE ASC, rowid ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, NIL_USER], Self::row_to_category)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn get_by_id(&self, id: &str, user_id: &str) -> Result<Category, CategoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1 AND user_id = ?2");
        self.conn
            .query_row(&sql, params![id, user_id], Self::row_to_category)
            .optional()?
            .ok_or_else(|| CategoryError::NotFound(id.to_string()))
    }

    fn update(&mut self, id: &str, user_id: &str, patch: CategoryPatch) -> Result<Category, CategoryError> {
        let current = self.get_by_id(id, user_id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = patch.name.as_deref() {
            sets.push("name = ?");
            values.push(Value::Text(Self::validate_name(name)?));
        }
        if let Some(color) = patch.color.as_deref() {
            sets.push("color = ?");
            values.push(Value::Text(Self::validate_color(color)?));
        }
        if let Some(parent) = patch.parent_id {
            match parent.filter(|p| !p.trim().is_empty()) {
                Some(pid) => {
                    let parent = self.require_visible_parent(&pid, user_id)?;
                    self.ensure_acyclic(id, &parent, user_id)?;
                    sets.push("parent_id = ?");
                    values.push(Value::Text(pid));
                }
                None => {
                    sets.push("parent_id = ?");
                    values.push(Value::Null);
                }
            }
        }

        values.push(Value::Text(id.to_string()));
        values.push(Value::Text(user_id.to_string()));
        let sql = format!(
            "UPDATE categories SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );
        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(CategoryError::NotFound(id.to_string()));
        }

        self.get_by_id(id, user_id)
    }

    /// Deletes a category owned by `user_id`.
    ///
    /// Bookmarks filed under it fall back to no category and child categories
    /// are promoted to roots, all in one transaction.
    fn delete(&mut self, id: &str, user_id: &str) -> Result<(), CategoryError> {
        let tx = self.conn.unchecked_transaction()?;

        let affected = tx.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if affected == 0 {
            return Err(CategoryError::NotFound(id.to_string()));
        }

        let detached_bookmarks = tx.execute(
            "UPDATE bookmarks SET category_id = NULL WHERE category_id = ?1",
            params![id],
        )?;
        let promoted_children = tx.execute(
            "UPDATE categories SET parent_id = NULL WHERE parent_id = ?1",
            params![id],
        )?;
        tx.commit()?;

        info!(
            user_id,
            category_id = id,
            detached_bookmarks,
            promoted_children,
            "category deleted"
        );
        Ok(())
    }

    fn tree(&self, user_id: &str) -> Result<Vec<CategoryNode>, CategoryError> {
        Ok(build_tree(self.list_for_user(user_id)?))
    }
}
