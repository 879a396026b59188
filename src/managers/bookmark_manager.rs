//! Bookmark Manager for linkmark.
//!
//! Implements `BookmarkManagerTrait`: ownership-scoped CRUD for bookmarks with
//! joined category display data, backed by SQLite via `rusqlite`.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::managers::category_manager::CategoryManager;
use crate::types::bookmark::{Bookmark, BookmarkPatch, CategoryRef, NewBookmark};
use crate::types::category::NIL_USER;
use crate::types::errors::BookmarkError;

/// Trait defining bookmark management operations.
///
/// All reads and writes by id are scoped to `(id, user_id)`; another user's
/// bookmark is reported as `NotFound`.
pub trait BookmarkManagerTrait {
    fn create(&mut self, user_id: &str, input: NewBookmark) -> Result<Bookmark, BookmarkError>;
    /// All of the user's bookmarks, newest first.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    /// Bookmarks whose raw tag string contains `fragment`, case-insensitively.
    fn list_for_user_by_tag_substring(&self, user_id: &str, fragment: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    fn list_for_user_by_category(&self, user_id: &str, category_id: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    fn get_by_id(&self, id: &str, user_id: &str) -> Result<Bookmark, BookmarkError>;
    fn update(&mut self, id: &str, user_id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    fn delete(&mut self, id: &str, user_id: &str) -> Result<(), BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
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

    /// SELECT with the category join; only categories the owner can see are joined.
    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT b.id, b.user_id, b.url, b.title, b.favicon, b.summary, b.tags, b.category_id, b.created_at, \
                    c.id, c.name, c.color \
             FROM bookmarks b \
             LEFT JOIN categories c ON c.id = b.category_id AND (c.user_id = b.user_id OR c.user_id = '{NIL_USER}') \
             WHERE {filter} \
             ORDER BY b.created_at DESC, b.rowid DESC"
        )
    }

    /// Reads a single joined `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let category = match (
            row.get::<_, Option<String>>(9)?,
            row.get::<_, Option<String>>(10)?,
            row.get::<_, Option<String>>(11)?,
        ) {
            (Some(id), Some(name), Some(color)) => Some(CategoryRef { id, name, color }),
            _ => None,
        };
        Ok(Bookmark {
            id: row.get(0)?,
            user_id: row.get(1)?,
            url: row.get(2)?,
            title: row.get(3)?,
            favicon: row.get(4)?,
            summary: row.get(5)?,
            tags: row.get(6)?,
            category_id: row.get(7)?,
            created_at: row.get(8)?,
            category,
        })
    }

    fn query_list(&self, filter: &str, values: Vec<Value>) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self.conn.prepare(&Self::select_sql(filter))?;
        let rows = stmt.query_map(params_from_iter(values), Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Fails with `CategoryNotFound` unless the user can see `category_id`.
    pub fn ensure_category_visible(&self, category_id: &str, user_id: &str) -> Result<(), BookmarkError> {
        CategoryManager::new(self.conn)
            .get_visible(category_id, user_id)?
            .map(|_| ())
            .ok_or_else(|| BookmarkError::CategoryNotFound(category_id.to_string()))
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Inserts a fully enriched bookmark. Only the ingestion pipeline calls this.
    fn create(&mut self, user_id: &str, input: NewBookmark) -> Result<Bookmark, BookmarkError> {
        if let Some(cid) = input.category_id.as_deref() {
            self.ensure_category_visible(cid, user_id)?;
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO bookmarks (id, user_id, url, title, favicon, summary, tags, category_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                user_id,
                input.url,
                input.title,
                input.favicon,
                input.summary,
                input.tags,
                input.category_id,
                Self::now()
            ],
        )?;

        debug!(user_id, bookmark_id = %id, "bookmark row inserted");
        self.get_by_id(&id, user_id)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        self.query_list("b.user_id = ?1", vec![Value::Text(user_id.to_string())])
    }

    /// Matching happens here rather than in SQL so case folding covers
    /// non-ASCII tags too; SQLite's `LOWER` only folds ASCII.
    fn list_for_user_by_tag_substring(&self, user_id: &str, fragment: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        Ok(self
            .list_for_user(user_id)?
            .into_iter()
            .filter(|b| b.tags_contain(fragment))
            .collect())
    }

    fn list_for_user_by_category(&self, user_id: &str, category_id: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        self.query_list(
            "b.user_id = ?1 AND b.category_id = ?2",
            vec![
                Value::Text(user_id.to_string()),
                Value::Text(category_id.to_string()),
            ],
        )
    }

    fn get_by_id(&self, id: &str, user_id: &str) -> Result<Bookmark, BookmarkError> {
        self.conn
            .query_row(
                &Self::select_sql("b.id = ?1 AND b.user_id = ?2"),
                params![id, user_id],
                Self::row_to_bookmark,
            )
            .optional()?
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    /// Applies a partial patch. `url`, `favicon`, owner and `created_at` never change.
    fn update(&mut self, id: &str, user_id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        let current = self.get_by_id(id, user_id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(BookmarkError::Validation("title cannot be empty".to_string()));
            }
            sets.push("title = ?");
            values.push(Value::Text(title));
        }
        if let Some(summary) = patch.summary {
            sets.push("summary = ?");
            values.push(Value::Text(summary));
        }
        if let Some(tags) = patch.tags {
            sets.push("tags = ?");
            values.push(Value::Text(tags));
        }
        if let Some(category) = patch.category_id {
            match category.filter(|c| !c.trim().is_empty()) {
                Some(cid) => {
                    self.ensure_category_visible(&cid, user_id)?;
                    values.push(Value::Text(cid));
                }
                None => values.push(Value::Null),
            }
            sets.push("category_id = ?");
        }

        values.push(Value::Text(id.to_string()));
        values.push(Value::Text(user_id.to_string()));
        let sql = format!(
            "UPDATE bookmarks SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );
        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }

        self.get_by_id(id, user_id)
    }

    fn delete(&mut self, id: &str, user_id: &str) -> Result<(), BookmarkError> {
        let affected = self.conn.execute(
            "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        info!(user_id, bookmark_id = id, "bookmark deleted");
        Ok(())
    }
}
