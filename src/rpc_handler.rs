//! RPC method handler for the linkmark JSON-RPC protocol.
//!
//! Kept separate from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a method call to the ingestion pipeline or to a
//! store built over the app's database.
//!
//! Every method except `ping` and `health` takes `user_id` in its params: the
//! identity already verified by the authentication layer in front of us.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::app::App;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use crate::types::bookmark::BookmarkPatch;
use crate::types::category::{CategoryPatch, NewCategory};
use crate::types::errors::{BookmarkError, CategoryError, ErrorClass};

/// Error payload returned to RPC callers.
///
/// `code` is `validation`, `not_found` or `internal`. Internal failures carry
/// an opaque message; the detail goes to the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self { code: "validation", message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { code: "not_found", message: message.into() }
    }

    pub fn internal() -> Self {
        Self { code: "internal", message: "internal error".to_string() }
    }

    fn classified(class: ErrorClass, message: String) -> Self {
        match class {
            ErrorClass::Validation => RpcError::validation(message),
            ErrorClass::NotFound => RpcError::not_found(message),
            ErrorClass::Internal => RpcError::internal(),
        }
    }
}

impl From<BookmarkError> for RpcError {
    fn from(e: BookmarkError) -> Self {
        if !e.is_client_error() {
            error!(error = %e, "bookmark storage failure");
        }
        RpcError::classified(e.class(), e.to_string())
    }
}

impl From<CategoryError> for RpcError {
    fn from(e: CategoryError) -> Self {
        if !e.is_client_error() {
            error!(error = %e, "category storage failure");
        }
        RpcError::classified(e.class(), e.to_string())
    }
}

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RpcError::validation(format!("missing {key}")))
}

fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str()).filter(|s| !s.trim().is_empty())
}

fn to_json<T: Serialize>(key: &str, value: &T) -> Result<Value, RpcError> {
    let value = serde_json::to_value(value).map_err(|e| {
        error!(error = %e, "response serialization failed");
        RpcError::internal()
    })?;
    Ok(json!({ key: value }))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, RpcError> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        "health" => match app.db.ping() {
            Ok(()) => Ok(json!({
                "status": "healthy",
                "database": "connected",
                "version": env!("CARGO_PKG_VERSION"),
            })),
            Err(e) => {
                error!(error = %e, "health check failed");
                Err(RpcError::internal())
            }
        },

        // ─── Bookmarks ───
        "bookmark.add" => {
            let user_id = required_str(params, "user_id")?;
            let url = required_str(params, "url").map_err(|_| RpcError::validation("URL is required"))?;
            let tags = params.get("tags").and_then(|v| v.as_str());
            let category_id = optional_str(params, "category_id").or_else(|| optional_str(params, "categoryId"));
            let bookmark = app.pipeline.add_bookmark(user_id, url, tags, category_id).await?;
            to_json("bookmark", &bookmark)
        }
        "bookmark.list" => {
            let user_id = required_str(params, "user_id")?;
            let conn = app.db.connection();
            let mgr = BookmarkManager::new(&conn);
            let category_id = optional_str(params, "category_id").or_else(|| optional_str(params, "categoryId"));
            let bookmarks = match (optional_str(params, "tag"), category_id) {
                (Some(tag), _) => mgr.list_for_user_by_tag_substring(user_id, tag)?,
                (None, Some(cid)) => mgr.list_for_user_by_category(user_id, cid)?,
                (None, None) => mgr.list_for_user(user_id)?,
            };
            to_json("bookmarks", &bookmarks)
        }
        "bookmark.get" => {
            let user_id = required_str(params, "user_id")?;
            let id = required_str(params, "id")?;
            let conn = app.db.connection();
            let bookmark = BookmarkManager::new(&conn).get_by_id(id, user_id)?;
            to_json("bookmark", &bookmark)
        }
        "bookmark.update" => {
            let user_id = required_str(params, "user_id")?;
            let id = required_str(params, "id")?;
            let patch: BookmarkPatch = serde_json::from_value(params.clone())
                .map_err(|e| RpcError::validation(format!("invalid patch: {e}")))?;
            let conn = app.db.connection();
            let bookmark = BookmarkManager::new(&conn).update(id, user_id, patch)?;
            to_json("bookmark", &bookmark)
        }
        "bookmark.delete" => {
            let user_id = required_str(params, "user_id")?;
            let id = required_str(params, "id")?;
            let conn = app.db.connection();
            BookmarkManager::new(&conn).delete(id, user_id)?;
            Ok(json!({"ok": true}))
        }

        // ─── Categories ───
        "category.create" => {
            let user_id = required_str(params, "user_id")?;
            let input = NewCategory {
                name: params.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                color: optional_str(params, "color").map(str::to_string),
                parent_id: optional_str(params, "parent_id")
                    .or_else(|| optional_str(params, "parentId"))
                    .map(str::to_string),
            };
            let conn = app.db.connection();
            let category = CategoryManager::new(&conn).create(user_id, input)?;
            to_json("category", &category)
        }
        "category.list" => {
            let user_id = required_str(params, "user_id")?;
            let conn = app.db.connection();
            let categories = CategoryManager::new(&conn).list_for_user(user_id)?;
            to_json("categories", &categories)
        }
        "category.get" => {
            let user_id = required_str(params, "user_id")?;
            let id = required_str(params, "id")?;
            let conn = app.db.connection();
            let category = CategoryManager::new(&conn).get_by_id(id, user_id)?;
            to_json("category", &category)
        }
        "category.tree" => {
            let user_id = required_str(params, "user_id")?;
            let conn = app.db.connection();
            let tree = CategoryManager::new(&conn).tree(user_id)?;
            to_json("categories", &tree)
        }
        "category.update" => {
            let user_id = required_str(params, "user_id")?;
            let id = required_str(params, "id")?;
            let patch: CategoryPatch = serde_json::from_value(params.clone())
                .map_err(|e| RpcError::validation(format!("invalid patch: {e}")))?;
            let conn = app.db.connection();
            let category = CategoryManager::new(&conn).update(id, user_id, patch)?;
            to_json("category", &category)
        }
        "category.delete" => {
            let user_id = required_str(params, "user_id")?;
            let id = required_str(params, "id")?;
            let conn = app.db.connection();
            CategoryManager::new(&conn).delete(id, user_id)?;
            Ok(json!({"ok": true}))
        }

        _ => Err(RpcError::validation(format!("unknown method: {method}"))),
    }
}
