//! Property-based tests for per-user isolation of bookmarks and categories.
//!
//! For any interleaving of two users' writes, neither user can read, update or
//! delete the other's records, and each user's listing contains exactly the
//! records they created.

use linkmark::database::Database;
use linkmark::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkmark::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use linkmark::types::bookmark::{BookmarkPatch, NewBookmark};
use linkmark::types::category::{CategoryPatch, NewCategory};
use linkmark::types::errors::{BookmarkError, CategoryError};
use proptest::prelude::*;

const USERS: [&str; 2] = ["alice", "bob"];

/// Strategy for a sequence of (owner index, host) pairs.
fn arb_writes() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((0usize..2, "[a-z]{3,10}"), 1..12)
}

fn new_bookmark(host: &str) -> NewBookmark {
    NewBookmark {
        url: format!("https://{host}.com"),
        title: host.to_string(),
        favicon: format!("https://{host}.com/favicon.ico"),
        summary: String::new(),
        tags: "t".to_string(),
        category_id: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn bookmarks_never_cross_users(writes in arb_writes()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let conn = db.connection();
        let mut mgr = BookmarkManager::new(&conn);

        let mut created: Vec<(usize, String)> = Vec::new();
        for (owner, host) in &writes {
            let bm = mgr.create(USERS[*owner], new_bookmark(host)).unwrap();
            created.push((*owner, bm.id));
        }

        for (idx, user) in USERS.iter().enumerate() {
            let listed = mgr.list_for_user(user).unwrap();
            let expected = created.iter().filter(|(o, _)| *o == idx).count();
            prop_assert_eq!(listed.len(), expected);
            prop_assert!(listed.iter().all(|b| b.user_id == *user));
        }

        for (owner, id) in &created {
            let stranger = USERS[1 - owner];
            prop_assert!(matches!(mgr.get_by_id(id, stranger), Err(BookmarkError::NotFound(_))));
            let patch = BookmarkPatch { title: Some("stolen".into()), ..Default::default() };
            prop_assert!(matches!(mgr.update(id, stranger, patch), Err(BookmarkError::NotFound(_))));
            prop_assert!(matches!(mgr.delete(id, stranger), Err(BookmarkError::NotFound(_))));
            prop_assert_ne!(mgr.get_by_id(id, USERS[*owner]).unwrap().title, "stolen");
        }
    }

    #[test]
    fn categories_never_cross_users(writes in arb_writes()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let conn = db.connection();
        let mut mgr = CategoryManager::new(&conn);

        let mut created: Vec<(usize, String)> = Vec::new();
        for (owner, name) in &writes {
            let input = NewCategory { name: name.clone(), color: None, parent_id: None };
            created.push((*owner, mgr.create(USERS[*owner], input).unwrap().id));
        }

        for (owner, id) in &created {
            let stranger = USERS[1 - owner];
            prop_assert!(matches!(mgr.get_by_id(id, stranger), Err(CategoryError::NotFound(_))));
            let patch = CategoryPatch { name: Some("stolen".into()), ..Default::default() };
            prop_assert!(matches!(mgr.update(id, stranger, patch), Err(CategoryError::NotFound(_))));
            prop_assert!(matches!(mgr.delete(id, stranger), Err(CategoryError::NotFound(_))));

            // A stranger cannot nest under it either.
            let child = NewCategory { name: "child".into(), color: None, parent_id: Some(id.clone()) };
            prop_assert!(matches!(mgr.create(stranger, child), Err(CategoryError::ParentNotFound(_))));
        }

        for (idx, user) in USERS.iter().enumerate() {
            let expected = created.iter().filter(|(o, _)| *o == idx).count();
            prop_assert_eq!(mgr.list_for_user(user).unwrap().len(), expected);
        }
    }
}
