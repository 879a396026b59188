//! Property-based tests for category tree construction.
//!
//! For any flat category list, including dangling parents, self-parents and
//! cycles, every category appears exactly once in the forest, and every child
//! sits under the parent it names.

use std::collections::HashMap;

use linkmark::managers::category_manager::build_tree;
use linkmark::types::category::{Category, CategoryNode};
use proptest::prelude::*;

/// Strategy for `n` categories whose parent is another index, a missing id or nothing.
fn arb_categories() -> impl Strategy<Value = Vec<Category>> {
    (1usize..20).prop_flat_map(|n| {
        prop::collection::vec(prop_oneof![Just(None), (0..n + 3).prop_map(Some)], n).prop_map(|parents| {
            parents
                .into_iter()
                .enumerate()
                .map(|(i, p)| Category {
                    id: format!("c{i}"),
                    user_id: "u1".to_string(),
                    name: format!("Category {i}"),
                    color: "#3B82F6".to_string(),
                    parent_id: p.map(|p| format!("c{p}")),
                    created_at: i as i64,
                })
                .collect()
        })
    })
}

fn collect(nodes: &[CategoryNode], parent: Option<&str>, out: &mut Vec<(String, Option<String>)>) {
    for node in nodes {
        out.push((node.category.id.clone(), parent.map(str::to_string)));
        collect(&node.children, Some(&node.category.id), out);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_category_appears_exactly_once(categories in arb_categories()) {
        let total = categories.len();
        let tree = build_tree(categories);

        let mut seen = Vec::new();
        collect(&tree, None, &mut seen);
        prop_assert_eq!(seen.len(), total);

        let mut ids: Vec<&String> = seen.iter().map(|(id, _)| id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }

    #[test]
    fn children_sit_under_their_named_parent(categories in arb_categories()) {
        let declared: HashMap<String, Option<String>> =
            categories.iter().map(|c| (c.id.clone(), c.parent_id.clone())).collect();
        let tree = build_tree(categories);

        let mut placed = Vec::new();
        collect(&tree, None, &mut placed);
        for (id, parent) in placed {
            if let Some(parent) = parent {
                prop_assert_eq!(declared[&id].as_deref(), Some(parent.as_str()));
            }
        }
    }

    #[test]
    fn dangling_parents_become_roots(categories in arb_categories()) {
        let ids: Vec<String> = categories.iter().map(|c| c.id.clone()).collect();
        let dangling: Vec<String> = categories
            .iter()
            .filter(|c| c.parent_id.as_ref().is_some_and(|p| !ids.contains(p)))
            .map(|c| c.id.clone())
            .collect();
        let tree = build_tree(categories);

        let roots: Vec<&str> = tree.iter().map(|n| n.category.id.as_str()).collect();
        for id in &dangling {
            prop_assert!(roots.contains(&id.as_str()), "{} should be a root", id);
        }
    }
}
