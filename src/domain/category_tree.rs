//! Assembly of the flat category table into a tree.
//!
//! Categories reference their parent by id. The tree is built over an
//! arena of nodes with a parent-index lookup; traversal starts at the
//! roots and tracks visited nodes, so a corrupt parent chain (a cycle or
//! a dangling parent) can never recurse forever. Such nodes are reported
//! as unreachable instead of being attached anywhere.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::Category;

/// Category with its nested children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryNode {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    pub image_url: Option<String>,
    pub children: Vec<CategoryNode>,
}

/// Result of tree assembly
#[derive(Debug, Clone, Default)]
pub struct CategoryForest {
    pub roots: Vec<CategoryNode>,
    /// Ids of categories not reachable from any root
    pub unreachable: Vec<i32>,
}

/// Build the category forest, children ordered by `sort_order` then name.
pub fn build_category_tree(categories: Vec<Category>) -> CategoryForest {
    let index: HashMap<i32, usize> = categories
        .iter()
        .enumerate()
        .map(|(slot, category)| (category.id, slot))
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();

    for (slot, category) in categories.iter().enumerate() {
        match category.parent_id {
            None => roots.push(slot),
            Some(parent_id) => {
                if let Some(&parent_slot) = index.get(&parent_id) {
                    if parent_slot != slot {
                        children.entry(parent_slot).or_default().push(slot);
                    }
                }
            }
        }
    }

    let by_display_order = |a: &usize, b: &usize| {
        let (a, b) = (&categories[*a], &categories[*b]);
        a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name))
    };
    roots.sort_by(by_display_order);
    for siblings in children.values_mut() {
        siblings.sort_by(by_display_order);
    }

    let mut visited = HashSet::with_capacity(categories.len());
    let roots: Vec<CategoryNode> = roots
        .into_iter()
        .filter_map(|slot| assemble(slot, &categories, &children, &mut visited))
        .collect();

    let unreachable: Vec<i32> = categories
        .iter()
        .enumerate()
        .filter(|(slot, _)| !visited.contains(slot))
        .map(|(_, category)| category.id)
        .collect();

    if !unreachable.is_empty() {
        tracing::warn!(
            category_ids = ?unreachable,
            "Categories with a dangling or cyclic parent chain were left out of the tree"
        );
    }

    CategoryForest { roots, unreachable }
}

fn assemble(
    slot: usize,
    arena: &[Category],
    children: &HashMap<usize, Vec<usize>>,
    visited: &mut HashSet<usize>,
) -> Option<CategoryNode> {
    if !visited.insert(slot) {
        return None;
    }

    let category = &arena[slot];
    let nested = children
        .get(&slot)
        .map(|kids| {
            kids.iter()
                .filter_map(|&child| assemble(child, arena, children, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(CategoryNode {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
        parent_id: category.parent_id,
        sort_order: category.sort_order,
        image_url: category.image_url.clone(),
        children: nested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, parent_id: Option<i32>, sort_order: i32) -> Category {
        Category {
            id,
            name: format!("Category {}", id),
            slug: format!("category-{}", id),
            parent_id,
            sort_order,
            is_active: true,
            image_url: None,
        }
    }

    #[test]
    fn test_builds_nested_tree_in_sort_order() {
        let forest = build_category_tree(vec![
            category(1, None, 2),
            category(2, None, 1),
            category(3, Some(1), 5),
            category(4, Some(1), 3),
            category(5, Some(4), 1),
        ]);

        let root_ids: Vec<i32> = forest.roots.iter().map(|n| n.id).collect();
        assert_eq!(root_ids, vec![2, 1]);

        let first = &forest.roots[1];
        let child_ids: Vec<i32> = first.children.iter().map(|n| n.id).collect();
        assert_eq!(child_ids, vec![4, 3]);
        assert_eq!(first.children[0].children[0].id, 5);
        assert!(forest.unreachable.is_empty());
    }

    #[test]
    fn test_cycle_is_left_out() {
        let forest = build_category_tree(vec![
            category(1, None, 1),
            category(2, Some(3), 1),
            category(3, Some(2), 1),
            category(4, Some(4), 1),
        ]);

        assert_eq!(forest.roots.len(), 1);
        assert!(forest.roots[0].children.is_empty());
        let mut unreachable = forest.unreachable.clone();
        unreachable.sort();
        assert_eq!(unreachable, vec![2, 3, 4]);
    }

    #[test]
    fn test_dangling_parent_is_left_out() {
        let forest = build_category_tree(vec![category(1, None, 1), category(2, Some(99), 1)]);
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.unreachable, vec![2]);
    }
}
