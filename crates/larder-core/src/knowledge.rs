//! Static table of well-known ingredients.
//!
//! Backs the classifier fallback for names no keyword rule catches, and the
//! name suggestions offered while typing an ingredient.

use crate::classify::Category;
use crate::model::record::display_name;
use serde::Serialize;

/// One well-known ingredient with its nominal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownIngredient {
    pub name: &'static str,
    pub category: Category,
}

const fn known(name: &'static str, category: Category) -> KnownIngredient {
    KnownIngredient { name, category }
}

/// Every known ingredient, keyed by its lower-case name.
pub const KNOWN_INGREDIENTS: &[KnownIngredient] = &[
    known("roasted chicken", Category::Protein),
    known("ground beef", Category::Protein),
    known("salmon", Category::Protein),
    known("tofu", Category::Protein),
    known("spinach", Category::Veg),
    known("mushrooms", Category::Veg),
    known("broccoli", Category::Veg),
    known("avocado", Category::Veg),
    known("milk", Category::Dairy),
    known("heavy cream", Category::Dairy),
    known("eggs", Category::Protein),
];

/// Exact match on an already lower-cased name.
#[must_use]
pub fn lookup(lowered: &str) -> Option<&'static KnownIngredient> {
    KNOWN_INGREDIENTS.iter().find(|entry| entry.name == lowered)
}

/// Display names of known ingredients starting with `prefix`.
///
/// Matching ignores case and surrounding whitespace. An empty prefix returns
/// the whole table in declaration order.
#[must_use]
pub fn suggest(prefix: &str) -> Vec<String> {
    let prefix = prefix.trim().to_lowercase();
    KNOWN_INGREDIENTS
        .iter()
        .filter(|entry| entry.name.starts_with(&prefix))
        .map(|entry| display_name(entry.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup("heavy cream").map(|e| e.category), Some(Category::Dairy));
        assert!(lookup("cream").is_none());
        assert!(lookup("Heavy Cream").is_none());
    }

    #[test]
    fn suggest_filters_by_prefix_and_capitalizes() {
        assert_eq!(suggest("  SA"), vec!["Salmon".to_string()]);
        assert_eq!(suggest("r"), vec!["Roasted chicken".to_string()]);
        assert!(suggest("zz").is_empty());
    }

    #[test]
    fn empty_prefix_lists_everything() {
        assert_eq!(suggest("").len(), KNOWN_INGREDIENTS.len());
    }
}
