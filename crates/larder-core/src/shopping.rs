//! Shopping list grouping and export.

use crate::classify::{Category, classify};
use serde::Serialize;
use std::fmt;

/// Search URL an item name is appended to when no other is configured.
pub const DEFAULT_PURCHASE_URL: &str = "https://blinkit.com/s/?q=";

/// Aisle-style bucket for the shopping list, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    Produce,
    Protein,
    Dairy,
    Pantry,
}

impl Bucket {
    /// Buckets in the order they are shown.
    pub const ALL: [Self; 4] = [Self::Produce, Self::Protein, Self::Dairy, Self::Pantry];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Produce => "Produce",
            Self::Protein => "Protein",
            Self::Dairy => "Dairy",
            Self::Pantry => "Pantry",
        }
    }

    /// Veg and fruit are produce; anything without its own bucket is pantry.
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        match category {
            Category::Veg | Category::Fruit => Self::Produce,
            Category::Protein => Self::Protein,
            Category::Dairy => Self::Dairy,
            Category::Carb | Category::Flavor | Category::Known | Category::Other => {
                Self::Pantry
            }
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Items sharing a bucket, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingGroup {
    pub bucket: Bucket,
    pub items: Vec<String>,
}

/// Group `items` into buckets. Empty buckets are omitted.
#[must_use]
pub fn categorize<S: AsRef<str>>(items: &[S]) -> Vec<ShoppingGroup> {
    Bucket::ALL
        .iter()
        .filter_map(|&bucket| {
            let members: Vec<String> = items
                .iter()
                .map(AsRef::<str>::as_ref)
                .filter(|item| Bucket::for_category(classify(item).category) == bucket)
                .map(ToString::to_string)
                .collect();
            (!members.is_empty()).then_some(ShoppingGroup {
                bucket,
                items: members,
            })
        })
        .collect()
}

/// Purchase search link for one item.
#[must_use]
pub fn purchase_link(base: &str, item: &str) -> String {
    format!("{base}{}", urlencoding::encode(item))
}

/// Plain-text export: a `[Bucket]` header per group, one `- item` per line.
#[must_use]
pub fn share_text(groups: &[ShoppingGroup]) -> String {
    let mut out = String::new();
    for (idx, group) in groups.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", group.bucket));
        for item in &group.items {
            out.push_str(&format!("- {item}\n"));
        }
    }
    out
}
