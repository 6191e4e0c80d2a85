//! Keyword classifier for ingredient names.
//!
//! Rules are evaluated in order and the first whose keyword occurs anywhere
//! in the lower-cased name wins, so `"peppercorn"` is veg (rule 3) before it
//! can be flavor (rule 5). Names no rule catches fall back to the
//! [knowledge base](crate::knowledge).

use crate::knowledge;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse ingredient category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Protein,
    Carb,
    Veg,
    Fruit,
    Flavor,
    Dairy,
    /// Listed in the knowledge base but caught by no rule.
    Known,
    Other,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Carb => "carb",
            Self::Veg => "veg",
            Self::Fruit => "fruit",
            Self::Flavor => "flavor",
            Self::Dairy => "dairy",
            Self::Known => "known",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the classifier concluded about one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationProfile {
    pub category: Category,
    pub storage_hint: &'static str,
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
    pub storage_hint: &'static str,
}

/// Ordered rule table. Order matters: overlapping keywords resolve to the
/// earlier row.
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        category: Category::Protein,
        keywords: &[
            "chicken", "beef", "pork", "fish", "egg", "tofu", "meat", "lamb", "shrimp", "salmon",
            "steak", "turkey",
        ],
        storage_hint: "Refrigerate immediately; cook within 2 days",
    },
    ClassificationRule {
        category: Category::Carb,
        keywords: &[
            "rice", "pasta", "bread", "quinoa", "oats", "noodle", "flour", "potato", "couscous",
            "grain",
        ],
        storage_hint: "Keep in a cool, dry place",
    },
    ClassificationRule {
        category: Category::Veg,
        keywords: &[
            "spinach", "kale", "lettuce", "carrot", "broccoli", "pepper", "onion", "garlic",
            "tomato", "cucumber", "zucchini", "cabbage", "veg",
        ],
        storage_hint: "Keep in crisper drawer",
    },
    ClassificationRule {
        category: Category::Fruit,
        keywords: &[
            "apple", "banana", "orange", "berry", "grape", "fruit", "lemon", "lime", "melon",
        ],
        storage_hint: "Countertop or fridge depending on ripeness",
    },
    ClassificationRule {
        category: Category::Flavor,
        keywords: &[
            "salt", "pepper", "oil", "sauce", "spice", "herb", "sugar", "honey", "vinegar",
        ],
        storage_hint: "Pantry shelf",
    },
    ClassificationRule {
        category: Category::Dairy,
        keywords: &["milk", "cheese", "yogurt", "cream", "butter"],
        storage_hint: "Refrigerate; check expiry",
    },
];

const KNOWN_HINT: &str = "Standard pantry/fridge rules";
const OTHER_HINT: &str = "Check label for storage instructions";

/// Classify an ingredient name. Total: every input gets a profile.
#[must_use]
pub fn classify(token: &str) -> ClassificationProfile {
    let lowered = token.to_lowercase();

    if let Some(rule) = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
    {
        return ClassificationProfile {
            category: rule.category,
            storage_hint: rule.storage_hint,
        };
    }

    if knowledge::lookup(&lowered).is_some() {
        ClassificationProfile {
            category: Category::Known,
            storage_hint: KNOWN_HINT,
        }
    } else {
        ClassificationProfile {
            category: Category::Other,
            storage_hint: OTHER_HINT,
        }
    }
}
