//! Two-day meal planning around expiring stock.
//!
//! The first expiring item drives the plan: its category picks a branch,
//! the branch supplies recipe templates and staple purchases, and the
//! pantry decides which of those purchases are actually needed.

use crate::classify::{Category, classify};
use crate::model::item::{PlanEntry, PlanItem};
use crate::model::record::{InventoryRecord, fold_name};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Secondary ingredient used when neither list offers one.
pub const GENERIC_STAPLES: &str = "Generic Staples";

/// Kilograms of waste avoided per expiring item, in tenths.
const WASTE_TENTHS_PER_ITEM: usize = 5;

/// Recipe family chosen from the primary item's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanBranch {
    Protein,
    Veg,
    Fruit,
    Dairy,
    Fallback,
}

impl PlanBranch {
    /// Total over categories; anything without its own branch falls back.
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        match category {
            Category::Protein => Self::Protein,
            Category::Veg => Self::Veg,
            Category::Fruit => Self::Fruit,
            Category::Dairy => Self::Dairy,
            Category::Carb | Category::Flavor | Category::Known | Category::Other => {
                Self::Fallback
            }
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Veg => "veg",
            Self::Fruit => "fruit",
            Self::Dairy => "dairy",
            Self::Fallback => "fallback",
        }
    }

    /// Items this branch's recipes lean on.
    #[must_use]
    pub const fn staples(self) -> &'static [&'static str] {
        self.template().staples
    }

    const fn template(self) -> &'static BranchTemplate {
        match self {
            Self::Protein => &PROTEIN,
            Self::Veg => &VEG,
            Self::Fruit => &FRUIT,
            Self::Dairy => &DAIRY,
            Self::Fallback => &FALLBACK,
        }
    }
}

/// Templates use `{main}`, `{secondary}` and `{qty}`; `{qty}` expands to
/// `" (label)"` or nothing.
struct BranchTemplate {
    day1_name: &'static str,
    day1_reason: &'static str,
    day2_name: &'static str,
    day2_reason: &'static str,
    staples: &'static [&'static str],
}

const PROTEIN: BranchTemplate = BranchTemplate {
    day1_name: "Pan-Seared {main} with {secondary}",
    day1_reason: "High heat kills bacteria on your {main}{qty}. Pair with {secondary} for a balanced meal.",
    day2_name: "{main} Fried Rice/Hash",
    day2_reason: "Chop leftover cooked {main} small and fry with rice/grains to refresh the flavor.",
    staples: &["Soy Sauce", "Ginger"],
};

const VEG: BranchTemplate = BranchTemplate {
    day1_name: "Rustic {main} & {secondary} Stir-Fry",
    day1_reason: "Sautéing all of the {main}{qty} extracts sweetness before it spoils.",
    day2_name: "Creamy {main} Soup",
    day2_reason: "Puree the leftovers to create a completely new texture.",
    staples: &["Cream or Coconut Milk"],
};

const FRUIT: BranchTemplate = BranchTemplate {
    day1_name: "Fresh {main} Salad",
    day1_reason: "Eat the {main}{qty} raw while it still has texture.",
    day2_name: "Warm {main} Compote",
    day2_reason: "Cook down the softening fruit into a sauce for yogurt or oats.",
    staples: &["Honey", "Cinnamon"],
};

const DAIRY: BranchTemplate = BranchTemplate {
    day1_name: "Creamy {main} Pasta",
    day1_reason: "Use the {main}{qty} to make a rich sauce.",
    day2_name: "{main} Pancakes/Savory Galette",
    day2_reason: "Incorporate into dough or batter.",
    staples: &["Pasta/Flour"],
};

const FALLBACK: BranchTemplate = BranchTemplate {
    day1_name: "Spiced {main} Skillet",
    day1_reason: "When in doubt, a hot skillet with spices makes {main}{qty} safe and tasty.",
    day2_name: "{main} Fritters",
    day2_reason: "Mash leftovers with binding agents to extend shelf life.",
    staples: &["Eggs", "Flour"],
};

/// Pantry basics every plan checks for.
const ALWAYS_NEEDED: &[(&str, &str)] = &[("oil", "Cooking Oil"), ("garlic", "Garlic")];

/// One planned meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub reason: String,
}

/// A two-day plan plus the purchases it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// `"0"` for an empty plan, otherwise `"{x.y} kg"`.
    pub waste_saved: String,
    /// `None` only for the empty plan.
    pub branch: Option<PlanBranch>,
    pub day1: Meal,
    pub day2: Meal,
    pub shopping_list: Vec<String>,
    pub tip: String,
}

impl Plan {
    fn empty() -> Self {
        Self {
            waste_saved: "0".to_string(),
            branch: None,
            day1: Meal {
                name: "No items selected.".to_string(),
                reason: String::new(),
            },
            day2: Meal {
                name: "-".to_string(),
                reason: String::new(),
            },
            shopping_list: Vec::new(),
            tip: String::new(),
        }
    }
}

/// Build the plan for `expiring` items given what the pantry holds.
///
/// Pure and deterministic. Quantities only decorate the reasons.
#[must_use]
pub fn generate_plan(expiring: &[PlanItem], pantry: &[PlanItem]) -> Plan {
    let expiring: Vec<PlanEntry> = expiring.iter().map(PlanItem::normalize).collect();
    let pantry: Vec<PlanEntry> = pantry.iter().map(PlanItem::normalize).collect();

    let Some(primary) = expiring.first() else {
        return Plan::empty();
    };
    let secondary = expiring
        .get(1)
        .or_else(|| pantry.first())
        .map_or(GENERIC_STAPLES, |entry| entry.name.as_str());

    let profile = classify(&primary.name);
    let branch = PlanBranch::for_category(profile.category);
    let template = branch.template();

    let qty = primary
        .quantity
        .as_deref()
        .map(|q| format!(" ({q})"))
        .unwrap_or_default();
    let slots = [
        ("{main}", primary.name.as_str()),
        ("{secondary}", secondary),
        ("{qty}", qty.as_str()),
    ];
    let fill = |text: &str| fill_template(text, &slots);

    Plan {
        waste_saved: format_waste_saved(expiring.len()),
        branch: Some(branch),
        day1: Meal {
            name: fill(template.day1_name),
            reason: fill(template.day1_reason),
        },
        day2: Meal {
            name: fill(template.day2_name),
            reason: fill(template.day2_reason),
        },
        shopping_list: shopping_list(template.staples, &pantry),
        tip: profile.storage_hint.to_string(),
    }
}

/// Substitute placeholders in one left-to-right pass. Inserted text is never
/// rescanned, so names containing `{main}` and friends come out verbatim.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some((key, value)) = slots.iter().find(|(key, _)| tail.starts_with(key)) {
            out.push_str(value);
            rest = &tail[key.len()..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn shopping_list(staples: &[&str], pantry: &[PlanEntry]) -> Vec<String> {
    let pantry_names: Vec<String> = pantry.iter().map(|e| e.name.to_lowercase()).collect();
    let pantry_has = |needle: &str| {
        let needle = needle.to_lowercase();
        pantry_names.iter().any(|name| name.contains(&needle))
    };

    let mut needed: Vec<&str> = staples.to_vec();
    for &(needle, item) in ALWAYS_NEEDED {
        if !pantry_has(needle) {
            needed.push(item);
        }
    }

    let mut seen = HashSet::new();
    needed
        .into_iter()
        .filter(|item| seen.insert(*item))
        .filter(|item| !pantry_has(*item))
        .map(ToString::to_string)
        .collect()
}

fn format_waste_saved(expiring: usize) -> String {
    let tenths = expiring * WASTE_TENTHS_PER_ITEM;
    format!("{}.{} kg", tenths / 10, tenths % 10)
}

/// Planner inputs after merging typed lists with the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanInputs {
    pub expiring: Vec<PlanItem>,
    pub pantry: Vec<PlanItem>,
}

/// Merge typed-in names with stored records.
///
/// Priority records join the expiring list after the typed names. Other
/// records join the pantry unless a pantry entry with the same folded name
/// is already there.
#[must_use]
pub fn gather_inputs(
    expiring: &[String],
    pantry: &[String],
    records: &[InventoryRecord],
) -> PlanInputs {
    let mut inputs = PlanInputs {
        expiring: expiring.iter().map(|name| PlanItem::from(name.as_str())).collect(),
        pantry: pantry.iter().map(|name| PlanItem::from(name.as_str())).collect(),
    };
    let mut pantry_keys: HashSet<String> = pantry.iter().map(|name| fold_name(name)).collect();

    for record in records {
        if record.is_priority {
            inputs.expiring.push(PlanItem::from(record));
        } else if pantry_keys.insert(fold_name(&record.name)) {
            inputs.pantry.push(PlanItem::from(record));
        }
    }
    inputs
}
