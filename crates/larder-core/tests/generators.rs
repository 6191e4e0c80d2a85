use proptest::prelude::*;

/// Small name pool so generated sequences collide under case folding.
const BASE_NAMES: &[&str] = &[
    "milk",
    "salmon",
    "spinach",
    "heavy cream",
    "eggs",
    "rice",
    "widget",
    "éclair",
    "ångström crème",
    "jalapeño",
];

#[derive(Debug, Clone)]
pub enum StoreOp {
    Upsert {
        name: String,
        quantity: Option<String>,
        is_priority: bool,
    },
    Remove(String),
    Toggle(String),
}

/// A pool name with each letter's case chosen independently.
pub fn arb_cased_name() -> impl Strategy<Value = String> + Clone {
    (
        prop::sample::select(BASE_NAMES),
        prop::collection::vec(any::<bool>(), 16),
    )
        .prop_map(|(base, upper)| {
            base.chars()
                .zip(upper.into_iter().cycle())
                .flat_map(|(c, up)| {
                    let cased: Vec<char> = if up {
                        c.to_uppercase().collect()
                    } else {
                        vec![c]
                    };
                    cased
                })
                .collect()
        })
}

pub fn arb_quantity() -> impl Strategy<Value = Option<String>> + Clone {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[0-9]{1,3}(g|kg|ml|L| pcs)".prop_map(Some),
    ]
}

pub fn arb_store_op() -> impl Strategy<Value = StoreOp> + Clone {
    prop_oneof![
        3 => (arb_cased_name(), arb_quantity(), any::<bool>()).prop_map(
            |(name, quantity, is_priority)| StoreOp::Upsert {
                name,
                quantity,
                is_priority,
            }
        ),
        1 => arb_cased_name().prop_map(StoreOp::Remove),
        1 => arb_cased_name().prop_map(StoreOp::Toggle),
    ]
}

/// Free-text ingredient names, including ones no rule recognizes.
pub fn arb_item_name() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        prop::sample::select(BASE_NAMES).prop_map(ToString::to_string),
        "[a-zA-Z ]{1,16}",
    ]
}
