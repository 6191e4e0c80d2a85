use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantity stored when the caller gives none.
pub const DEFAULT_QUANTITY: &str = "1";

/// One ingredient held in the household inventory.
///
/// Names are unique under ASCII case folding; `quantity` is an opaque label
/// and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub is_priority: bool,
    pub added_at: DateTime<Utc>,
}

/// Upper-case the first character, leaving the rest untouched.
///
/// `"ground beef"` becomes `"Ground beef"`.
#[must_use]
pub fn display_name(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Case-folded lookup key, persisted as `nameKey` and uniquely indexed.
///
/// Uses Unicode lowercasing, so `ÉCLAIR` and `éclair` share a key.
#[must_use]
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a caller-supplied quantity label.
#[must_use]
pub fn normalize_quantity(quantity: Option<&str>) -> String {
    quantity
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_QUANTITY)
        .to_string()
}

/// Mint a new record id.
///
/// Ids are `inv-` followed by 12 hex characters of a blake3 digest over the
/// name, the write time, and a random nonce.
#[must_use]
pub fn mint_id(name: &str, at: DateTime<Utc>) -> String {
    let nonce: u64 = rand::random();
    let seed = format!("{}:{}:{nonce:016x}", fold_name(name), at.timestamp_micros());
    let digest = blake3::hash(seed.as_bytes()).to_hex().to_string();
    format!("inv-{}", &digest[..12])
}
