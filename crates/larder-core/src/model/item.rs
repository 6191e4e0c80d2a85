use super::record::InventoryRecord;
use serde::{Deserialize, Serialize};

/// An ingredient handed to the planner.
///
/// Free-text entry produces bare names; the inventory produces records that
/// also carry a quantity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanItem {
    Named(String),
    Record {
        name: String,
        #[serde(default)]
        quantity: Option<String>,
    },
}

impl PlanItem {
    /// Display name of the item regardless of shape.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Record { name, .. } => name,
        }
    }

    /// Quantity label, if one was given and is not blank.
    #[must_use]
    pub fn quantity(&self) -> Option<&str> {
        match self {
            Self::Named(_) => None,
            Self::Record { quantity, .. } => quantity
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty()),
        }
    }

    /// Collapse either shape into the uniform planner entry.
    #[must_use]
    pub fn normalize(&self) -> PlanEntry {
        PlanEntry {
            name: self.name().trim().to_string(),
            quantity: self.quantity().map(ToString::to_string),
        }
    }
}

impl From<&str> for PlanItem {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for PlanItem {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<&InventoryRecord> for PlanItem {
    fn from(record: &InventoryRecord) -> Self {
        Self::Record {
            name: record.name.clone(),
            quantity: Some(record.quantity.clone()),
        }
    }
}

/// Uniform planner input produced by [`PlanItem::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub name: String,
    pub quantity: Option<String>,
}
