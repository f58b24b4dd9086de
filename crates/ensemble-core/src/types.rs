use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EnsembleError, Result};

// =============================================================================
// Enums
// =============================================================================

/// What to do when one outfit carries two items of the same category.
///
/// A category maps to exactly one slot, so a second item competing for an
/// occupied slot has to be resolved by policy rather than silently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// The earliest item in outfit order keeps the slot.
    KeepFirst,
    /// The latest item in outfit order wins the slot (historical behavior).
    #[default]
    KeepLast,
    /// Discard the whole outfit when any two items collide on a slot.
    Reject,
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Target fraction of visible items to convert into prediction targets.
/// Range: 0.0 to 1.0; values outside are clamped on creation.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MaskedRatio(pub f32);

impl MaskedRatio {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }
}

// =============================================================================
// Category slots
// =============================================================================

/// Ordered set of category labels defining the fixed per-category slots.
///
/// Slot index i corresponds to the i-th label. The label->slot table is built
/// once at construction so the per-item lookup during example building is a
/// hash probe, not a scan of the label list.
#[derive(Clone, Debug)]
pub struct CategorySet {
    labels: Vec<String>,
    slots: HashMap<String, usize>,
}

impl CategorySet {
    /// Build a category set from an ordered list of labels.
    ///
    /// Returns a `Config` error if the list is empty or contains duplicates.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(EnsembleError::Config(
                "category set must not be empty".to_string(),
            ));
        }

        let mut slots = HashMap::with_capacity(labels.len());
        for (slot, label) in labels.iter().enumerate() {
            if slots.insert(label.clone(), slot).is_some() {
                return Err(EnsembleError::Config(format!(
                    "duplicate category label: {}",
                    label
                )));
            }
        }

        Ok(Self { labels, slots })
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Slot index for a category label, or None if the label is not in the set.
    pub fn slot(&self, label: &str) -> Option<usize> {
        self.slots.get(label).copied()
    }

    /// True if the label belongs to the configured set.
    pub fn contains(&self, label: &str) -> bool {
        self.slots.contains_key(label)
    }

    /// Label at the given slot index.
    pub fn label(&self, slot: usize) -> &str {
        &self.labels[slot]
    }

    /// All labels in slot order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

// =============================================================================
// Entity Structs (defined in ensemble-core for shared use)
// =============================================================================

/// A raw outfit record as it appears in the split files: a set label plus the
/// external identifiers of its items, before any catalog resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOutfit {
    pub set_id: String,
    pub items: Vec<String>,
}

/// A validated outfit: a set label plus the catalog positions of its items,
/// in the original relative order. Always holds at least 2 positions, all of
/// which carry a category from the configured set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub set_id: String,
    pub items: Vec<usize>,
}
