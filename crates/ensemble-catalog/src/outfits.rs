//! Outfit catalog: raw outfit records filtered down to validated outfits
//! whose items all resolve to categorized catalog positions.

use tracing::info;

use ensemble_core::types::{CategorySet, Outfit, RawOutfit, SlotPolicy};

use crate::index::CatalogIndex;

/// Validated outfits in input order. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct OutfitCatalog {
    outfits: Vec<Outfit>,
}

impl OutfitCatalog {
    /// Filter raw records into validated outfits.
    ///
    /// Each record keeps only the items whose identifier resolves to a
    /// categorized catalog position; records with fewer than 2 surviving
    /// items are discarded. Under `SlotPolicy::Reject`, records whose
    /// surviving items collide on a slot are discarded as well. Discards are
    /// counted, not errors — a partially unusable source file still loads.
    pub fn from_records(
        records: &[RawOutfit],
        index: &CatalogIndex,
        categories: &CategorySet,
        policy: SlotPolicy,
    ) -> Self {
        let mut outfits = Vec::new();
        let mut too_small = 0usize;
        let mut collisions = 0usize;

        for record in records {
            let items: Vec<usize> = record
                .items
                .iter()
                .filter_map(|id| index.categorized_position(id))
                .collect();

            if items.len() <= 1 {
                too_small += 1;
                continue;
            }

            if policy == SlotPolicy::Reject && has_slot_collision(&items, index, categories) {
                collisions += 1;
                continue;
            }

            outfits.push(Outfit {
                set_id: record.set_id.clone(),
                items,
            });
        }

        info!(
            kept = outfits.len(),
            too_small,
            collisions,
            "Outfit catalog built"
        );

        Self { outfits }
    }

    /// Number of validated outfits.
    pub fn len(&self) -> usize {
        self.outfits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfits.is_empty()
    }

    /// The outfit at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> &Outfit {
        &self.outfits[index]
    }

    /// All validated outfits in input order.
    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outfit> {
        self.outfits.iter()
    }
}

fn has_slot_collision(items: &[usize], index: &CatalogIndex, categories: &CategorySet) -> bool {
    let mut occupied = vec![false; categories.len()];
    for &position in items {
        let slot = index
            .category(position)
            .and_then(|category| categories.slot(category));
        if let Some(slot) = slot {
            if occupied[slot] {
                return true;
            }
            occupied[slot] = true;
        }
    }
    false
}
