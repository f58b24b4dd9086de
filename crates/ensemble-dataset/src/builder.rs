//! Example builder: the per-access transformation from one outfit into a
//! (visible, masked) training example.
//!
//! Slot projection writes each outfit item into its category's slot, then
//! mask selection converts a shuffled subset of the filled slots into
//! prediction targets. The shuffle draws from a caller-supplied generator, so
//! concurrent builders over different outfits never share mutable state.

use std::sync::Arc;

use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;

use ensemble_catalog::index::CatalogIndex;
use ensemble_core::types::{CategorySet, MaskedRatio, Outfit, SlotPolicy};

/// One training example: a fixed per-category view of a single outfit.
///
/// All four fields have the slot count as their leading dimension. A slot
/// that no outfit item fills has `slot_items == -1`, a zero embedding row,
/// and both masks false; such slots carry no loss signal downstream.
/// `visible` and `target` are never both true for the same slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Catalog position per slot, -1 if the slot is unfilled.
    pub slot_items: Vec<i64>,
    /// Embedding per slot, shape `(slots, dim)`; zero rows for unfilled slots.
    pub slot_embeddings: Array2<f32>,
    /// Slots whose item remains visible to the model.
    pub visible: Vec<bool>,
    /// Slots whose item the model must predict.
    pub target: Vec<bool>,
}

/// Builds examples from outfits against a fixed catalog and category set.
#[derive(Debug, Clone)]
pub struct ExampleBuilder {
    index: Arc<CatalogIndex>,
    categories: CategorySet,
    masked_ratio: MaskedRatio,
    policy: SlotPolicy,
}

impl ExampleBuilder {
    pub fn new(
        index: Arc<CatalogIndex>,
        categories: CategorySet,
        masked_ratio: MaskedRatio,
        policy: SlotPolicy,
    ) -> Self {
        Self {
            index,
            categories,
            masked_ratio,
            policy,
        }
    }

    /// Number of slots in every produced example.
    pub fn slots(&self) -> usize {
        self.categories.len()
    }

    /// Build one example from an outfit.
    ///
    /// Pure apart from the draws taken from `rng`: the same outfit and the
    /// same generator state always produce the same example.
    pub fn build<R: Rng + ?Sized>(&self, outfit: &Outfit, rng: &mut R) -> Example {
        let slots = self.categories.len();
        let mut slot_items = vec![-1i64; slots];
        let mut slot_embeddings = Array2::<f32>::zeros((slots, self.index.dim()));
        let mut visible = vec![false; slots];
        let mut target = vec![false; slots];

        // Slot projection. Collisions follow the configured policy; under
        // Reject the outfit catalog has already discarded colliding outfits,
        // so any residual collision falls through to keep-last.
        for &position in &outfit.items {
            let slot = match self
                .index
                .category(position)
                .and_then(|category| self.categories.slot(category))
            {
                Some(slot) => slot,
                None => continue,
            };
            if visible[slot] && self.policy == SlotPolicy::KeepFirst {
                continue;
            }
            slot_items[slot] = position as i64;
            slot_embeddings
                .row_mut(slot)
                .assign(&self.index.embedding(position));
            visible[slot] = true;
        }

        // Mask selection over the filled slots, in shuffled order.
        let mut available: Vec<usize> = (0..slots).filter(|&s| visible[s]).collect();
        available.shuffle(rng);

        let quota = (self.masked_ratio.0 * available.len() as f32).ceil() as usize;
        let masked = quota.max(1).min(available.len().saturating_sub(1));
        for &slot in available.iter().take(masked) {
            visible[slot] = false;
            target[slot] = true;
        }

        Example {
            slot_items,
            slot_embeddings,
            visible,
            target,
        }
    }
}
