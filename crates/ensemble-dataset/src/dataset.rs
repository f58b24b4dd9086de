//! Indexable dataset surface over the validated outfits.
//!
//! This is the seam the batching harness drives: `len()` and
//! `get(i, rng) -> Example`. The catalog and outfit list are immutable after
//! construction, and every access takes its own random generator, so `get`
//! may be called concurrently from multiple workers.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use tracing::info;

use ensemble_catalog::index::CatalogIndex;
use ensemble_catalog::loader::{load_catalog_index, load_raw_outfits};
use ensemble_catalog::outfits::OutfitCatalog;
use ensemble_core::config::DatasetConfig;
use ensemble_core::error::Result;
use ensemble_core::types::{CategorySet, MaskedRatio, Outfit, SlotPolicy};

use crate::builder::{Example, ExampleBuilder};

/// The outfit-completion dataset: one example per validated outfit.
#[derive(Debug, Clone)]
pub struct OutfitDataset {
    index: Arc<CatalogIndex>,
    outfits: OutfitCatalog,
    builder: ExampleBuilder,
}

impl OutfitDataset {
    /// Assemble a dataset from already-built parts.
    pub fn new(
        index: Arc<CatalogIndex>,
        outfits: OutfitCatalog,
        categories: CategorySet,
        masked_ratio: MaskedRatio,
        policy: SlotPolicy,
    ) -> Self {
        let builder = ExampleBuilder::new(Arc::clone(&index), categories, masked_ratio, policy);
        Self {
            index,
            outfits,
            builder,
        }
    }

    /// Load catalog sources and one outfit split from a data directory and
    /// build the dataset described by `config`.
    pub fn load(data_dir: &Path, config: &DatasetConfig) -> Result<Self> {
        let categories = CategorySet::new(config.categories.clone())?;
        let index = Arc::new(load_catalog_index(data_dir, &categories)?);
        let records = load_raw_outfits(data_dir, config.disjoint, &config.split)?;
        let outfits =
            OutfitCatalog::from_records(&records, &index, &categories, config.slot_policy);

        info!(
            outfits = outfits.len(),
            split = %config.split,
            "Outfit dataset ready"
        );

        Ok(Self::new(
            index,
            outfits,
            categories,
            MaskedRatio::new(config.masked_ratio),
            config.slot_policy,
        ))
    }

    /// Number of examples (= validated outfits).
    pub fn len(&self) -> usize {
        self.outfits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfits.is_empty()
    }

    /// Number of slots in every example.
    pub fn slots(&self) -> usize {
        self.builder.slots()
    }

    /// The shared catalog index (e.g., for building a retrieval engine).
    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    /// The validated outfit backing example `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn outfit(&self, i: usize) -> &Outfit {
        self.outfits.get(i)
    }

    /// Build the example at index `i` using the caller's generator.
    ///
    /// # Panics
    /// Panics if `i` is out of range; that is a caller contract violation,
    /// not a recoverable condition.
    pub fn get<R: Rng + ?Sized>(&self, i: usize, rng: &mut R) -> Example {
        self.builder.build(self.outfits.get(i), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_core::types::{RawOutfit, SlotPolicy};
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn category_set() -> CategorySet {
        CategorySet::new(vec!["tops".to_string(), "bottoms".to_string()]).unwrap()
    }

    fn dataset() -> OutfitDataset {
        let ids: Vec<String> = (0..4).map(|i| format!("item{}", i)).collect();
        let embeddings = Array2::<f32>::eye(4);
        let metadata: HashMap<String, String> = [
            ("item0", "tops"),
            ("item1", "tops"),
            ("item2", "bottoms"),
            ("item3", "bottoms"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let index =
            Arc::new(CatalogIndex::new(ids, embeddings, &metadata, &category_set()).unwrap());

        let records = vec![
            RawOutfit {
                set_id: "a".to_string(),
                items: vec!["item0".to_string(), "item2".to_string()],
            },
            RawOutfit {
                set_id: "b".to_string(),
                items: vec!["item1".to_string(), "item3".to_string()],
            },
            RawOutfit {
                set_id: "tiny".to_string(),
                items: vec!["item0".to_string()],
            },
        ];
        let outfits = OutfitCatalog::from_records(
            &records,
            &index,
            &category_set(),
            SlotPolicy::KeepLast,
        );

        OutfitDataset::new(
            index,
            outfits,
            category_set(),
            MaskedRatio::new(0.5),
            SlotPolicy::KeepLast,
        )
    }

    #[test]
    fn test_len_counts_validated_outfits_only() {
        let dataset = dataset();
        // "tiny" has one resolvable item and never becomes an example.
        assert_eq!(dataset.len(), 2);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.slots(), 2);
    }

    #[test]
    fn test_get_is_deterministic_for_a_fixed_seed() {
        let dataset = dataset();
        let a = dataset.get(0, &mut StdRng::seed_from_u64(99));
        let b = dataset.get(0, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_get_splits_every_outfit() {
        let dataset = dataset();
        let mut rng = StdRng::seed_from_u64(17);
        for i in 0..dataset.len() {
            let example = dataset.get(i, &mut rng);
            assert_eq!(example.visible.iter().filter(|&&v| v).count(), 1);
            assert_eq!(example.target.iter().filter(|&&t| t).count(), 1);
        }
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_range_panics() {
        let dataset = dataset();
        dataset.get(100, &mut StdRng::seed_from_u64(0));
    }

    #[test]
    fn test_outfit_accessor() {
        let dataset = dataset();
        assert_eq!(dataset.outfit(1).set_id, "b");
    }
}
