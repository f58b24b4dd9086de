//! Catalog index: the authoritative, read-only mapping from item identifiers
//! to embeddings, categories, and dense positions.
//!
//! Positions are assigned at build time and stable for the process lifetime;
//! they are the only handle used by the outfit catalog, example builder, and
//! retrieval engine. Identifiers are resolved exactly once, here.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use tracing::info;

use ensemble_core::error::{EnsembleError, Result};
use ensemble_core::types::CategorySet;

/// Per-item record joined from the raw identifier list and metadata map at
/// construction time. A `None` category means the item stays addressable by
/// position but is excluded from outfit construction.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub id: String,
    pub category: Option<String>,
}

/// Read-only catalog of items with L2-normalized embeddings.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    items: Vec<CatalogItem>,
    embeddings: Array2<f32>,
    by_id: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Build the index from an ordered identifier list, a matching `(n, d)`
    /// embedding matrix, and an identifier-to-category metadata map.
    ///
    /// Embedding rows are L2-normalized in place so that retrieval can use a
    /// plain dot product as cosine similarity. Zero rows are left unchanged.
    ///
    /// An item receives a category only if its identifier appears in the
    /// metadata map and the category belongs to `categories`; items failing
    /// either test keep their position but are skipped by outfit resolution.
    ///
    /// Returns a `Config` error if the identifier count does not match the
    /// matrix row count, or if the embedding dimensionality is zero.
    pub fn new(
        ids: Vec<String>,
        mut embeddings: Array2<f32>,
        metadata: &HashMap<String, String>,
        categories: &CategorySet,
    ) -> Result<Self> {
        if ids.len() != embeddings.nrows() {
            return Err(EnsembleError::Config(format!(
                "identifier count {} does not match embedding count {}",
                ids.len(),
                embeddings.nrows()
            )));
        }
        if embeddings.ncols() == 0 {
            return Err(EnsembleError::Config(
                "embedding dimensionality is zero".to_string(),
            ));
        }

        for mut row in embeddings.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row /= norm;
            }
        }

        let mut items = Vec::with_capacity(ids.len());
        let mut by_id = HashMap::with_capacity(ids.len());
        let mut categorized = 0usize;

        for (position, id) in ids.into_iter().enumerate() {
            let category = metadata
                .get(&id)
                .filter(|c| categories.contains(c))
                .cloned();
            if category.is_some() {
                categorized += 1;
            }
            by_id.insert(id.clone(), position);
            items.push(CatalogItem { id, category });
        }

        info!(
            items = items.len(),
            categorized,
            dim = embeddings.ncols(),
            "Catalog index built"
        );

        Ok(Self {
            items,
            embeddings,
            by_id,
        })
    }

    /// Number of items in the catalog.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Embedding dimensionality.
    pub fn dim(&self) -> usize {
        self.embeddings.ncols()
    }

    /// External identifier of the item at the given position.
    pub fn id(&self, position: usize) -> &str {
        &self.items[position].id
    }

    /// Category of the item at the given position, if it has one within the
    /// configured set.
    pub fn category(&self, position: usize) -> Option<&str> {
        self.items[position].category.as_deref()
    }

    /// Normalized embedding of the item at the given position.
    pub fn embedding(&self, position: usize) -> ArrayView1<'_, f32> {
        self.embeddings.row(position)
    }

    /// The full `(n, d)` normalized embedding matrix.
    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    /// Dense position of an identifier, regardless of category.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Dense position of an identifier, only if the item is categorized and
    /// therefore usable in outfits.
    pub fn categorized_position(&self, id: &str) -> Option<usize> {
        self.by_id
            .get(id)
            .copied()
            .filter(|&p| self.items[p].category.is_some())
    }
}
