//! Loaders for the raw catalog and outfit sources.
//!
//! The data directory is expected to contain:
//! - `index_ids.json` — ordered array of item identifier strings
//! - `index_embeddings.json` — array of equal-length f32 arrays
//! - `item_metadata.json` — map from identifier to item metadata
//! - `disjoint/<split>.json` or `nondisjoint/<split>.json` — outfit records
//!
//! Any missing file, parse failure, or ragged embedding matrix surfaces as a
//! `Data` error; nothing is retried or silently skipped at this layer.

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;
use tracing::info;

use ensemble_core::error::{EnsembleError, Result};
use ensemble_core::types::{CategorySet, RawOutfit};

use crate::index::CatalogIndex;

/// Metadata record for one catalog item. Extra fields in the source file are
/// ignored; only the semantic category matters here.
#[derive(Debug, Clone, Deserialize)]
struct ItemMetadata {
    semantic_category: String,
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| EnsembleError::Data(format!("cannot read {}: {}", path.display(), e)))
}

fn parse_error(path: &Path, err: serde_json::Error) -> EnsembleError {
    EnsembleError::Data(format!("cannot parse {}: {}", path.display(), err))
}

/// Load the ordered item identifier list.
pub fn load_index_ids(data_dir: &Path) -> Result<Vec<String>> {
    let path = data_dir.join("index_ids.json");
    let ids: Vec<String> =
        serde_json::from_str(&read_to_string(&path)?).map_err(|e| parse_error(&path, e))?;
    info!(count = ids.len(), "Loaded catalog identifiers");
    Ok(ids)
}

/// Load the `(n, d)` embedding matrix. Rows must all have the same length.
pub fn load_index_embeddings(data_dir: &Path) -> Result<Array2<f32>> {
    let path = data_dir.join("index_embeddings.json");
    let rows: Vec<Vec<f32>> =
        serde_json::from_str(&read_to_string(&path)?).map_err(|e| parse_error(&path, e))?;

    let dim = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * dim);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(EnsembleError::Data(format!(
                "ragged embedding matrix in {}: row {} has length {}, expected {}",
                path.display(),
                i,
                row.len(),
                dim
            )));
        }
        flat.extend_from_slice(row);
    }

    let embeddings = Array2::from_shape_vec((rows.len(), dim), flat)
        .map_err(|e| EnsembleError::Data(format!("embedding matrix shape: {}", e)))?;
    info!(
        rows = embeddings.nrows(),
        dim = embeddings.ncols(),
        "Loaded catalog embeddings"
    );
    Ok(embeddings)
}

/// Load the identifier-to-category map.
pub fn load_item_metadata(data_dir: &Path) -> Result<HashMap<String, String>> {
    let path = data_dir.join("item_metadata.json");
    let records: HashMap<String, ItemMetadata> =
        serde_json::from_str(&read_to_string(&path)?).map_err(|e| parse_error(&path, e))?;
    let metadata = records
        .into_iter()
        .map(|(id, m)| (id, m.semantic_category))
        .collect::<HashMap<_, _>>();
    info!(count = metadata.len(), "Loaded item metadata");
    Ok(metadata)
}

/// Load all three catalog sources and build the index in one step.
pub fn load_catalog_index(data_dir: &Path, categories: &CategorySet) -> Result<CatalogIndex> {
    let ids = load_index_ids(data_dir)?;
    let embeddings = load_index_embeddings(data_dir)?;
    let metadata = load_item_metadata(data_dir)?;
    CatalogIndex::new(ids, embeddings, &metadata, categories)
}

/// Load the raw outfit records for one split of one partition.
pub fn load_raw_outfits(data_dir: &Path, disjoint: bool, split: &str) -> Result<Vec<RawOutfit>> {
    let partition = if disjoint { "disjoint" } else { "nondisjoint" };
    let path = data_dir.join(partition).join(format!("{}.json", split));
    let records: Vec<RawOutfit> =
        serde_json::from_str(&read_to_string(&path)?).map_err(|e| parse_error(&path, e))?;
    info!(count = records.len(), partition, split, "Loaded raw outfits");
    Ok(records)
}
