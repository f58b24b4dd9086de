//! Ensemble catalog crate - catalog index, source loaders, and outfit filtering.
//!
//! Builds the read-only item catalog from the raw identifier, embedding, and
//! metadata sources, then filters raw outfit records down to outfits whose
//! items all resolve within it.

pub mod index;
pub mod loader;
pub mod outfits;

pub use index::{CatalogIndex, CatalogItem};
pub use loader::{load_catalog_index, load_raw_outfits};
pub use outfits::OutfitCatalog;
