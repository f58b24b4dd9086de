//! Ensemble dataset crate - example builder and the indexable dataset surface.
//!
//! Turns validated outfits into per-category (visible, masked) training
//! examples, one per access, with an explicit random source per call.

pub mod builder;
pub mod dataset;

pub use builder::{Example, ExampleBuilder};
pub use dataset::OutfitDataset;
