//! Top-K similarity search over the catalog.
//!
//! Catalog embeddings are L2-normalized at index build time, so a plain dot
//! product ranks by cosine similarity. Callers supplying query vectors of
//! uneven magnitude should normalize them first if magnitude must not
//! influence the ranking.

use std::sync::Arc;

use ndarray::{ArrayBase, ArrayD, ArrayView1, Axis, Data, IxDyn};

use ensemble_catalog::index::CatalogIndex;
use ensemble_core::error::{EnsembleError, Result};

/// A single retrieval hit: a catalog position with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalHit {
    pub position: usize,
    pub score: f32,
}

/// Maps query embeddings to the most similar catalog positions.
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    index: Arc<CatalogIndex>,
}

impl RetrievalEngine {
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        Self { index }
    }

    /// The catalog this engine searches.
    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    /// Return the top-`k` catalog positions for every query vector.
    ///
    /// `queries` may have any leading shape as long as the trailing axis
    /// matches the catalog dimensionality; the output keeps the leading shape
    /// and replaces the trailing axis with `k`. All leading dimensions are
    /// flattened into one batch axis, ranked with a single batch-by-catalog
    /// matrix product, and unflattened again.
    ///
    /// Equal scores rank by ascending catalog position, so the result is
    /// deterministic for a fixed input.
    pub fn query_top_items<S>(&self, queries: &ArrayBase<S, IxDyn>, k: usize) -> Result<ArrayD<i64>>
    where
        S: Data<Elem = f32>,
    {
        let dim = queries.shape().last().copied().ok_or_else(|| {
            EnsembleError::Config("query tensor must have at least one axis".to_string())
        })?;
        if dim != self.index.dim() {
            return Err(EnsembleError::Config(format!(
                "query dimensionality {} does not match catalog dimensionality {}",
                dim,
                self.index.dim()
            )));
        }
        if k == 0 || k > self.index.len() {
            return Err(EnsembleError::Config(format!(
                "top_k {} must be between 1 and catalog size {}",
                k,
                self.index.len()
            )));
        }

        let batch = queries.len() / dim;
        let flat = queries
            .to_shape((batch, dim))
            .map_err(|e| EnsembleError::Config(format!("query tensor shape: {}", e)))?;
        let similarity = flat.dot(&self.index.embeddings().t());

        let mut out = Vec::with_capacity(batch * k);
        for row in similarity.axis_iter(Axis(0)) {
            let ranked = rank_descending(row);
            out.extend(ranked[..k].iter().map(|&p| p as i64));
        }

        let mut shape = queries.shape().to_vec();
        *shape.last_mut().expect("shape is non-empty") = k;
        ArrayD::from_shape_vec(IxDyn(&shape), out)
            .map_err(|e| EnsembleError::Config(format!("output tensor shape: {}", e)))
    }

    /// Top-`k` hits with scores for a single query vector.
    pub fn top_hits(&self, query: &[f32], k: usize) -> Result<Vec<RetrievalHit>> {
        if query.len() != self.index.dim() {
            return Err(EnsembleError::Config(format!(
                "query dimensionality {} does not match catalog dimensionality {}",
                query.len(),
                self.index.dim()
            )));
        }
        if k == 0 || k > self.index.len() {
            return Err(EnsembleError::Config(format!(
                "top_k {} must be between 1 and catalog size {}",
                k,
                self.index.len()
            )));
        }

        let query = ArrayView1::from(query);
        let scores = self.index.embeddings().dot(&query);
        let ranked = rank_descending(scores.view());

        Ok(ranked[..k]
            .iter()
            .map(|&position| RetrievalHit {
                position,
                score: scores[position],
            })
            .collect())
    }
}

/// Catalog positions sorted by descending score, ascending position on ties.
fn rank_descending(scores: ArrayView1<'_, f32>) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..scores.len()).collect();
    positions.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_core::types::CategorySet;
    use ndarray::{Array, Array2};
    use std::collections::HashMap;

    /// Catalog of `n` distinct unit vectors spread over the first two axes.
    fn catalog(n: usize, dim: usize) -> Arc<CatalogIndex> {
        let ids: Vec<String> = (0..n).map(|i| format!("item{}", i)).collect();
        let mut embeddings = Array2::<f32>::zeros((n, dim));
        for i in 0..n {
            let theta = i as f32 * 0.17;
            embeddings[[i, 0]] = theta.cos();
            embeddings[[i, 1]] = theta.sin();
        }
        let categories = CategorySet::new(vec!["tops".to_string()]).unwrap();
        Arc::new(CatalogIndex::new(ids, embeddings, &HashMap::new(), &categories).unwrap())
    }

    #[test]
    fn test_output_shape_follows_input() {
        let engine = RetrievalEngine::new(catalog(10, 4));
        let queries = Array::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| {
            (idx[0] + idx[1] + idx[2]) as f32 * 0.1
        });

        let result = engine.query_top_items(&queries, 3).unwrap();

        assert_eq!(result.shape(), &[2, 3, 3]);
        assert!(result.iter().all(|&p| (0..10).contains(&p)));
    }

    #[test]
    fn test_one_dimensional_query() {
        let engine = RetrievalEngine::new(catalog(10, 4));
        let query = Array::from_shape_fn(IxDyn(&[4]), |idx| if idx[0] == 0 { 1.0 } else { 0.0 });
        let result = engine.query_top_items(&query, 5).unwrap();
        assert_eq!(result.shape(), &[5]);
    }

    #[test]
    fn test_self_similarity_is_top_one() {
        let index = catalog(10, 4);
        let engine = RetrievalEngine::new(Arc::clone(&index));

        for position in 0..10 {
            let query = index
                .embedding(position)
                .to_owned()
                .into_shape_with_order(IxDyn(&[4]))
                .unwrap();
            let result = engine.query_top_items(&query, 1).unwrap();
            assert_eq!(result[[0]], position as i64, "position {}", position);
        }
    }

    #[test]
    fn test_k_larger_than_catalog_rejected() {
        let engine = RetrievalEngine::new(catalog(3, 4));
        let query = ArrayD::<f32>::zeros(IxDyn(&[1, 4]));
        assert!(matches!(
            engine.query_top_items(&query, 4),
            Err(EnsembleError::Config(_))
        ));
    }

    #[test]
    fn test_k_zero_rejected() {
        let engine = RetrievalEngine::new(catalog(3, 4));
        let query = ArrayD::<f32>::zeros(IxDyn(&[1, 4]));
        assert!(engine.query_top_items(&query, 0).is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let engine = RetrievalEngine::new(catalog(3, 4));
        let query = ArrayD::<f32>::zeros(IxDyn(&[1, 5]));
        assert!(matches!(
            engine.query_top_items(&query, 2),
            Err(EnsembleError::Config(_))
        ));
    }

    #[test]
    fn test_ties_break_by_ascending_position() {
        // Three identical catalog vectors: any query ranks them equal, so
        // they must come back in position order, every time.
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut embeddings = Array2::<f32>::zeros((3, 2));
        for i in 0..3 {
            embeddings[[i, 0]] = 1.0;
        }
        let categories = CategorySet::new(vec!["tops".to_string()]).unwrap();
        let index =
            Arc::new(CatalogIndex::new(ids, embeddings, &HashMap::new(), &categories).unwrap());
        let engine = RetrievalEngine::new(index);

        let query = Array::from_shape_fn(IxDyn(&[1, 2]), |idx| if idx[1] == 0 { 1.0 } else { 0.0 });
        let first = engine.query_top_items(&query, 3).unwrap();
        let second = engine.query_top_items(&query, 3).unwrap();

        assert_eq!(first.as_slice().unwrap(), &[0, 1, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_hits_scores_descend() {
        let index = catalog(10, 4);
        let engine = RetrievalEngine::new(Arc::clone(&index));

        let query: Vec<f32> = index.embedding(4).to_vec();
        let hits = engine.top_hits(&query, 5).unwrap();

        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0].position, 4);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_top_hits_dimension_mismatch() {
        let engine = RetrievalEngine::new(catalog(4, 4));
        assert!(engine.top_hits(&[1.0, 0.0], 2).is_err());
    }

    #[test]
    fn test_empty_batch() {
        let engine = RetrievalEngine::new(catalog(5, 4));
        let queries = ArrayD::<f32>::zeros(IxDyn(&[0, 4]));
        let result = engine.query_top_items(&queries, 2).unwrap();
        assert_eq!(result.shape(), &[0, 2]);
    }
}
