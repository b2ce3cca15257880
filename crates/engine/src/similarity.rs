//! Cosine Similarity Engine
//!
//! Builds square user-user or item-item similarity matrices from the rating
//! store. Each entity vector is L2-normalized (zero vectors are left alone,
//! so unobserved entities get an all-zero similarity row) and the full matrix
//! is the product of the normalized matrix with its own transpose.

use crate::store::RatingStore;
use ndarray::Array2;
use readnext_core::{ReadNextError, Result};

/// Which axis of the rating matrix a similarity matrix ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Users,
    Items,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Users => "user",
            Axis::Items => "item",
        }
    }
}

/// Symmetric cosine similarity matrix over users or items.
///
/// Entries are non-negative in practice (ratings are positive) and the
/// diagonal is maximal in its row. Read-only after construction.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    axis: Axis,
    matrix: Array2<f32>,
}

impl SimilarityMatrix {
    /// Compute the full similarity matrix for the chosen axis.
    pub fn build(store: &RatingStore, axis: Axis) -> Self {
        let (rows, cols) = match axis {
            Axis::Users => (store.num_users(), store.num_items()),
            Axis::Items => (store.num_items(), store.num_users()),
        };

        let mut normalized = Array2::<f32>::zeros((rows, cols));
        for a in 0..rows {
            // Bounds hold by construction, so the store accessors cannot fail.
            let ratings = match axis {
                Axis::Users => store.ratings_by_user(a),
                Axis::Items => store.ratings_for_item(a),
            };
            if let Ok(ratings) = ratings {
                for &(b, rating) in ratings {
                    normalized[[a, b]] = rating;
                }
            }
        }

        for mut row in normalized.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        let matrix = normalized.dot(&normalized.t());
        Self { axis, matrix }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of entities the matrix ranges over.
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// Cosine similarity between two entities on this axis.
    pub fn get(&self, a: usize, b: usize) -> Result<f32> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.matrix[[a, b]])
    }

    /// The `k` entities most similar to `a`, excluding `a` itself,
    /// sorted by similarity descending with ties broken by ascending index.
    pub fn most_similar(&self, a: usize, k: usize) -> Result<Vec<(usize, f32)>> {
        self.check(a)?;
        let row = self.matrix.row(a);
        let mut neighbors: Vec<(usize, f32)> = row
            .iter()
            .enumerate()
            .filter(|(b, _)| *b != a)
            .map(|(b, &sim)| (b, sim))
            .collect();
        neighbors.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(ReadNextError::InvalidIndex {
                axis: self.axis.as_str(),
                index,
                len: self.len(),
            });
        }
        Ok(())
    }
}
