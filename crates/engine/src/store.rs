//! Sparse Rating Store
//!
//! In-memory sparse user-item rating matrix. Built once from cleaned rating
//! triples and immutable afterwards; every derived artifact (similarity
//! matrices, latent factors) is recomputed from scratch if the ratings change.

use readnext_core::{RatingTriple, ReadNextError, Result};
use std::collections::HashMap;

/// Sparse mapping from (user, item) to an observed rating.
///
/// Absent entries mean "unobserved", never "rated zero"; zero-rating records
/// are filtered out upstream. Supports O(1)-ish point lookup plus iteration
/// over a user's row (items they rated) and an item's column (users who rated
/// it).
#[derive(Debug, Clone)]
pub struct RatingStore {
    entries: HashMap<(usize, usize), f32>,
    by_user: Vec<Vec<(usize, f32)>>,
    by_item: Vec<Vec<(usize, f32)>>,
    rating_sum: f64,
}

impl RatingStore {
    /// Build a store over dense index ranges `[0, num_users)` x `[0, num_items)`.
    ///
    /// Fails with `InvalidIndex` if any triple lies outside the declared
    /// ranges. Duplicate (user, item) pairs are not expected per upstream
    /// cleaning; if present, the last occurrence wins the point lookup.
    pub fn from_triples(
        num_users: usize,
        num_items: usize,
        triples: &[RatingTriple],
    ) -> Result<Self> {
        let mut entries = HashMap::with_capacity(triples.len());
        let mut by_user = vec![Vec::new(); num_users];
        let mut by_item = vec![Vec::new(); num_items];
        let mut rating_sum = 0.0f64;

        for triple in triples {
            if triple.user >= num_users {
                return Err(ReadNextError::InvalidIndex {
                    axis: "user",
                    index: triple.user,
                    len: num_users,
                });
            }
            if triple.item >= num_items {
                return Err(ReadNextError::InvalidIndex {
                    axis: "item",
                    index: triple.item,
                    len: num_items,
                });
            }

            entries.insert((triple.user, triple.item), triple.rating);
            by_user[triple.user].push((triple.item, triple.rating));
            by_item[triple.item].push((triple.user, triple.rating));
            rating_sum += f64::from(triple.rating);
        }

        Ok(Self {
            entries,
            by_user,
            by_item,
            rating_sum,
        })
    }

    pub fn num_users(&self) -> usize {
        self.by_user.len()
    }

    pub fn num_items(&self) -> usize {
        self.by_item.len()
    }

    /// Number of observed ratings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observed rating for (user, item), or `None` if unobserved.
    pub fn get(&self, user: usize, item: usize) -> Result<Option<f32>> {
        self.check_user(user)?;
        self.check_item(item)?;
        Ok(self.entries.get(&(user, item)).copied())
    }

    /// All (item, rating) pairs observed for a user, in insertion order.
    pub fn ratings_by_user(&self, user: usize) -> Result<&[(usize, f32)]> {
        self.check_user(user)?;
        Ok(&self.by_user[user])
    }

    /// All (user, rating) pairs observed for an item, in insertion order.
    pub fn ratings_for_item(&self, item: usize) -> Result<&[(usize, f32)]> {
        self.check_item(item)?;
        Ok(&self.by_item[item])
    }

    /// Mean of all observed ratings; 0.0 for an empty store.
    pub fn global_mean(&self) -> f32 {
        if self.entries.is_empty() {
            0.0
        } else {
            (self.rating_sum / self.entries.len() as f64) as f32
        }
    }

    pub(crate) fn check_user(&self, user: usize) -> Result<()> {
        if user >= self.num_users() {
            return Err(ReadNextError::InvalidIndex {
                axis: "user",
                index: user,
                len: self.num_users(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_item(&self, item: usize) -> Result<()> {
        if item >= self.num_items() {
            return Err(ReadNextError::InvalidIndex {
                axis: "item",
                index: item,
                len: self.num_items(),
            });
        }
        Ok(())
    }
}
