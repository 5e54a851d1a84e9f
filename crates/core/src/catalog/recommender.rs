use std::collections::HashSet;

use crate::domain::product::{Product, PurchaseHistoryItem};

pub const RECOMMENDATION_LIMIT: usize = 10;

/// Exclusion-and-truncation baseline: everything the caller has not bought
/// yet, local products first, capped at `limit`.
#[derive(Clone, Copy, Debug)]
pub struct Recommender {
    limit: usize,
}

impl Default for Recommender {
    fn default() -> Self {
        Self { limit: RECOMMENDATION_LIMIT }
    }
}

impl Recommender {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn recommend(
        &self,
        local: Vec<Product>,
        external: Vec<Product>,
        history: &[PurchaseHistoryItem],
    ) -> Vec<Product> {
        let acquired: HashSet<&str> = history.iter().map(|item| item.id.as_str()).collect();

        local
            .into_iter()
            .chain(external)
            .filter(|product| !acquired.contains(product.id.to_string().as_str()))
            .take(self.limit)
            .collect()
    }
}
