//! Jamo-aware substring filtering over the loaded catalog.

use crate::hangul::decompose;
use crate::state::CatalogItem;

/// A query decomposed once and matched against many names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    key: String,
}

impl SearchQuery {
    /// Surrounding whitespace is not part of the query, so a query of only
    /// spaces is empty and keeps every item.
    pub fn new(raw: &str) -> Self {
        Self {
            key: decompose(raw.trim()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.is_empty() || decompose(name).contains(&self.key)
    }
}

/// Positions of the items whose display name matches `query`, in list order.
pub fn filter_indices(items: &[CatalogItem], query: &str) -> Vec<usize> {
    let query = SearchQuery::new(query);
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| query.matches(&item.display_name))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn filter<'a>(items: &'a [CatalogItem], query: &str) -> Vec<&'a CatalogItem> {
    filter_indices(items, query)
        .into_iter()
        .map(|idx| &items[idx])
        .collect()
}
