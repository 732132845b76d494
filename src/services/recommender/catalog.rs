use std::collections::HashMap;

use thiserror::Error;

use super::sparse::SparseVector;
use super::vectorizer::TermVectorSpace;
use crate::models::{AppId, CatalogItem, CatalogRow};

/// Catalog data problems found while building the index
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Catalog is empty")]
    EmptyCatalog,
    #[error("Catalog row {row} has no appid")]
    MissingId { row: usize },
    #[error("Catalog row {row} has invalid appid {value}")]
    InvalidId { row: usize, value: i64 },
    #[error("Catalog text produced an empty vocabulary")]
    EmptyVocabulary,
}

/// The item corpus and its fitted term-vector space.
///
/// Built once at startup and read-only afterwards, so it can be shared across
/// concurrent requests behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    items: Vec<CatalogItem>,
    vectors: Vec<SparseVector>,
    space: TermVectorSpace,
    rows_by_id: HashMap<AppId, usize>,
}

impl CatalogIndex {
    /// Validates raw store rows and builds the index from them
    pub fn from_rows(rows: Vec<CatalogRow>, max_features: usize) -> Result<Self, CatalogError> {
        let items = rows
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                let appid = raw.appid.ok_or(CatalogError::MissingId { row })?;
                let id = AppId::try_from(appid)
                    .map_err(|_| CatalogError::InvalidId { row, value: appid })?;
                Ok(CatalogItem {
                    id,
                    name: raw.name.unwrap_or_default(),
                    description: raw.description.unwrap_or_default(),
                    genres: raw.genres.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Self::build(items, max_features)
    }

    /// Fits the term-vector space over every item's text and vectorizes each item
    pub fn build(items: Vec<CatalogItem>, max_features: usize) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let texts: Vec<String> = items.iter().map(CatalogItem::text).collect();
        let space = TermVectorSpace::fit(texts.iter().map(String::as_str), max_features);
        if space.is_empty() {
            return Err(CatalogError::EmptyVocabulary);
        }

        let vectors: Vec<SparseVector> = texts.iter().map(|t| space.transform(t)).collect();

        // First occurrence wins for duplicate ids
        let mut rows_by_id = HashMap::with_capacity(items.len());
        let mut duplicates = 0usize;
        for (row, item) in items.iter().enumerate() {
            if rows_by_id.contains_key(&item.id) {
                duplicates += 1;
            } else {
                rows_by_id.insert(item.id, row);
            }
        }

        if duplicates > 0 {
            tracing::warn!(duplicates, "Catalog contains duplicate appids");
        }

        tracing::info!(
            items = items.len(),
            vocabulary = space.len(),
            "Catalog index built"
        );

        Ok(Self {
            items,
            vectors,
            space,
            rows_by_id,
        })
    }

    /// Projects arbitrary text into the fitted space without refitting
    pub fn vectorize(&self, text: &str) -> SparseVector {
        self.space.transform(text)
    }

    /// Row index of an appid
    pub fn lookup(&self, id: AppId) -> Option<usize> {
        self.rows_by_id.get(&id).copied()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, row: usize) -> &CatalogItem {
        &self.items[row]
    }

    pub fn vector(&self, row: usize) -> &SparseVector {
        &self.vectors[row]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.space.len()
    }
}
