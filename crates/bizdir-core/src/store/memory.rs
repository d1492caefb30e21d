//! In-process record store.
//!
//! Holds collections of JSON documents and evaluates filters locally. Used for
//! fixture-driven runs and as the test double for the aggregator. Individual
//! collections can be made to fail to exercise degraded refreshes.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{Document, Filter, RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    failures: RwLock<HashMap<String, String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object mapping collection ids to document arrays.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            anyhow::bail!("Fixture must be a JSON object keyed by collection id");
        };

        let store = Self::new();
        for (collection_id, documents) in map {
            let Value::Array(documents) = documents else {
                anyhow::bail!("Fixture collection '{}' must be an array", collection_id);
            };
            store.insert(collection_id, documents);
        }
        Ok(store)
    }

    /// Load a fixture file (see [`MemoryRecordStore::from_json`]).
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse fixture file: {}", path.display()))?;
        Self::from_json(value)
    }

    /// Replace the documents of a collection.
    pub fn insert(&self, collection_id: impl Into<String>, documents: Vec<Document>) {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection_id.into(), documents);
    }

    /// Make every read of `collection_id` fail until [`MemoryRecordStore::restore`] is called.
    pub fn fail(&self, collection_id: impl Into<String>, reason: impl Into<String>) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection_id.into(), reason.into());
    }

    pub fn restore(&self, collection_id: &str) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(collection_id);
    }
}

/// Order JSON values of the same kind; mismatched or missing values sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn apply_filters(mut documents: Vec<Document>, filters: &[Filter]) -> Vec<Document> {
    for filter in filters {
        match filter {
            Filter::Equal { attribute, value } => {
                documents.retain(|doc| doc.get(attribute) == Some(value));
            }
            Filter::OrderAsc(attribute) => {
                documents.sort_by(|a, b| compare_values(a.get(attribute), b.get(attribute)));
            }
            Filter::OrderDesc(attribute) => {
                documents.sort_by(|a, b| match (a.get(attribute), b.get(attribute)) {
                    (Some(_), Some(_)) => compare_values(b.get(attribute), a.get(attribute)),
                    (x, y) => compare_values(x, y),
                });
            }
            Filter::Offset(offset) => {
                documents = documents.into_iter().skip(*offset).collect();
            }
            Filter::Limit(limit) => documents.truncate(*limit),
        }
    }
    documents
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self, collection_id: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        if let Some(reason) = self
            .failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection_id)
        {
            return Err(StoreError::Unavailable(reason.clone()));
        }

        let documents = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection_id)
            .cloned()
            .unwrap_or_default();

        Ok(apply_filters(documents, filters))
    }
}
