//! Diagnostics for the most recent refresh.
//!
//! A degraded collection is still served (as empty), so callers that need
//! to tell "no data" from "read failed" look here.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::store::{Collection, StoreError};

/// Outcome of one collection read within a refresh.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub collection: Collection,
    /// Documents decoded into the snapshot
    pub records: usize,
    /// Documents the store returned that failed to decode
    pub skipped: usize,
    /// Set when the read failed and the collection degraded to empty
    pub error: Option<Arc<StoreError>>,
}

impl CollectionReport {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub collections: Vec<CollectionReport>,
}

impl FetchReport {
    pub fn collection(&self, collection: Collection) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.collection == collection)
    }

    pub fn is_degraded(&self) -> bool {
        self.collections.iter().any(CollectionReport::is_degraded)
    }

    pub fn degraded_collections(&self) -> Vec<Collection> {
        self.collections
            .iter()
            .filter(|c| c.is_degraded())
            .map(|c| c.collection)
            .collect()
    }

    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.records).sum()
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
