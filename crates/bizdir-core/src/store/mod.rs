//! Record store abstraction and implementations.
//!
//! The aggregator reads every collection through the `RecordStore` trait:
//!
//! - `RestRecordStore`: lists documents from the remote document database
//! - `MemoryRecordStore`: in-process collections for fixtures and tests
//!
//! Documents are loosely-typed JSON objects; decoding into models happens
//! in the aggregator so one malformed document never fails a whole read.

pub mod collection;
pub mod error;
pub mod memory;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

pub use collection::{Collection, CollectionIds};
pub use error::StoreError;
pub use memory::MemoryRecordStore;
pub use rest::RestRecordStore;
pub use storage::ImageUrlResolver;

/// A raw store document.
pub type Document = Value;

/// Attribute holding the store-assigned creation timestamp.
pub const CREATED_AT: &str = "$createdAt";

/// A query constraint passed through to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal { attribute: String, value: Value },
    OrderAsc(String),
    OrderDesc(String),
    Limit(usize),
    Offset(usize),
}

impl Filter {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equal {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Filter::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Filter::OrderDesc(attribute.into())
    }

    /// Newest-first by store creation time
    pub fn newest_first() -> Self {
        Self::order_desc(CREATED_AT)
    }

    /// Encode as a JSON query string understood by the document database.
    pub fn to_query(&self) -> String {
        let query = match self {
            Filter::Equal { attribute, value } => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Filter::OrderAsc(attribute) => json!({ "method": "orderAsc", "attribute": attribute }),
            Filter::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
            Filter::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
            Filter::Offset(offset) => json!({ "method": "offset", "values": [offset] }),
        };
        query.to_string()
    }
}

/// Read access to the external document database.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List the documents of a collection that satisfy `filters`, in the order they request.
    async fn list(&self, collection_id: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn list(&self, collection_id: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        (**self).list(collection_id, filters).await
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    async fn list(&self, collection_id: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        (**self).list(collection_id, filters).await
    }
}
