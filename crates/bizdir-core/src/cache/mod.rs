//! In-memory aggregation cache for the company directory.
//!
//! This module provides the `Aggregator`, which reads six collections from a
//! `RecordStore` concurrently, keeps them as one snapshot, and joins them into
//! `MergedCompanyView`s. Cached data is served without re-reading the store
//! until the freshness window (5 minutes by default) elapses.
//!
//! A failed collection read degrades that collection to empty; the failure
//! is kept in the `FetchReport` for the refresh.

pub mod aggregator;
pub mod error;
pub mod merge;
pub mod report;
pub mod snapshot;
pub mod status;
pub mod verification;

pub use aggregator::Aggregator;
pub use error::AggregationError;
pub use report::{CollectionReport, FetchReport};
pub use snapshot::Snapshot;
pub use status::CacheStatus;
pub use verification::{VerificationFields, VERIFIED_STATUS};
