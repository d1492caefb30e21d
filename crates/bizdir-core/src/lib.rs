//! bizdir-core - company directory aggregation cache.
//!
//! Assembles a unified company view from six independently stored
//! collections (companies, branches, working days, products, social media
//! links, verification records) and keeps it fresh without re-reading the
//! store on every access.
//!
//! The composing application builds one [`Aggregator`] at startup and hands
//! out references to it:
//!
//! ```no_run
//! use bizdir_core::{Aggregator, Config, RestRecordStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store = RestRecordStore::new(&config)?;
//! let directory = Aggregator::new(store, config);
//!
//! for view in directory.fetch_all(false).await {
//!     println!("{} - {}", view.title(), view.time_away);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod geo;
pub mod models;
pub mod store;
pub mod utils;

pub use cache::{AggregationError, Aggregator, CacheStatus, CollectionReport, FetchReport};
pub use config::Config;
pub use models::{Branch, Company, Coordinates, MergedCompanyView, Product, Scope, SocialMediaLink, WorkingDay};
pub use store::{Collection, Filter, MemoryRecordStore, RecordStore, RestRecordStore, StoreError};
