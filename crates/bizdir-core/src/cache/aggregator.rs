//! The aggregator: one cache instance owned by the composing application.
//!
//! `fetch_all` fans out six collection reads with `tokio::join!`, folds each
//! failed read to an empty collection, and swaps the decoded collections in
//! as a single snapshot. Everything else reads that snapshot without I/O.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use super::merge::{merge_views, with_image_url, MergeContext};
use super::{AggregationError, CacheStatus, CollectionReport, FetchReport, Snapshot};
use crate::config::Config;
use crate::models::scoped::filter_scoped;
use crate::models::{Branch, Company, MergedCompanyView, Product, Scope, SocialMediaLink, WorkingDay};
use crate::store::{Collection, Document, Filter, ImageUrlResolver, RecordStore, StoreError};
use crate::utils::contains_ignore_case;

/// Clears the busy flag when dropped, whichever way the refresh exits.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

type ReadResult = Result<Vec<Document>, StoreError>;

pub struct Aggregator<S> {
    store: S,
    config: Config,
    images: ImageUrlResolver,
    snapshot: RwLock<Snapshot>,
    busy: AtomicBool,
    rng: Mutex<StdRng>,
    last_report: RwLock<Option<FetchReport>>,
    last_failure: RwLock<Option<AggregationError>>,
}

impl<S: RecordStore> Aggregator<S> {
    /// Create an empty cache in front of `store`. Nothing is read until the first `fetch_all`.
    pub fn new(store: S, config: Config) -> Self {
        let rng = match config.placeholder_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            images: ImageUrlResolver::new(&config),
            config,
            snapshot: RwLock::new(Snapshot::default()),
            busy: AtomicBool::new(false),
            rng: Mutex::new(rng),
            last_report: RwLock::new(None),
            last_failure: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Return the merged directory, refreshing from the store when needed.
    ///
    /// # Behavior
    /// - A refresh already in flight: returns the current snapshot's views immediately
    /// - Fresh cache and `force_refresh == false`: returns cached views, no store reads
    /// - Otherwise: reads all six collections concurrently; a failed read degrades
    ///   its collection to empty and is recorded in [`Aggregator::last_report`]
    /// - If the refresh itself fails, the cache is left as it was and an empty
    ///   list is returned; the failure is kept in [`Aggregator::last_failure`]
    ///
    /// Never returns an error.
    pub async fn fetch_all(&self, force_refresh: bool) -> Vec<MergedCompanyView> {
        if self.is_busy() {
            debug!("Refresh already in flight, serving current snapshot");
            return self.merge();
        }

        if !force_refresh && self.is_fresh() {
            debug!("Cache is fresh, skipping store reads");
            return self.merge();
        }

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!("Lost race for refresh, serving current snapshot");
            return self.merge();
        };

        let started_at = Utc::now();
        info!(force_refresh, "Refreshing company directory");

        match AssertUnwindSafe(self.fetch_collections()).catch_unwind().await {
            Ok(fetched) => {
                self.install(fetched, started_at);
                self.merge()
            }
            Err(panic) => {
                let e = AggregationError::Panicked(panic_message(panic.as_ref()));
                error!(error = %e, "Refresh failed, cached data left unchanged");
                *self.last_failure.write().unwrap_or_else(PoisonError::into_inner) = Some(e);
                Vec::new()
            }
        }
    }

    /// Mark the cache stale so the next `fetch_all` reads the store.
    /// Cached data stays visible until a refresh replaces it.
    pub fn invalidate(&self) {
        self.snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fetched_at = None;
        debug!("Cache invalidated");
    }

    async fn fetch_collections(&self) -> (Snapshot, Vec<CollectionReport>) {
        let company_filters = [Filter::newest_first()];
        let branch_filters = [
            Filter::equal("is_active", true),
            Filter::equal("disabled", false),
            Filter::newest_first(),
        ];

        let (companies, branches, working_days, products, social_media, verifications) = tokio::join!(
            self.read(Collection::Companies, &company_filters),
            self.read(Collection::Branches, &branch_filters),
            self.read(Collection::WorkingDays, &[]),
            self.read(Collection::Products, &[]),
            self.read(Collection::SocialMedia, &[]),
            self.read(Collection::Verifications, &[]),
        );

        let mut reports = Vec::with_capacity(Collection::ALL.len());
        let snapshot = Snapshot {
            companies: decode(Collection::Companies, companies, &mut reports),
            branches: decode(Collection::Branches, branches, &mut reports),
            working_days: decode(Collection::WorkingDays, working_days, &mut reports),
            products: decode(Collection::Products, products, &mut reports),
            social_media: decode(Collection::SocialMedia, social_media, &mut reports),
            verifications: keep_objects(Collection::Verifications, verifications, &mut reports),
            fetched_at: None,
        };

        (snapshot, reports)
    }

    /// Read one collection, bounded by the configured timeout if any.
    async fn read(&self, collection: Collection, filters: &[Filter]) -> ReadResult {
        let collection_id = self.config.collections.id(collection);
        let read = self.store.list(collection_id, filters);

        match self.config.read_timeout() {
            Some(after) => tokio::time::timeout(after, read).await.unwrap_or_else(|_| {
                Err(StoreError::Timeout {
                    collection: collection_id.to_string(),
                    after,
                })
            }),
            None => read.await,
        }
    }

    /// Swap in a freshly fetched snapshot and record its report.
    /// The swap is a single assignment, so a poisoned lock still holds a whole snapshot.
    fn install(
        &self,
        (mut snapshot, collections): (Snapshot, Vec<CollectionReport>),
        started_at: DateTime<Utc>,
    ) {
        let finished_at = Utc::now();
        snapshot.fetched_at = Some(finished_at);

        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;

        let report = FetchReport {
            started_at,
            finished_at,
            collections,
        };
        info!(
            records = report.total_records(),
            degraded = ?report.degraded_collections(),
            elapsed_ms = report.elapsed_ms(),
            "Refresh complete"
        );

        *self.last_report.write().unwrap_or_else(PoisonError::into_inner) = Some(report);
        *self.last_failure.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // =========================================================================
    // Merged views
    // =========================================================================

    /// Join the cached collections into one view per branch with a known company.
    /// No I/O; placeholder fields draw from the aggregator's RNG.
    pub fn merge(&self) -> Vec<MergedCompanyView> {
        let snapshot = self.read_snapshot();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let ctx = MergeContext {
            verification: &self.config.verification_fields,
            images: &self.images,
        };
        merge_views(&snapshot, &ctx, &mut *rng)
    }

    pub fn view(&self, branch_id: &str) -> Option<MergedCompanyView> {
        self.merge().into_iter().find(|v| v.branch_id() == branch_id)
    }

    pub fn online_views(&self) -> Vec<MergedCompanyView> {
        self.merge().into_iter().filter(|v| v.branch.is_online).collect()
    }

    pub fn active_views(&self) -> Vec<MergedCompanyView> {
        self.merge().into_iter().filter(|v| v.branch.is_active).collect()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn company(&self, company_id: &str) -> Option<Company> {
        self.read_snapshot().company(company_id).cloned()
    }

    pub fn branch(&self, branch_id: &str) -> Option<Branch> {
        self.read_snapshot().branch(branch_id).cloned()
    }

    pub fn companies(&self) -> Vec<Company> {
        self.read_snapshot().companies.clone()
    }

    /// Companies whose name or email contains `query`, ignoring case.
    /// The query is matched as given, surrounding whitespace included.
    pub fn search_companies(&self, query: &str) -> Vec<Company> {
        self.read_snapshot()
            .companies
            .iter()
            .filter(|c| {
                contains_ignore_case(&c.name, query)
                    || c.email.as_deref().is_some_and(|email| contains_ignore_case(email, query))
            })
            .cloned()
            .collect()
    }

    pub fn working_days(&self, scope: &Scope) -> Vec<WorkingDay> {
        filter_scoped(&self.read_snapshot().working_days, scope)
    }

    /// Products in scope, with image references resolved.
    pub fn products(&self, scope: &Scope) -> Vec<Product> {
        filter_scoped(&self.read_snapshot().products, scope)
            .into_iter()
            .map(|p| with_image_url(p, &self.images))
            .collect()
    }

    pub fn social_media(&self, scope: &Scope) -> Vec<SocialMediaLink> {
        filter_scoped(&self.read_snapshot().social_media, scope)
    }

    pub fn resolve_image_url(&self, raw: &str) -> Option<String> {
        self.images.resolve(raw)
    }

    // =========================================================================
    // Status and diagnostics
    // =========================================================================

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn is_fresh(&self) -> bool {
        self.read_snapshot()
            .is_fresh(self.config.freshness_window(), Utc::now())
    }

    pub fn status(&self) -> CacheStatus {
        let fetched_at = self.read_snapshot().fetched_at;
        CacheStatus {
            busy: self.is_busy(),
            fetched_at,
            stale: !self.is_fresh(),
        }
    }

    /// Report of the last completed refresh, including degraded collections.
    pub fn last_report(&self) -> Option<FetchReport> {
        self.last_report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Failure of the most recent refresh attempt; cleared by the next successful one.
    pub fn last_failure(&self) -> Option<AggregationError> {
        self.last_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn read_snapshot(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fold a failed read to an empty collection, logging it.
fn degrade(collection: Collection, result: ReadResult) -> (Vec<Document>, Option<Arc<StoreError>>) {
    match result {
        Ok(documents) => {
            debug!(collection = %collection, count = documents.len(), "Collection fetched");
            (documents, None)
        }
        Err(e) => {
            warn!(collection = %collection, error = %e, "Collection fetch failed, using empty set");
            (Vec::new(), Some(Arc::new(e)))
        }
    }
}

/// Decode documents into typed records, skipping any that don't fit.
fn decode<T: DeserializeOwned>(
    collection: Collection,
    result: ReadResult,
    reports: &mut Vec<CollectionReport>,
) -> Vec<T> {
    let (documents, error) = degrade(collection, result);
    let received = documents.len();

    let records: Vec<T> = documents
        .into_iter()
        .filter_map(|document| match serde_json::from_value(document) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection = %collection, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect();

    reports.push(CollectionReport {
        collection,
        records: records.len(),
        skipped: received - records.len(),
        error,
    });
    records
}

/// Keep raw object documents for collections resolved at merge time.
fn keep_objects(
    collection: Collection,
    result: ReadResult,
    reports: &mut Vec<CollectionReport>,
) -> Vec<Document> {
    let (documents, error) = degrade(collection, result);
    let received = documents.len();
    let records: Vec<Document> = documents.into_iter().filter(Document::is_object).collect();

    if records.len() < received {
        warn!(collection = %collection, skipped = received - records.len(), "Skipping non-object documents");
    }

    reports.push(CollectionReport {
        collection,
        records: records.len(),
        skipped: received - records.len(),
        error,
    });
    records
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
