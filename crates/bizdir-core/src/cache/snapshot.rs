use chrono::{DateTime, Utc};

use crate::models::{Branch, Company, Product, SocialMediaLink, WorkingDay};
use crate::store::Document;

/// Every cached collection from one refresh. Replaced as a unit.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub companies: Vec<Company>,
    pub branches: Vec<Branch>,
    pub working_days: Vec<WorkingDay>,
    pub products: Vec<Product>,
    pub social_media: Vec<SocialMediaLink>,
    /// Kept raw; field names are resolved at merge time
    pub verifications: Vec<Document>,
    /// When this snapshot was fetched. Cleared by invalidation.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn is_fresh(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.fetched_at.is_some_and(|at| now - at < window)
    }

    pub fn company(&self, company_id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.company_id == company_id)
    }

    pub fn branch(&self, branch_id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.branch_id == branch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let mut snapshot = Snapshot::default();
        assert!(!snapshot.is_fresh(Duration::minutes(5), now));

        snapshot.fetched_at = Some(now - Duration::minutes(4));
        assert!(snapshot.is_fresh(Duration::minutes(5), now));

        snapshot.fetched_at = Some(now - Duration::minutes(6));
        assert!(!snapshot.is_fresh(Duration::minutes(5), now));
    }

    #[test]
    fn test_zero_window_is_never_fresh() {
        let now = Utc::now();
        let snapshot = Snapshot {
            fetched_at: Some(now),
            ..Snapshot::default()
        };
        assert!(!snapshot.is_fresh(Duration::zero(), now));
    }
}
