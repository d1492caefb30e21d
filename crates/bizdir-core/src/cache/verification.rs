//! Verification status resolution.
//!
//! Verification records have been written with several spellings of the
//! company key and status field over time. Each is described here as an
//! ordered list of candidate field names; the first present, non-empty
//! string wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

/// Status token that marks a company as verified. Matched exactly.
pub const VERIFIED_STATUS: &str = "verified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationFields {
    /// Candidate names for the company identifier, in priority order
    pub company_keys: Vec<String>,
    /// Candidate names for the status field, in priority order
    pub status_keys: Vec<String>,
}

impl Default for VerificationFields {
    fn default() -> Self {
        Self {
            company_keys: ["company_id", "companyId", "companyID", "company"]
                .map(String::from)
                .to_vec(),
            status_keys: ["status", "verification_status", "verificationStatus"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl VerificationFields {
    pub fn company_of<'a>(&self, record: &'a Document) -> Option<&'a str> {
        first_string(record, &self.company_keys)
    }

    pub fn status_of<'a>(&self, record: &'a Document) -> Option<&'a str> {
        first_string(record, &self.status_keys)
    }

    /// True when the first record for `company_id` carries exactly `"verified"`.
    pub fn is_verified(&self, records: &[Document], company_id: &str) -> bool {
        records
            .iter()
            .find(|record| self.company_of(record) == Some(company_id))
            .and_then(|record| self.status_of(record))
            == Some(VERIFIED_STATUS)
    }
}

fn first_string<'a>(record: &'a Document, keys: &[String]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(key).and_then(Value::as_str).filter(|v| !v.is_empty()))
}
