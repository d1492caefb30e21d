//! Records that belong to either a single branch or a whole company.
//!
//! A record with a `branch_id` applies to that branch; a record with only a
//! `company_id` is a company-level default that applies to every branch of
//! the company. Matching checks both keys and either one suffices.

use serde::{Deserialize, Serialize};

use super::{null_as_default, Branch};
use crate::utils::non_empty;

/// Access to the two scoping keys shared by branch/company records.
pub trait Scoped {
    fn branch_id(&self) -> Option<&str>;
    fn company_id(&self) -> Option<&str>;

    /// True if this record applies to the given scope.
    fn matches(&self, scope: &Scope) -> bool {
        let branch_match = match (non_empty(self.branch_id()), non_empty(scope.branch_id.as_deref())) {
            (Some(mine), Some(wanted)) => mine == wanted,
            _ => false,
        };
        let company_match = match (non_empty(self.company_id()), non_empty(scope.company_id.as_deref())) {
            (Some(mine), Some(wanted)) => mine == wanted,
            _ => false,
        };
        branch_match || company_match
    }
}

/// The branch and/or company a lookup is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub branch_id: Option<String>,
    pub company_id: Option<String>,
}

impl Scope {
    /// Scope for a branch, including its company-level defaults.
    pub fn branch(branch_id: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            branch_id: Some(branch_id.into()),
            company_id: Some(company_id.into()),
        }
    }

    /// Scope for records keyed on the branch id alone.
    pub fn branch_only(branch_id: impl Into<String>) -> Self {
        Self {
            branch_id: Some(branch_id.into()),
            company_id: None,
        }
    }

    pub fn company(company_id: impl Into<String>) -> Self {
        Self {
            branch_id: None,
            company_id: Some(company_id.into()),
        }
    }

    pub fn of(branch: &Branch) -> Self {
        Self::branch(branch.branch_id.clone(), branch.company_id.clone())
    }
}

/// Opening hours for one day of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct WorkingDay {
    #[serde(default, alias = "$id")]
    pub id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub day: String,
    #[serde(default, alias = "opening_hours")]
    pub hours: Option<String>,
}

/// A product listed by a branch or company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    #[serde(default, alias = "$id")]
    pub id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", alias = "product_name")]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw image reference: a storage file id or an absolute URL
    #[serde(default)]
    pub image: Option<String>,
    /// `image` resolved to a fully-qualified URL; filled in by the aggregator
    #[serde(default, skip_deserializing)]
    pub image_url: Option<String>,
}

/// A social media profile link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SocialMediaLink {
    #[serde(default, alias = "$id")]
    pub id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: String,
    #[serde(default, deserialize_with = "null_as_default", alias = "link")]
    pub url: String,
}

macro_rules! impl_scoped {
    ($($ty:ty),*) => {
        $(
            impl Scoped for $ty {
                fn branch_id(&self) -> Option<&str> {
                    self.branch_id.as_deref()
                }

                fn company_id(&self) -> Option<&str> {
                    self.company_id.as_deref()
                }
            }
        )*
    };
}

impl_scoped!(WorkingDay, Product, SocialMediaLink);

/// Clone every record that applies to `scope`, preserving order.
pub fn filter_scoped<T: Scoped + Clone>(records: &[T], scope: &Scope) -> Vec<T> {
    records.iter().filter(|r| r.matches(scope)).cloned().collect()
}
