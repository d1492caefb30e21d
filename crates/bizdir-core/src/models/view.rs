use serde::{Deserialize, Serialize};

use super::{Branch, Product, SocialMediaLink, WorkingDay};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One active branch joined with its company and every record scoped to it.
/// Derived on demand from the cached collections; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MergedCompanyView {
    #[serde(flatten)]
    pub branch: Branch,
    pub company_name: String,
    pub working_days: Vec<WorkingDay>,
    pub products: Vec<Product>,
    pub social_media: Vec<SocialMediaLink>,
    pub is_verified: bool,
    /// Display-only placeholder position
    pub coordinates: Coordinates,
    /// Display-only placeholder travel time, e.g. "10 min away"
    pub time_away: String,
    /// Always `None`; no distance is computed yet
    pub distance: Option<f64>,
}

impl MergedCompanyView {
    pub fn branch_id(&self) -> &str {
        &self.branch.branch_id
    }

    pub fn company_id(&self) -> &str {
        &self.branch.company_id
    }

    /// "Branch (Company)" label for listings
    pub fn title(&self) -> String {
        let branch = self.branch.display_name();
        if self.company_name.is_empty() || branch == self.company_name {
            branch.to_string()
        } else {
            format!("{} ({})", branch, self.company_name)
        }
    }
}
