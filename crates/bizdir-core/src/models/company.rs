use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A registered company. Source of truth is the companies collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Company {
    pub company_id: String,
    #[serde(default, deserialize_with = "null_as_default", alias = "company_name")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A physical or online outlet owned by a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Branch {
    pub branch_id: String,
    pub company_id: String,
    #[serde(default, alias = "branch_name")]
    pub name: Option<String>,
    #[serde(default, alias = "phone")]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_online: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, rename = "type", alias = "branch_type")]
    pub branch_type: Option<String>,
}

impl Branch {
    /// Branch name for display, falling back to the branch id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.branch_id)
    }
}
