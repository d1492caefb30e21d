use std::fmt;

use serde::{Deserialize, Serialize};

/// The six logical collections the directory is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Companies,
    Branches,
    WorkingDays,
    Products,
    SocialMedia,
    Verifications,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Companies,
        Collection::Branches,
        Collection::WorkingDays,
        Collection::Products,
        Collection::SocialMedia,
        Collection::Verifications,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Companies => "companies",
            Collection::Branches => "branches",
            Collection::WorkingDays => "working_days",
            Collection::Products => "products",
            Collection::SocialMedia => "social_media",
            Collection::Verifications => "verifications",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store collection ids for each logical collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionIds {
    pub companies: String,
    pub branches: String,
    pub working_days: String,
    pub products: String,
    pub social_media: String,
    pub verifications: String,
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            companies: Collection::Companies.name().to_string(),
            branches: Collection::Branches.name().to_string(),
            working_days: Collection::WorkingDays.name().to_string(),
            products: Collection::Products.name().to_string(),
            social_media: Collection::SocialMedia.name().to_string(),
            verifications: Collection::Verifications.name().to_string(),
        }
    }
}

impl CollectionIds {
    pub fn id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Companies => &self.companies,
            Collection::Branches => &self.branches,
            Collection::WorkingDays => &self.working_days,
            Collection::Products => &self.products,
            Collection::SocialMedia => &self.social_media,
            Collection::Verifications => &self.verifications,
        }
    }

    pub(crate) fn id_mut(&mut self, collection: Collection) -> &mut String {
        match collection {
            Collection::Companies => &mut self.companies,
            Collection::Branches => &mut self.branches,
            Collection::WorkingDays => &mut self.working_days,
            Collection::Products => &mut self.products,
            Collection::SocialMedia => &mut self.social_media,
            Collection::Verifications => &mut self.verifications,
        }
    }
}
