//! The join from cached collections to merged company views.

use std::collections::HashMap;

use rand::Rng;

use super::{Snapshot, VerificationFields};
use crate::geo;
use crate::models::scoped::filter_scoped;
use crate::models::{Company, MergedCompanyView, Product, Scope};
use crate::store::ImageUrlResolver;

/// Lookups the join needs besides the snapshot itself.
pub struct MergeContext<'a> {
    pub verification: &'a VerificationFields,
    pub images: &'a ImageUrlResolver,
}

/// Fill in a product's resolved image URL.
pub fn with_image_url(mut product: Product, images: &ImageUrlResolver) -> Product {
    product.image_url = product.image.as_deref().and_then(|raw| images.resolve(raw));
    product
}

/// Build one view per branch whose company is present, in branch order.
/// Branches without a matching company are dropped.
pub fn merge_views<R: Rng>(snapshot: &Snapshot, ctx: &MergeContext<'_>, rng: &mut R) -> Vec<MergedCompanyView> {
    let mut companies: HashMap<&str, &Company> = HashMap::with_capacity(snapshot.companies.len());
    for company in &snapshot.companies {
        companies.entry(company.company_id.as_str()).or_insert(company);
    }

    snapshot
        .branches
        .iter()
        .filter_map(|branch| {
            let company = companies.get(branch.company_id.as_str())?;
            let scope = Scope::of(branch);

            let products = filter_scoped(&snapshot.products, &scope)
                .into_iter()
                .map(|p| with_image_url(p, ctx.images))
                .collect();

            Some(MergedCompanyView {
                branch: branch.clone(),
                company_name: company.name.clone(),
                working_days: filter_scoped(&snapshot.working_days, &scope),
                products,
                social_media: filter_scoped(&snapshot.social_media, &scope),
                is_verified: ctx
                    .verification
                    .is_verified(&snapshot.verifications, &branch.company_id),
                coordinates: geo::coordinates_for(branch.location.as_deref(), rng),
                time_away: geo::time_away(rng),
                distance: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Branch, Coordinates, SocialMediaLink, WorkingDay};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn company(id: &str, name: &str) -> Company {
        Company {
            company_id: id.to_string(),
            name: name.to_string(),
            email: None,
        }
    }

    fn branch(id: &str, company_id: &str, location: &str) -> Branch {
        serde_json::from_value(json!({
            "branch_id": id,
            "company_id": company_id,
            "location": location,
            "is_active": true,
        }))
        .expect("branch fixture parses")
    }

    fn working_day(branch_id: Option<&str>, company_id: Option<&str>, day: &str) -> WorkingDay {
        WorkingDay {
            id: None,
            branch_id: branch_id.map(String::from),
            company_id: company_id.map(String::from),
            day: day.to_string(),
            hours: None,
        }
    }

    fn run(snapshot: &Snapshot) -> Vec<MergedCompanyView> {
        let config = Config::default();
        let images = ImageUrlResolver::new(&config);
        let ctx = MergeContext {
            verification: &config.verification_fields,
            images: &images,
        };
        merge_views(snapshot, &ctx, &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_one_view_per_branch_with_company() {
        let snapshot = Snapshot {
            companies: vec![company("c1", "Acme"), company("c2", "Globex")],
            branches: vec![
                branch("b1", "c1", "Accra, Ghana"),
                branch("b2", "c1", "Kumasi, Ghana"),
                branch("b3", "c3", "Tema, Ghana"),
                branch("b4", "c2", "Tamale, Ghana"),
            ],
            ..Snapshot::default()
        };

        let views = run(&snapshot);
        let ids: Vec<&str> = views.iter().map(|v| v.branch_id()).collect();
        assert_eq!(ids, vec!["b1", "b2", "b4"]);
        assert_eq!(views[0].company_name, "Acme");
        assert_eq!(views[2].company_name, "Globex");
        assert!(views.iter().all(|v| v.distance.is_none()));
    }

    #[test]
    fn test_scoped_records_attach_by_branch_or_company() {
        let snapshot = Snapshot {
            companies: vec![company("c1", "Acme")],
            branches: vec![branch("b1", "c1", "Accra, Ghana"), branch("b2", "c1", "Tema, Ghana")],
            working_days: vec![
                working_day(Some("b1"), Some("c9"), "Monday"),
                working_day(None, Some("c1"), "Saturday"),
                working_day(Some("b2"), None, "Tuesday"),
            ],
            social_media: vec![SocialMediaLink {
                id: None,
                branch_id: None,
                company_id: Some("c1".to_string()),
                platform: "instagram".to_string(),
                url: "https://instagram.com/acme".to_string(),
            }],
            ..Snapshot::default()
        };

        let views = run(&snapshot);
        let days = |i: usize| views[i].working_days.iter().map(|d| d.day.as_str()).collect::<Vec<_>>();
        assert_eq!(days(0), vec!["Monday", "Saturday"]);
        assert_eq!(days(1), vec!["Saturday", "Tuesday"]);
        assert_eq!(views[0].social_media.len(), 1);
        assert_eq!(views[1].social_media.len(), 1);
    }

    #[test]
    fn test_acme_scenario() {
        let mut snapshot = Snapshot {
            companies: vec![company("c1", "Acme")],
            branches: vec![branch("b1", "c1", "Accra, Ghana")],
            ..Snapshot::default()
        };

        let views = run(&snapshot);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].coordinates, Coordinates { lat: 5.6037, lng: -0.1870 });
        assert!(!views[0].is_verified);
        assert!(views[0].working_days.is_empty());
        assert!(views[0].products.is_empty());

        snapshot.verifications = vec![json!({"company_id": "c1", "status": "verified"})];
        assert!(run(&snapshot)[0].is_verified);
    }

    #[test]
    fn test_product_images_resolved() {
        let snapshot = Snapshot {
            companies: vec![company("c1", "Acme")],
            branches: vec![branch("b1", "c1", "Accra, Ghana")],
            products: vec![
                serde_json::from_value(json!({"branch_id": "b1", "name": "Soap", "image": "file-9"}))
                    .expect("product fixture parses"),
                serde_json::from_value(json!({"company_id": "c1", "name": "Oil", "image": "https://cdn.example.com/oil.png"}))
                    .expect("product fixture parses"),
                serde_json::from_value(json!({"company_id": "c1", "name": "Plain"}))
                    .expect("product fixture parses"),
            ],
            ..Snapshot::default()
        };

        let views = run(&snapshot);
        let products = &views[0].products;
        assert!(products[0]
            .image_url
            .as_deref()
            .is_some_and(|url| url.ends_with("/files/file-9/view?project=")));
        assert_eq!(products[1].image_url.as_deref(), Some("https://cdn.example.com/oil.png"));
        assert!(products[2].image_url.is_none());
    }

    #[test]
    fn test_same_seed_same_placeholders() {
        let snapshot = Snapshot {
            companies: vec![company("c1", "Acme")],
            branches: vec![branch("b1", "c1", "Osu"), branch("b2", "c1", "Labone")],
            ..Snapshot::default()
        };
        assert_eq!(run(&snapshot), run(&snapshot));
    }

    #[test]
    fn test_duplicate_company_ids_use_first() {
        let snapshot = Snapshot {
            companies: vec![company("c1", "Acme"), company("c1", "Acme (old)")],
            branches: vec![branch("b1", "c1", "Accra, Ghana")],
            ..Snapshot::default()
        };
        let views = run(&snapshot);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].company_name, "Acme");
    }
}
