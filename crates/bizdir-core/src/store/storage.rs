use crate::config::Config;

/// Turns raw product image references into fully-qualified file URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlResolver {
    endpoint: String,
    project_id: String,
    bucket_id: String,
}

impl ImageUrlResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            bucket_id: config.bucket_id().to_string(),
        }
    }

    /// Resolve an image reference.
    ///
    /// Absolute `http(s)` URLs pass through unchanged; anything else is treated
    /// as a file id in the configured bucket. Blank references resolve to `None`.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Some(raw.to_string());
        }

        Some(format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint, self.bucket_id, raw, self.project_id
        ))
    }
}
