use chrono::{DateTime, Utc};

/// Point-in-time view of the cache's refresh state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub busy: bool,
    /// When the current snapshot was fetched; `None` before the first refresh or after invalidation
    pub fetched_at: Option<DateTime<Utc>>,
    pub stale: bool,
}

impl CacheStatus {
    pub fn age_minutes(&self) -> Option<i64> {
        self.fetched_at.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        self.age_minutes().map_or_else(|| "never".to_string(), format_age)
    }
}

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Whole units rounded half-up: 90 minutes is "2h ago", 36 hours is "2d ago".
/// Negative ages (clock skew) read as "just now".
fn format_age(minutes: i64) -> String {
    let rounded = |unit: i64| (minutes + unit / 2) / unit;
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < MINUTES_PER_HOUR => format!("{}m ago", m),
        m if m < MINUTES_PER_DAY => format!("{}h ago", rounded(MINUTES_PER_HOUR)),
        _ => format!("{}d ago", rounded(MINUTES_PER_DAY)),
    }
}
