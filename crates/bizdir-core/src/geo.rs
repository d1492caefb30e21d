//! Display placeholders for branch position and travel time.
//!
//! Branch locations are free-text, so coordinates come from a table of known
//! cities. Unknown locations get a point jittered around the base city. Both
//! the jitter and the travel-time phrase draw from a caller-supplied RNG so
//! a seeded generator yields repeatable output.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Coordinates;

/// Base point for locations missing from the table (Accra).
pub const BASE_COORDINATES: Coordinates = Coordinates {
    lat: 5.6037,
    lng: -0.1870,
};

/// Maximum offset in degrees applied to each axis of the base point.
pub const MAX_JITTER_DEGREES: f64 = 0.05;

const KNOWN_LOCATIONS: &[(&str, Coordinates)] = &[
    ("accra, ghana", Coordinates { lat: 5.6037, lng: -0.1870 }),
    ("kumasi, ghana", Coordinates { lat: 6.6885, lng: -1.6244 }),
    ("tamale, ghana", Coordinates { lat: 9.4008, lng: -0.8393 }),
    ("takoradi, ghana", Coordinates { lat: 4.8845, lng: -1.7554 }),
    ("cape coast, ghana", Coordinates { lat: 5.1053, lng: -1.2466 }),
    ("tema, ghana", Coordinates { lat: 5.6698, lng: -0.0166 }),
    ("ho, ghana", Coordinates { lat: 6.6008, lng: 0.4713 }),
    ("koforidua, ghana", Coordinates { lat: 6.0940, lng: -0.2591 }),
    ("sunyani, ghana", Coordinates { lat: 7.3399, lng: -2.3268 }),
    ("bolgatanga, ghana", Coordinates { lat: 10.7856, lng: -0.8514 }),
    ("wa, ghana", Coordinates { lat: 10.0601, lng: -2.5099 }),
];

const TIME_AWAY: &[&str] = &[
    "5 min away",
    "10 min away",
    "15 min away",
    "20 min away",
    "30 min away",
];

/// Exact table lookup, ignoring case and surrounding whitespace.
pub fn lookup(location: &str) -> Option<Coordinates> {
    let key = location.trim().to_lowercase();
    KNOWN_LOCATIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, coords)| *coords)
}

/// Coordinates for a branch location: a table hit, or a jittered base point.
pub fn coordinates_for<R: Rng>(location: Option<&str>, rng: &mut R) -> Coordinates {
    if let Some(coords) = location.and_then(lookup) {
        return coords;
    }
    Coordinates {
        lat: BASE_COORDINATES.lat + rng.gen_range(-MAX_JITTER_DEGREES..=MAX_JITTER_DEGREES),
        lng: BASE_COORDINATES.lng + rng.gen_range(-MAX_JITTER_DEGREES..=MAX_JITTER_DEGREES),
    }
}

pub fn time_away<R: Rng>(rng: &mut R) -> String {
    TIME_AWAY.choose(rng).copied().unwrap_or(TIME_AWAY[0]).to_string()
}
