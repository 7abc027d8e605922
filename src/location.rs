use crate::config::LocationConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Static video identifier to coordinate mapping. Unknown identifiers resolve
/// to the fallback coordinate.
#[derive(Debug, Clone)]
pub struct LocationLookup {
    locations: HashMap<String, Coordinate>,
    fallback: Coordinate,
}

impl LocationLookup {
    pub fn new(locations: HashMap<String, Coordinate>, fallback: Coordinate) -> Self {
        Self {
            locations,
            fallback,
        }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        let locations = config
            .videos
            .iter()
            .map(|entry| {
                (
                    entry.video.clone(),
                    Coordinate::new(entry.latitude, entry.longitude),
                )
            })
            .collect();
        Self::new(locations, config.fallback)
    }

    pub fn lookup(&self, identifier: &str) -> Coordinate {
        self.locations
            .get(identifier)
            .copied()
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VideoLocation;

    fn lookup() -> LocationLookup {
        let mut locations = HashMap::new();
        locations.insert("ridge.mp4".to_string(), Coordinate::new(31.25, 78.5));
        locations.insert("valley.mp4".to_string(), Coordinate::new(29.9, 79.7));
        LocationLookup::new(locations, Coordinate::new(30.1, 79.2))
    }

    #[test]
    fn test_known_identifier_returns_stored_coordinate() {
        let lookup = lookup();

        assert_eq!(lookup.lookup("ridge.mp4"), Coordinate::new(31.25, 78.5));
        assert_eq!(lookup.lookup("valley.mp4"), Coordinate::new(29.9, 79.7));
    }

    #[test]
    fn test_from_config_keeps_case_of_video_names() {
        let config = LocationConfig {
            fallback: Coordinate::new(1.0, 2.0),
            videos: vec![VideoLocation {
                video: "Ridge_North.MP4".to_string(),
                latitude: 31.25,
                longitude: 78.5,
            }],
        };
        let lookup = LocationLookup::from_config(&config);

        assert_eq!(lookup.lookup("Ridge_North.MP4"), Coordinate::new(31.25, 78.5));
        assert_eq!(lookup.lookup("ridge_north.mp4"), Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn test_unknown_identifier_returns_fallback() {
        let lookup = lookup();

        assert_eq!(lookup.lookup("missing.mp4"), Coordinate::new(30.1, 79.2));
        assert_eq!(lookup.lookup(""), Coordinate::new(30.1, 79.2));
        assert_eq!(lookup.lookup("RIDGE.MP4"), Coordinate::new(30.1, 79.2));
    }
}
