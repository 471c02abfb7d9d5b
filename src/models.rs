//! Core data types shared by the autocomplete and facility discovery engines

use crate::CareFinderError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Anchor point for facility discovery
///
/// Exactly one coordinate is active per session at a time; selecting a new
/// one invalidates every facility result tied to the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable label of the anchor, e.g. the selected place name
    pub label: String,
}

impl Coordinate {
    /// Create a coordinate, validating latitude and longitude ranges
    pub fn new(
        latitude: f64,
        longitude: f64,
        label: impl Into<String>,
    ) -> Result<Self, CareFinderError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CareFinderError::validation(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CareFinderError::validation(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            label: label.into(),
        })
    }

    /// Default fallback anchor when neither a selection nor a geolocation
    /// fix is available (central Bangkok)
    #[must_use]
    pub fn default_anchor() -> Self {
        Self {
            latitude: 13.7563,
            longitude: 100.5018,
            label: "Bangkok, Thailand".to_string(),
        }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.label.is_empty() {
            write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
        } else {
            write!(f, "{}", self.label)
        }
    }
}

/// A ranked place suggestion produced by the autocomplete engine
///
/// Ephemeral: created per search response and discarded as soon as a new
/// search starts or a suggestion is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    /// Opaque, source-provided identifier, unique within one search
    pub id: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-form type/category tag from the geocoding source
    pub category: String,
    /// Relevance score in [0, 1]
    pub importance: f64,
}

impl Display for PlaceSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Facility category searched by the discovery engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityKind {
    Hospital,
    Clinic,
}

impl FacilityKind {
    /// Categories queried per discovery fan-out
    pub const ALL: [FacilityKind; 2] = [FacilityKind::Hospital, FacilityKind::Clinic];

    /// Label used for facilities that carry no human name
    #[must_use]
    pub fn placeholder_name(self) -> &'static str {
        match self {
            FacilityKind::Hospital => "Unnamed hospital",
            FacilityKind::Clinic => "Unnamed clinic",
        }
    }
}

/// A health facility found near the active coordinate
///
/// `distance_km` is always relative to the coordinate the discovery call was
/// made for; a facility list is invalid the instant the active coordinate
/// changes and must be recomputed, not patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Derived from source element identity; not globally stable
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: FacilityKind,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(13.7563, 100.5018, "Bangkok").is_ok());
        assert!(Coordinate::new(91.0, 0.0, "bad").is_err());
        assert!(Coordinate::new(-91.0, 0.0, "bad").is_err());
        assert!(Coordinate::new(0.0, 181.0, "bad").is_err());
        assert!(Coordinate::new(0.0, -181.0, "bad").is_err());
        assert!(Coordinate::new(f64::NAN, 0.0, "bad").is_err());
    }

    #[test]
    fn test_default_anchor_is_bangkok() {
        let anchor = Coordinate::default_anchor();
        assert_eq!(anchor.latitude, 13.7563);
        assert_eq!(anchor.longitude, 100.5018);
    }

    #[test]
    fn test_coordinate_display_falls_back_to_numbers() {
        let unlabeled = Coordinate::new(13.7563, 100.5018, "").unwrap();
        assert_eq!(unlabeled.to_string(), "13.7563, 100.5018");

        let labeled = Coordinate::new(13.7563, 100.5018, "Bangkok").unwrap();
        assert_eq!(labeled.to_string(), "Bangkok");
    }

    #[rstest]
    #[case(FacilityKind::Hospital, "Unnamed hospital")]
    #[case(FacilityKind::Clinic, "Unnamed clinic")]
    fn test_placeholder_names(#[case] kind: FacilityKind, #[case] expected: &str) {
        assert_eq!(kind.placeholder_name(), expected);
    }
}
