//! `CareFinder` - location-based healthcare facility discovery
//!
//! This library provides the core of a facility-finder surface: debounced,
//! multi-query place-name autocomplete against a geocoding service, and
//! radius-bounded nearby-facility search against a map-data query service,
//! with client-side deduplication, distance computation and ranking.
//!
//! The embedding host owns the presentation (map markers, list rows,
//! notices); it drives a [`session::SearchSession`] from its event loop and
//! receives results through the [`session::SessionEvents`] sink.

pub mod config;
pub mod error;
pub mod facilities;
pub mod geo;
pub mod models;
pub mod search;
pub mod session;

// Re-export core types for public API
pub use config::CareFinderConfig;
pub use error::CareFinderError;
pub use facilities::{FacilityProvider, OverpassClient, discover_facilities};
pub use models::{Coordinate, Facility, FacilityKind, PlaceSuggestion};
pub use search::{NominatimClient, PlaceProvider, SearchOutcome, search_places};
pub use session::{SearchSession, SessionEvents};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CareFinderError>;
