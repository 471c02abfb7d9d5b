//! Facility discovery engine
//!
//! Given a confirmed coordinate, queries the map-data source for health
//! facilities within a fixed radius, one sub-query per category, then
//! annotates every hit with its great-circle distance from the center and
//! returns a distance-sorted list. Stateless like the autocomplete engine;
//! invalidation and supersession live in [`crate::session::SearchSession`].

pub mod overpass;

use crate::config::DiscoveryConfig;
use crate::geo;
use crate::models::{Coordinate, Facility, FacilityKind};
use crate::{CareFinderError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

pub use overpass::OverpassClient;

/// A facility hit already resolved to a single position, before distance
/// annotation and naming fallback
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    /// Derived from source element identity
    pub id: String,
    /// Human name if the source carries one
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Source of facility records for one category query
#[async_trait]
pub trait FacilityProvider: Send + Sync {
    /// Fetch all facilities of one category within `radius_km` of `center`,
    /// in source order
    async fn fetch_category(
        &self,
        center: &Coordinate,
        radius_km: f64,
        kind: FacilityKind,
    ) -> Result<Vec<FacilityRecord>>;
}

/// Discover facilities around `center`: per-category fan-out, distance
/// annotation, ascending stable sort by distance
///
/// A failing category only loses that category's results; the call fails as
/// a whole only when every category fails.
pub async fn discover_facilities(
    provider: &dyn FacilityProvider,
    config: &DiscoveryConfig,
    center: &Coordinate,
) -> Result<Vec<Facility>> {
    info!(
        "Searching facilities within {}km of ({:.4}, {:.4})",
        config.radius_km, center.latitude, center.longitude
    );

    let batches = join_all(
        FacilityKind::ALL
            .iter()
            .map(|kind| provider.fetch_category(center, config.radius_km, *kind)),
    )
    .await;

    let mut facilities = Vec::new();
    let mut failures = 0;
    for (kind, batch) in FacilityKind::ALL.iter().zip(batches) {
        match batch {
            Ok(records) => {
                for record in records {
                    facilities.push(annotate(record, *kind, center));
                }
            }
            Err(err) => {
                warn!("{kind:?} category query failed: {err}");
                failures += 1;
            }
        }
    }

    if failures == FacilityKind::ALL.len() {
        return Err(CareFinderError::network(
            "all facility category queries failed".to_string(),
        ));
    }

    // Stable sort: equidistant facilities keep source order
    facilities.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!("Found {} facilities near {}", facilities.len(), center);
    Ok(facilities)
}

/// Attach distance and the category placeholder name where needed
fn annotate(record: FacilityRecord, kind: FacilityKind, center: &Coordinate) -> Facility {
    let distance_km = geo::point_distance_km(
        center.latitude,
        center.longitude,
        record.latitude,
        record.longitude,
    );
    let name = record
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| kind.placeholder_name().to_string());

    Facility {
        id: record.id,
        name,
        latitude: record.latitude,
        longitude: record.longitude,
        kind,
        distance_km,
    }
}
