//! Overpass API client
//!
//! Implements [`FacilityProvider`] against the public Overpass map-data
//! query endpoint. A returned element reports its position either directly
//! (nodes) or via a `center` aggregate (ways and relations); elements that
//! resolve to neither are skipped.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::{FacilityProvider, FacilityRecord};
use crate::config::CareFinderConfig;
use crate::models::{Coordinate, FacilityKind};
use crate::{CareFinderError, Result};
use async_trait::async_trait;

/// HTTP client for the Overpass query endpoint
pub struct OverpassClient {
    client: Client,
    base_url: String,
    server_timeout_secs: u32,
}

/// Overpass JSON response envelope
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// One geographic element from an Overpass response
#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Center aggregate reported for way/relation geometries
#[derive(Debug, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassClient {
    /// Create a new client from the library configuration
    pub fn new(config: &CareFinderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| CareFinderError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.discovery.base_url.clone(),
            server_timeout_secs: config.discovery.server_timeout_secs,
        })
    }

    /// Build the Overpass QL query for one category around a center point
    fn build_query(&self, center: &Coordinate, radius_km: f64, kind: FacilityKind) -> String {
        let radius_m = (radius_km * 1000.0).round() as u64;
        let selectors: &[&str] = match kind {
            FacilityKind::Hospital => &["[\"amenity\"=\"hospital\"]"],
            FacilityKind::Clinic => &["[\"amenity\"=\"clinic\"]", "[\"healthcare\"=\"centre\"]"],
        };

        let mut query = format!("[out:json][timeout:{}];(", self.server_timeout_secs);
        for selector in selectors {
            for shape in ["node", "way", "relation"] {
                query.push_str(&format!(
                    "{shape}{selector}(around:{radius_m},{},{});",
                    center.latitude, center.longitude
                ));
            }
        }
        query.push_str(");out center;");
        query
    }
}

#[async_trait]
impl FacilityProvider for OverpassClient {
    async fn fetch_category(
        &self,
        center: &Coordinate,
        radius_km: f64,
        kind: FacilityKind,
    ) -> Result<Vec<FacilityRecord>> {
        let query = self.build_query(center, radius_km, kind);
        debug!("Overpass {kind:?} query: {query}");

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| CareFinderError::network(format!("Facility query failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CareFinderError::api(format!(
                "Facility service returned {status}"
            )));
        }

        let payload: OverpassResponse = response.json().await.map_err(|e| {
            CareFinderError::parse(format!("Failed to parse facility response: {e}"))
        })?;

        let total = payload.elements.len();
        let records: Vec<FacilityRecord> = payload
            .elements
            .into_iter()
            .filter_map(OverpassElement::into_record)
            .collect();

        if records.len() < total {
            warn!(
                "Skipped {} position-less elements in {kind:?} batch",
                total - records.len()
            );
        }

        Ok(records)
    }
}

impl OverpassElement {
    /// Resolve the element to a single (lat, lon) pair: direct fields for
    /// nodes, the `center` aggregate for ways/relations
    fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.as_ref().map(|c| (c.lat, c.lon)),
        }
    }

    /// Convert into a facility record, or `None` when the element resolves
    /// to no position
    pub fn into_record(self) -> Option<FacilityRecord> {
        let (latitude, longitude) = self.position()?;
        Some(FacilityRecord {
            id: format!("{}/{}", self.element_type, self.id),
            name: self.tags.get("name").cloned(),
            latitude,
            longitude,
        })
    }
}
