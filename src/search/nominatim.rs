//! Nominatim geocoding client
//!
//! Implements [`PlaceProvider`] against the public Nominatim place-search
//! endpoint. Latitude and longitude arrive as numeric strings; records with
//! missing or unparseable coordinates are skipped, not fatal to the batch.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{PlaceProvider, SearchFacet};
use crate::config::CareFinderConfig;
use crate::models::PlaceSuggestion;
use crate::{CareFinderError, Result};
use async_trait::async_trait;

/// HTTP client for the Nominatim place-search endpoint
pub struct NominatimClient {
    client: Client,
    base_url: String,
    country_codes: String,
    language: String,
    general_limit: u32,
    facet_limit: u32,
}

/// One place record from the Nominatim search response
///
/// Optional everywhere the upstream payload is known to be loose; conversion
/// drops records that lack a usable name or position.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub place_id: u64,
    pub display_name: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub importance: Option<f64>,
}

impl NominatimClient {
    /// Create a new client from the library configuration
    pub fn new(config: &CareFinderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| CareFinderError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.search.base_url.clone(),
            country_codes: config.search.country_codes.clone(),
            language: config.search.language.clone(),
            general_limit: config.search.general_limit,
            facet_limit: config.search.facet_limit,
        })
    }

    /// Build the search URL for one facet query
    fn facet_url(&self, query: &str, facet: SearchFacet) -> String {
        let limit = match facet {
            SearchFacet::General => self.general_limit,
            SearchFacet::AdministrativeArea | SearchFacet::Settlement => self.facet_limit,
        };

        let mut url = format!(
            "{}/search?format=json&q={}&limit={}&countrycodes={}&addressdetails=1&accept-language={}&namedetails=1&extratags=1&dedupe=1",
            self.base_url,
            urlencoding::encode(query),
            limit,
            self.country_codes,
            urlencoding::encode(&self.language),
        );

        match facet {
            SearchFacet::General => {}
            SearchFacet::AdministrativeArea => url.push_str("&featuretype=city,state,county"),
            SearchFacet::Settlement => url.push_str("&featuretype=settlement"),
        }

        url
    }
}

#[async_trait]
impl PlaceProvider for NominatimClient {
    async fn search_facet(&self, query: &str, facet: SearchFacet) -> Result<Vec<PlaceSuggestion>> {
        let url = self.facet_url(query, facet);
        debug!("Nominatim {facet:?} request: {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CareFinderError::network(format!("Geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CareFinderError::api(format!(
                "Geocoding service returned {status}"
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            CareFinderError::parse(format!("Failed to parse geocoding response: {e}"))
        })?;

        let total = places.len();
        let suggestions: Vec<PlaceSuggestion> = places
            .into_iter()
            .filter_map(NominatimPlace::into_suggestion)
            .collect();

        if suggestions.len() < total {
            warn!(
                "Skipped {} malformed place records in {facet:?} batch",
                total - suggestions.len()
            );
        }

        Ok(suggestions)
    }
}

impl NominatimPlace {
    /// Convert a wire record into a suggestion, or `None` when the record
    /// lacks a display name or a parseable position
    pub fn into_suggestion(self) -> Option<PlaceSuggestion> {
        let display_name = self.display_name.filter(|n| !n.is_empty())?;
        let latitude: f64 = self.lat.as_deref()?.parse().ok()?;
        let longitude: f64 = self.lon.as_deref()?.parse().ok()?;

        Some(PlaceSuggestion {
            id: self.place_id.to_string(),
            display_name,
            latitude,
            longitude,
            category: self.place_type.unwrap_or_default(),
            importance: self.importance.unwrap_or(0.0),
        })
    }
}
