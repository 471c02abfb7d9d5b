//! Configuration for the `CareFinder` discovery core
//!
//! The tuning constants of the search pipelines (debounce interval, minimum
//! query length, importance cutoff, suggestion cap, facility radius) are
//! empirically chosen and therefore exposed as configuration with sensible
//! defaults, rather than hard-coded behavior.

use crate::CareFinderError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Root configuration structure for the `CareFinder` library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareFinderConfig {
    /// Place autocomplete configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Facility discovery configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// HTTP client configuration shared by both engines
    #[serde(default)]
    pub http: HttpConfig,
}

/// Place autocomplete settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum number of characters before a search is issued
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    /// Debounce interval between keystrokes and the search dispatch
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Results with importance at or below this are dropped unless the
    /// display name contains the query
    #[serde(default = "default_importance_cutoff")]
    pub importance_cutoff: f64,
    /// Maximum number of suggestions returned after ranking
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Per-request result limit for the general facet
    #[serde(default = "default_general_limit")]
    pub general_limit: u32,
    /// Per-request result limit for the administrative and settlement facets
    #[serde(default = "default_facet_limit")]
    pub facet_limit: u32,
    /// Country restriction applied to every sub-query (ISO 3166-1 alpha-2)
    #[serde(default = "default_country_codes")]
    pub country_codes: String,
    /// Preferred response languages
    #[serde(default = "default_language")]
    pub language: String,
    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// Facility discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Search radius around the active coordinate in kilometers
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Base URL of the map-data query service
    #[serde(default = "default_facility_base_url")]
    pub base_url: String,
    /// Server-side query timeout requested from the map-data service
    #[serde(default = "default_server_timeout")]
    pub server_timeout_secs: u32,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_min_query_chars() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_importance_cutoff() -> f64 {
    0.1
}

fn default_max_suggestions() -> usize {
    15
}

fn default_general_limit() -> u32 {
    12
}

fn default_facet_limit() -> u32 {
    8
}

fn default_country_codes() -> String {
    "th".to_string()
}

fn default_language() -> String {
    "th,en".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_radius_km() -> f64 {
    30.0
}

fn default_facility_base_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_server_timeout() -> u32 {
    25
}

fn default_http_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "CareFinder/0.1.0".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: default_min_query_chars(),
            debounce_ms: default_debounce_ms(),
            importance_cutoff: default_importance_cutoff(),
            max_suggestions: default_max_suggestions(),
            general_limit: default_general_limit(),
            facet_limit: default_facet_limit(),
            country_codes: default_country_codes(),
            language: default_language(),
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            base_url: default_facility_base_url(),
            server_timeout_secs: default_server_timeout(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CareFinderConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            discovery: DiscoveryConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl CareFinderConfig {
    /// Load configuration from a JSON string supplied by the embedding host
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CareFinderConfig =
            serde_json::from_str(json).with_context(|| "Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.search.min_query_chars == 0 {
            return Err(
                CareFinderError::config("Minimum query length must be at least 1").into(),
            );
        }

        if self.search.debounce_ms > 5_000 {
            return Err(
                CareFinderError::config("Debounce interval cannot exceed 5000 ms").into(),
            );
        }

        if !(0.0..=1.0).contains(&self.search.importance_cutoff) {
            return Err(
                CareFinderError::config("Importance cutoff must be within 0.0..=1.0").into(),
            );
        }

        if self.search.max_suggestions == 0 || self.search.max_suggestions > 100 {
            return Err(
                CareFinderError::config("Suggestion cap must be within 1..=100").into(),
            );
        }

        if self.discovery.radius_km <= 0.0 || self.discovery.radius_km > 500.0 {
            return Err(
                CareFinderError::config("Facility search radius must be within 0..=500 km").into(),
            );
        }

        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            return Err(
                CareFinderError::config("HTTP timeout must be within 1..=300 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        for (name, url) in [
            ("Geocoding", &self.search.base_url),
            ("Facility", &self.discovery.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CareFinderError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.search.country_codes.is_empty() {
            return Err(
                CareFinderError::config("Country restriction cannot be empty").into(),
            );
        }

        Ok(())
    }
}
