//! Place autocomplete engine
//!
//! Turns free-text input into a ranked list of place suggestions: fan-out
//! over several geocoding facets to widen recall beyond a single query's
//! result cap, then merge, dedupe, filter and rank client-side. The engine
//! itself is stateless; debounce and supersession live in
//! [`crate::session::SearchSession`].

pub mod nominatim;

use crate::config::SearchConfig;
use crate::models::PlaceSuggestion;
use crate::{CareFinderError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub use nominatim::NominatimClient;

/// Filter facets issued in parallel for one autocomplete query
///
/// All facets share the same input text and country restriction; they differ
/// only in the feature-type filter applied by the geocoding source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFacet {
    /// Plain free-text match
    General,
    /// Provinces, districts and cities
    AdministrativeArea,
    /// Settlements and landmarks
    Settlement,
}

impl SearchFacet {
    pub const ALL: [SearchFacet; 3] = [
        SearchFacet::General,
        SearchFacet::AdministrativeArea,
        SearchFacet::Settlement,
    ];
}

/// Source of place suggestions for one facet query
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Query one facet; results are returned in source order
    async fn search_facet(&self, query: &str, facet: SearchFacet) -> Result<Vec<PlaceSuggestion>>;
}

/// Outcome of one autocomplete invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Query shorter than the configured minimum; not an error, the host
    /// shows a hint instead of a failure notice
    TooShort,
    /// Ranked, deduplicated and capped suggestions
    Ranked(Vec<PlaceSuggestion>),
}

/// Run one autocomplete query: fan-out, merge, dedupe, filter, rank, cap
///
/// A failing facet only loses that facet's results; the batch fails as a
/// whole only when every facet fails.
pub async fn search_places(
    provider: &dyn PlaceProvider,
    config: &SearchConfig,
    query: &str,
) -> Result<SearchOutcome> {
    let query = query.trim();
    if query.chars().count() < config.min_query_chars {
        return Ok(SearchOutcome::TooShort);
    }

    debug!("Dispatching {} facet queries for: {query}", SearchFacet::ALL.len());
    let batches = join_all(
        SearchFacet::ALL
            .iter()
            .map(|facet| provider.search_facet(query, *facet)),
    )
    .await;

    let mut collected = Vec::new();
    let mut failures = 0;
    for (facet, batch) in SearchFacet::ALL.iter().zip(batches) {
        match batch {
            Ok(results) => collected.push(results),
            Err(err) => {
                warn!("Facet {facet:?} query failed: {err}");
                failures += 1;
            }
        }
    }

    if failures == SearchFacet::ALL.len() {
        return Err(CareFinderError::network(format!(
            "all facet queries failed for '{query}'"
        )));
    }

    let merged = merge_suggestions(collected);
    let filtered = filter_suggestions(query, merged, config.importance_cutoff);
    let mut ranked = rank_suggestions(query, filtered);
    ranked.truncate(config.max_suggestions);

    info!("Found {} place suggestions for: {query}", ranked.len());
    Ok(SearchOutcome::Ranked(ranked))
}

/// Union all facet batches, deduplicated by place id; first occurrence wins
#[must_use]
pub fn merge_suggestions(batches: Vec<Vec<PlaceSuggestion>>) -> Vec<PlaceSuggestion> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for batch in batches {
        for suggestion in batch {
            if seen.insert(suggestion.id.clone()) {
                merged.push(suggestion);
            }
        }
    }
    merged
}

/// Drop low-importance results unless the display name contains the query
/// (case-insensitive); substring containment always overrides the cutoff
#[must_use]
pub fn filter_suggestions(
    query: &str,
    suggestions: Vec<PlaceSuggestion>,
    importance_cutoff: f64,
) -> Vec<PlaceSuggestion> {
    let query_lower = query.to_lowercase();
    suggestions
        .into_iter()
        .filter(|s| {
            s.display_name.to_lowercase().contains(&query_lower)
                || s.importance > importance_cutoff
        })
        .collect()
}

/// Stable rank: display names starting with the query sort first, then
/// descending importance; ties keep their relative merge order
#[must_use]
pub fn rank_suggestions(query: &str, mut suggestions: Vec<PlaceSuggestion>) -> Vec<PlaceSuggestion> {
    let query_lower = query.to_lowercase();
    suggestions.sort_by(|a, b| {
        let a_starts = a.display_name.to_lowercase().starts_with(&query_lower);
        let b_starts = b.display_name.to_lowercase().starts_with(&query_lower);
        b_starts
            .cmp(&a_starts)
            .then_with(|| {
                b.importance
                    .partial_cmp(&a.importance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
    suggestions
}
