//! Search session: debounce, supersession and event plumbing
//!
//! Owns the mutable state the two stateless engines must not carry: the
//! active coordinate, the generation counters and the selection-in-progress
//! flag. Results are applied in last-request-wins order: each trigger bumps
//! a monotonically increasing generation counter, the dispatched task
//! captures its generation, and a completion is applied only if the counter
//! still matches at completion time. There is no hard network cancellation;
//! stale completions are detected and dropped.
//!
//! The session holds no background tasks of its own. Each entry point is an
//! ordinary async fn intended to be spawned by the host's event loop; the
//! debounce timer is simply the suspension inside `input_changed`, so
//! dropping the host's tasks disposes of all pending timers.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::CareFinderError;
use crate::config::CareFinderConfig;
use crate::facilities::{FacilityProvider, discover_facilities};
use crate::models::{Coordinate, Facility, PlaceSuggestion};
use crate::search::{PlaceProvider, SearchOutcome, search_places};

/// Sink for results produced by the session, implemented by the
/// presentation adapter (map markers, list rows, notices)
pub trait SessionEvents: Send + Sync {
    /// A completed autocomplete batch; empty on clear or failure
    fn on_suggestions(&self, suggestions: Vec<PlaceSuggestion>);
    /// The query was shorter than `min_chars`; a hint for the input
    /// surface, not a failure signal
    fn on_input_too_short(&self, min_chars: usize);
    /// The active coordinate changed
    fn on_coordinate_selected(&self, coordinate: Coordinate);
    /// A facility list for the active coordinate; empty on invalidation
    fn on_facilities_updated(&self, facilities: Vec<Facility>);
    /// A non-fatal notice the host should surface
    fn on_search_error(&self, message: String);
}

/// One location-search session
///
/// Created when the search surface mounts; lives for as long as the host
/// keeps it. All methods take `&self` so the host can share the session
/// behind an `Arc` and spawn each trigger independently.
pub struct SearchSession<P, F, E>
where
    P: PlaceProvider,
    F: FacilityProvider,
    E: SessionEvents,
{
    config: CareFinderConfig,
    places: P,
    facilities: F,
    events: E,
    /// Generation counter for autocomplete triggers
    search_generation: AtomicU64,
    /// Generation counter for facility discovery triggers
    discovery_generation: AtomicU64,
    /// Set while a just-picked suggestion is being applied; suppresses the
    /// search that the programmatic input clear would otherwise fire
    selecting: AtomicBool,
    active_coordinate: Mutex<Option<Coordinate>>,
}

impl<P, F, E> SearchSession<P, F, E>
where
    P: PlaceProvider,
    F: FacilityProvider,
    E: SessionEvents,
{
    /// Create a new session over the given providers and event sink
    pub fn new(config: CareFinderConfig, places: P, facilities: F, events: E) -> Self {
        Self {
            config,
            places,
            facilities,
            events,
            search_generation: AtomicU64::new(0),
            discovery_generation: AtomicU64::new(0),
            selecting: AtomicBool::new(false),
            active_coordinate: Mutex::new(None),
        }
    }

    /// The coordinate facility results are currently tied to, if any
    pub fn active_coordinate(&self) -> Option<Coordinate> {
        self.active_coordinate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Handle a user keystroke in the search input
    ///
    /// Debounces, then runs the autocomplete pipeline. A newer keystroke,
    /// or a selection, supersedes the pending search; a superseded search
    /// never emits.
    pub async fn input_changed(&self, query: &str) {
        // A real keystroke ends any selection in progress
        self.selecting.store(false, Ordering::SeqCst);

        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        tokio::time::sleep(Duration::from_millis(self.config.search.debounce_ms)).await;

        if self.search_generation.load(Ordering::SeqCst) != generation {
            debug!("Debounced search for '{query}' superseded before dispatch");
            return;
        }
        if self.selecting.load(Ordering::SeqCst) {
            debug!("Debounced search for '{query}' suppressed by selection");
            return;
        }

        match search_places(&self.places, &self.config.search, &query).await {
            Ok(outcome) => {
                if self.search_generation.load(Ordering::SeqCst) != generation {
                    debug!("Search results for '{query}' arrived stale, dropping");
                    return;
                }
                match outcome {
                    SearchOutcome::TooShort => {
                        self.events.on_suggestions(Vec::new());
                        self.events
                            .on_input_too_short(self.config.search.min_query_chars);
                    }
                    SearchOutcome::Ranked(suggestions) => self.events.on_suggestions(suggestions),
                }
            }
            Err(err) => {
                if self.search_generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                warn!("Autocomplete failed for '{query}': {err}");
                self.events.on_suggestions(Vec::new());
                self.events.on_search_error(err.user_message());
            }
        }
    }

    /// Apply a picked suggestion: suppress any pending search, clear the
    /// suggestion list, make the suggestion's position the active
    /// coordinate and start facility discovery
    pub async fn select_suggestion(&self, suggestion: &PlaceSuggestion) {
        info!(
            "Selected place: {} ({:.4}, {:.4})",
            suggestion.display_name, suggestion.latitude, suggestion.longitude
        );

        self.selecting.store(true, Ordering::SeqCst);
        // Kill the debounced search still pending for the stale query text
        self.search_generation.fetch_add(1, Ordering::SeqCst);
        self.events.on_suggestions(Vec::new());

        let coordinate = Coordinate {
            latitude: suggestion.latitude,
            longitude: suggestion.longitude,
            label: suggestion.display_name.clone(),
        };
        self.set_active_coordinate(coordinate).await;
    }

    /// Apply a geolocation fix from the host environment
    pub async fn apply_position_fix(&self, latitude: f64, longitude: f64) {
        match Coordinate::new(latitude, longitude, "Current location") {
            Ok(coordinate) => self.set_active_coordinate(coordinate).await,
            Err(err) => {
                warn!("Rejected geolocation fix ({latitude}, {longitude}): {err}");
                self.events.on_search_error(err.user_message());
            }
        }
    }

    /// Surface a geolocation denial or failure; previously selected
    /// coordinates and results stay untouched
    pub fn position_unavailable(&self, reason: &str) {
        let err = CareFinderError::geolocation(reason);
        warn!("Geolocation unavailable: {err}");
        self.events.on_search_error(err.user_message());
    }

    /// Make `coordinate` the active anchor and refresh the facility list
    ///
    /// The prior list is invalidated immediately (empty emit) before the
    /// discovery call goes out; a late response for a superseded coordinate
    /// is discarded.
    pub async fn set_active_coordinate(&self, coordinate: Coordinate) {
        let generation = self.discovery_generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut active = self
                .active_coordinate
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *active = Some(coordinate.clone());
        }
        self.events.on_coordinate_selected(coordinate.clone());
        self.events.on_facilities_updated(Vec::new());

        match discover_facilities(&self.facilities, &self.config.discovery, &coordinate).await {
            Ok(facilities) => {
                if self.discovery_generation.load(Ordering::SeqCst) != generation {
                    debug!("Facility results for {coordinate} arrived stale, dropping");
                    return;
                }
                self.events.on_facilities_updated(facilities);
            }
            Err(err) => {
                if self.discovery_generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                // List was already cleared at invalidation; just surface the notice
                warn!("Facility discovery failed for {coordinate}: {err}");
                self.events.on_search_error(err.user_message());
            }
        }
    }
}
