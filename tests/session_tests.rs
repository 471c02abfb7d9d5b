//! Integration tests for the CareFinder search session
//!
//! Exercises the public API end to end with scripted providers: autocomplete
//! ranking, selection driving facility discovery, failure degradation and
//! retry. Timing-sensitive supersession behavior is covered by the session's
//! own unit tests under paused time.

use async_trait::async_trait;
use carefinder::facilities::FacilityRecord;
use carefinder::{
    CareFinderConfig, CareFinderError, Coordinate, Facility, FacilityKind, FacilityProvider,
    PlaceSuggestion, PlaceProvider, Result, SearchSession, SessionEvents,
};
use carefinder::search::SearchFacet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Route the session's log output through the test harness
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Event sink that records everything it receives
#[derive(Default)]
struct Recorder {
    suggestions: Mutex<Vec<Vec<PlaceSuggestion>>>,
    hints: Mutex<Vec<usize>>,
    coordinates: Mutex<Vec<Coordinate>>,
    facilities: Mutex<Vec<Vec<Facility>>>,
    errors: Mutex<Vec<String>>,
}

/// Newtype over `Arc<Recorder>`; the orphan rule forbids implementing the
/// foreign `SessionEvents` trait directly on `Arc<Recorder>` here
struct RecorderSink(Arc<Recorder>);

impl SessionEvents for RecorderSink {
    fn on_suggestions(&self, suggestions: Vec<PlaceSuggestion>) {
        self.0.suggestions.lock().unwrap().push(suggestions);
    }

    fn on_input_too_short(&self, min_chars: usize) {
        self.0.hints.lock().unwrap().push(min_chars);
    }

    fn on_coordinate_selected(&self, coordinate: Coordinate) {
        self.0.coordinates.lock().unwrap().push(coordinate);
    }

    fn on_facilities_updated(&self, facilities: Vec<Facility>) {
        self.0.facilities.lock().unwrap().push(facilities);
    }

    fn on_search_error(&self, message: String) {
        self.0.errors.lock().unwrap().push(message);
    }
}

/// Place provider that answers the general facet from a fixed script and
/// can be toggled into a failing state
struct ScriptedPlaces {
    results: Vec<PlaceSuggestion>,
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PlaceProvider for ScriptedPlaces {
    async fn search_facet(
        &self,
        _query: &str,
        _facet: SearchFacet,
    ) -> Result<Vec<PlaceSuggestion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CareFinderError::network("geocoding unreachable"));
        }
        // Every facet answers with the same script; the engine dedupes
        Ok(self.results.clone())
    }
}

/// Facility provider with fixed per-category records
struct ScriptedFacilities {
    hospitals: Vec<FacilityRecord>,
    clinics: Vec<FacilityRecord>,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl FacilityProvider for ScriptedFacilities {
    async fn fetch_category(
        &self,
        _center: &Coordinate,
        _radius_km: f64,
        kind: FacilityKind,
    ) -> Result<Vec<FacilityRecord>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CareFinderError::network("overpass unreachable"));
        }
        Ok(match kind {
            FacilityKind::Hospital => self.hospitals.clone(),
            FacilityKind::Clinic => self.clinics.clone(),
        })
    }
}

fn suggestion(id: &str, name: &str, lat: f64, lon: f64, importance: f64) -> PlaceSuggestion {
    PlaceSuggestion {
        id: id.to_string(),
        display_name: name.to_string(),
        latitude: lat,
        longitude: lon,
        category: "city".to_string(),
        importance,
    }
}

fn record(id: &str, name: &str, lat: f64, lon: f64) -> FacilityRecord {
    FacilityRecord {
        id: id.to_string(),
        name: Some(name.to_string()),
        latitude: lat,
        longitude: lon,
    }
}

struct Harness {
    session: SearchSession<ScriptedPlaces, ScriptedFacilities, RecorderSink>,
    recorder: Arc<Recorder>,
    places_failing: Arc<AtomicBool>,
    facilities_failing: Arc<AtomicBool>,
    place_calls: Arc<AtomicUsize>,
}

fn harness(places: Vec<PlaceSuggestion>) -> Harness {
    init_tracing();
    let places_failing = Arc::new(AtomicBool::new(false));
    let facilities_failing = Arc::new(AtomicBool::new(false));
    let place_calls = Arc::new(AtomicUsize::new(0));
    let recorder = Arc::new(Recorder::default());

    // Two hospitals and a clinic around central Bangkok
    let facilities = ScriptedFacilities {
        hospitals: vec![
            record("node/1", "Chulalongkorn Hospital", 13.7326, 100.5262),
            record("way/2", "Siriraj Hospital", 13.7581, 100.4797),
        ],
        clinics: vec![record("node/3", "Silom Clinic", 13.7248, 100.5340)],
        failing: Arc::clone(&facilities_failing),
    };

    let mut config = CareFinderConfig::default();
    // Integration tests run on real time; keep the debounce negligible
    config.search.debounce_ms = 1;

    Harness {
        session: SearchSession::new(
            config,
            ScriptedPlaces {
                results: places,
                failing: Arc::clone(&places_failing),
                calls: Arc::clone(&place_calls),
            },
            facilities,
            RecorderSink(Arc::clone(&recorder)),
        ),
        recorder,
        places_failing,
        facilities_failing,
        place_calls,
    }
}

/// Typing a query yields ranked suggestions, selecting one makes it the
/// active coordinate and produces a distance-sorted facility list
#[tokio::test]
async fn test_search_select_discover_flow() {
    let h = harness(vec![
        suggestion("10", "Bangkok, Thailand", 13.7563, 100.5018, 0.85),
        suggestion("11", "Bang Sue, Bangkok", 13.8078, 100.5372, 0.40),
    ]);

    h.session.input_changed("Bangkok").await;

    let batches = h.recorder.suggestions.lock().unwrap().clone();
    let ranked = batches.last().expect("no suggestion batch");
    assert_eq!(ranked[0].display_name, "Bangkok, Thailand");

    let picked = ranked[0].clone();
    h.session.select_suggestion(&picked).await;

    let coordinates = h.recorder.coordinates.lock().unwrap().clone();
    assert_eq!(coordinates.len(), 1);
    assert_eq!(coordinates[0].label, "Bangkok, Thailand");

    let facility_batches = h.recorder.facilities.lock().unwrap().clone();
    let listed = facility_batches.last().expect("no facility batch");
    assert_eq!(listed.len(), 3);
    // Non-decreasing distance, mixed categories
    for pair in listed.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
    }
    assert_eq!(listed[0].name, "Siriraj Hospital");
    assert!(listed.iter().any(|f| f.kind == FacilityKind::Clinic));
}

/// The ranking contract: a low-importance prefix match outranks
/// high-importance non-prefix matches
#[tokio::test]
async fn test_prefix_match_outranks_importance() {
    let h = harness(vec![
        suggestion("1", "Hospital district, Bangkok", 13.75, 100.50, 0.9),
        suggestion("2", "Bangkok Hospital", 13.74, 100.55, 0.05),
        suggestion("3", "Old Bangkok Hospital ruins", 13.70, 100.49, 0.3),
    ]);

    h.session.input_changed("Bangkok Hosp").await;

    let batches = h.recorder.suggestions.lock().unwrap().clone();
    let names: Vec<String> = batches
        .last()
        .expect("no suggestion batch")
        .iter()
        .map(|s| s.display_name.clone())
        .collect();
    assert_eq!(
        names,
        vec![
            "Bangkok Hospital",
            "Hospital district, Bangkok",
            "Old Bangkok Hospital ruins",
        ]
    );
}

/// Autocomplete failure degrades to an empty list plus a notice, and the
/// next keystroke retries successfully
#[tokio::test]
async fn test_autocomplete_failure_is_recoverable() {
    let h = harness(vec![suggestion("1", "Bangkok", 13.7563, 100.5018, 0.9)]);

    h.places_failing.store(true, Ordering::SeqCst);
    h.session.input_changed("Bangkok").await;

    assert_eq!(
        h.recorder.suggestions.lock().unwrap().last(),
        Some(&Vec::new())
    );
    assert_eq!(h.recorder.errors.lock().unwrap().len(), 1);

    // The session survives; typing again works
    h.places_failing.store(false, Ordering::SeqCst);
    h.session.input_changed("Bangkok").await;

    let batches = h.recorder.suggestions.lock().unwrap().clone();
    assert_eq!(batches.last().unwrap().len(), 1);
}

/// Discovery failure after a coordinate change leaves the cleared list in
/// place and surfaces a notice
#[tokio::test]
async fn test_discovery_failure_after_invalidation() {
    let h = harness(Vec::new());

    h.facilities_failing.store(true, Ordering::SeqCst);
    let center = Coordinate::new(13.7563, 100.5018, "Bangkok").unwrap();
    h.session.set_active_coordinate(center).await;

    let facility_batches = h.recorder.facilities.lock().unwrap().clone();
    // Only the invalidation emit; the failed batch never lands
    assert_eq!(facility_batches, vec![Vec::new()]);
    assert_eq!(h.recorder.errors.lock().unwrap().len(), 1);

    // A later coordinate change retries and succeeds
    h.facilities_failing.store(false, Ordering::SeqCst);
    let center = Coordinate::new(13.76, 100.50, "Bangkok again").unwrap();
    h.session.set_active_coordinate(center).await;

    let facility_batches = h.recorder.facilities.lock().unwrap().clone();
    assert_eq!(facility_batches.last().unwrap().len(), 3);
}

/// A too-short query never reaches the provider; the host receives a hint
/// rather than a failure signal
#[tokio::test]
async fn test_short_query_no_provider_call() {
    let h = harness(Vec::new());

    h.session.input_changed("B").await;

    assert_eq!(h.place_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        h.recorder.suggestions.lock().unwrap().last(),
        Some(&Vec::new())
    );
    assert_eq!(h.recorder.hints.lock().unwrap().clone(), vec![2]);
    assert!(h.recorder.errors.lock().unwrap().is_empty());
}

/// Geolocation fixes anchor discovery exactly like a selection does
#[tokio::test]
async fn test_position_fix_triggers_discovery() {
    let h = harness(Vec::new());

    h.session.apply_position_fix(13.7563, 100.5018).await;

    let coordinates = h.recorder.coordinates.lock().unwrap().clone();
    assert_eq!(coordinates.len(), 1);
    assert_eq!(coordinates[0].label, "Current location");

    let facility_batches = h.recorder.facilities.lock().unwrap().clone();
    assert_eq!(facility_batches.last().unwrap().len(), 3);
}

/// Geolocation denial surfaces a notice without disturbing prior results
#[tokio::test]
async fn test_position_denial_keeps_prior_results() {
    let h = harness(Vec::new());

    h.session.apply_position_fix(13.7563, 100.5018).await;
    let before = h.recorder.facilities.lock().unwrap().clone();

    h.session.position_unavailable("permission denied");

    assert_eq!(h.recorder.facilities.lock().unwrap().clone(), before);
    assert!(
        h.recorder
            .errors
            .lock()
            .unwrap()
            .last()
            .unwrap()
            .contains("permission denied")
    );
    assert!(h.session.active_coordinate().is_some());
}

/// Suggestion batches never contain the same place id twice
#[tokio::test]
async fn test_suggestions_are_deduplicated() {
    let h = harness(vec![
        suggestion("1", "Bangkok", 13.7563, 100.5018, 0.9),
        suggestion("2", "Bangkok Noi", 13.7606, 100.4769, 0.5),
    ]);

    // Every facet returns the same two places; they must appear once each
    h.session.input_changed("Bangkok").await;

    let batches = h.recorder.suggestions.lock().unwrap().clone();
    let ranked = batches.last().expect("no suggestion batch");
    let mut ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
    let before = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), before);
}
