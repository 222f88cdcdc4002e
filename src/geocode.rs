//! Coordinate resolution for free-text place names
//!
//! Resolves a place name to coordinates through a geocoding provider,
//! scoring ambiguous candidates and memoizing every outcome (including
//! absence) in a process-wide cache keyed by the normalized name.

use crate::Result;
use crate::config::GeocodingConfig;
use crate::error::TripScoutError;
use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "TripScout/0.1.0";

/// One geocoder hit, as returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub latitude: f64,
    pub longitude: f64,
    /// Place type, e.g. "city" or "village"
    pub kind: String,
    /// Feature class, e.g. "place" or "boundary"
    pub class: String,
    pub display_name: String,
    pub name: String,
}

/// Geocoding service seam. Implementations map transport failures,
/// non-2xx statuses and malformed payloads to `Api` errors.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<GeocodeHit>>;
}

/// Process-wide memo of resolved place names, including cached absence.
///
/// Unbounded by design: call volume is low and entries are small. Cloning
/// shares the underlying map, so one cache can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct CoordinateCache {
    inner: Arc<Mutex<HashMap<String, Option<Coordinates>>>>,
}

impl CoordinateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a normalized key. The outer `Option` is the cache miss.
    pub fn get(&self, key: &str) -> Option<Option<Coordinates>> {
        self.lock().get(key).copied()
    }

    pub fn insert(&self, key: String, value: Option<Coordinates>) {
        self.lock().insert(key, value);
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<Coordinates>>> {
        // A poisoned lock only means another request panicked mid-insert;
        // the map itself is still usable.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolves place names to coordinates with memoization and
/// best-candidate scoring among ambiguous geocoding results.
pub struct CoordinateResolver {
    provider: Arc<dyn GeocodingProvider>,
    cache: CoordinateCache,
    throttle: Duration,
    max_candidates: u32,
}

impl CoordinateResolver {
    pub fn new(
        provider: Arc<dyn GeocodingProvider>,
        cache: CoordinateCache,
        config: &GeocodingConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            throttle: Duration::from_millis(config.throttle_ms),
            max_candidates: config.max_candidates,
        }
    }

    /// Resolve a place name to coordinates, or `None` when the place is
    /// unknown. Transport and payload errors are logged and mapped to
    /// absence; every outcome is cached for the process lifetime.
    pub async fn resolve(&self, place_name: &str) -> Option<Coordinates> {
        let key = place_name.trim().to_lowercase();

        if let Some(cached) = self.cache.get(&key) {
            debug!("Coordinate cache hit for '{}'", key);
            return cached;
        }

        // Courtesy delay for the upstream rate limit
        tokio::time::sleep(self.throttle).await;

        debug!("Fetching coordinates for: {}", place_name);
        let resolved = match self.provider.search(place_name, self.max_candidates).await {
            Ok(hits) => {
                debug!("Received {} geocoding results", hits.len());
                select_candidate(&key, &hits)
            }
            Err(e) => {
                warn!("Geocoding lookup failed for '{}': {}", place_name, e);
                None
            }
        };

        match resolved {
            Some(coords) => debug!("Resolved '{}' to {}", key, coords.format_coordinates()),
            None => debug!("No coordinates found for '{}'", key),
        }

        self.cache.insert(key, resolved);
        resolved
    }
}

/// Pick the best hit: highest match score wins, stable on ties so the
/// geocoder's own ordering breaks them. Hits with an exactly-zero
/// latitude or longitude are unset placeholders, never real locations.
fn select_candidate(normalized_query: &str, hits: &[GeocodeHit]) -> Option<Coordinates> {
    let mut candidates: Vec<(i32, Coordinates)> = hits
        .iter()
        .filter(|hit| hit.latitude != 0.0 && hit.longitude != 0.0)
        .map(|hit| {
            (
                match_score(hit, normalized_query),
                Coordinates::new(hit.latitude, hit.longitude),
            )
        })
        .collect();

    if !candidates.is_empty() {
        candidates.sort_by_key(|(score, _)| Reverse(*score));
        return Some(candidates[0].1);
    }

    // Fall back to the geocoder's first raw result
    hits.first()
        .filter(|hit| hit.latitude != 0.0 && hit.longitude != 0.0)
        .map(|hit| Coordinates::new(hit.latitude, hit.longitude))
}

fn match_score(hit: &GeocodeHit, normalized_query: &str) -> i32 {
    let mut score = 0;

    let kind = hit.kind.to_lowercase();
    if matches!(kind.as_str(), "city" | "town" | "administrative" | "village") {
        score += 10;
    }

    let class = hit.class.to_lowercase();
    if matches!(class.as_str(), "place" | "boundary") {
        score += 5;
    }

    if hit.display_name.to_lowercase().contains(normalized_query)
        || hit.name.to_lowercase().contains(normalized_query)
    {
        score += 15;
    }

    score
}

/// Nominatim-style geocoding client
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a new client
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TripScoutError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeocodingProvider for NominatimClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<GeocodeHit>> {
        let url = format!(
            "{}/search?q={}&format=json&limit={}&addressdetails=1&extratags=1",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        debug!("Geocoding request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TripScoutError::api(format!("Geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TripScoutError::api(format!(
                "Geocoding service returned status {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| TripScoutError::api(format!("Failed to parse geocoding response: {e}")))?;

        Ok(places.into_iter().map(GeocodeHit::from).collect())
    }
}

/// Raw Nominatim search result. Coordinates arrive as JSON strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    lat: String,
    #[serde(default)]
    lon: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    name: String,
}

impl From<NominatimPlace> for GeocodeHit {
    fn from(place: NominatimPlace) -> Self {
        Self {
            // Unparsable coordinates become 0.0 and are excluded as unset
            latitude: place.lat.parse().unwrap_or(0.0),
            longitude: place.lon.parse().unwrap_or(0.0),
            kind: place.kind,
            class: place.class,
            display_name: place.display_name,
            name: place.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        hits: Vec<GeocodeHit>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn with_hits(hits: Vec<GeocodeHit>) -> Self {
            Self {
                hits,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                hits: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeocodingProvider for StubProvider {
        async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<GeocodeHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TripScoutError::api("stub transport failure"));
            }
            Ok(self.hits.clone())
        }
    }

    fn hit(lat: f64, lon: f64, kind: &str, class: &str, display: &str, name: &str) -> GeocodeHit {
        GeocodeHit {
            latitude: lat,
            longitude: lon,
            kind: kind.to_string(),
            class: class.to_string(),
            display_name: display.to_string(),
            name: name.to_string(),
        }
    }

    fn test_config() -> GeocodingConfig {
        GeocodingConfig {
            throttle_ms: 0,
            ..GeocodingConfig::default()
        }
    }

    fn resolver(provider: Arc<StubProvider>) -> CoordinateResolver {
        CoordinateResolver::new(provider, CoordinateCache::new(), &test_config())
    }

    #[tokio::test]
    async fn test_cache_normalizes_case_and_whitespace() {
        let provider = Arc::new(StubProvider::with_hits(vec![hit(
            48.8566,
            2.3522,
            "city",
            "place",
            "Paris, France",
            "Paris",
        )]));
        let cache = CoordinateCache::new();
        let resolver =
            CoordinateResolver::new(provider.clone(), cache.clone(), &test_config());

        let first = resolver.resolve("Paris").await;
        let second = resolver.resolve(" paris ").await;
        let third = resolver.resolve("PARIS").await;

        assert_eq!(first, Some(Coordinates::new(48.8566, 2.3522)));
        assert_eq!(second, first);
        assert_eq!(third, first);
        assert_eq!(provider.call_count(), 1);
        // All three spellings share one normalized entry
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }

    #[tokio::test]
    async fn test_absence_is_cached() {
        let provider = Arc::new(StubProvider::with_hits(Vec::new()));
        let resolver = resolver(provider.clone());

        assert_eq!(resolver.resolve("Atlantis").await, None);
        assert_eq!(resolver.resolve("atlantis").await, None);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_maps_to_cached_absence() {
        let provider = Arc::new(StubProvider::failing());
        let resolver = resolver(provider.clone());

        assert_eq!(resolver.resolve("Paris").await, None);
        assert_eq!(resolver.resolve("Paris").await, None);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_coordinates_never_selected() {
        // The zero-coordinate hit outscores everything but is unset
        let provider = Arc::new(StubProvider::with_hits(vec![
            hit(0.0, 0.0, "city", "place", "paris zero", "paris"),
            hit(48.8566, 2.3522, "hamlet", "tourism", "somewhere else", "elsewhere"),
        ]));
        let resolver = resolver(provider);

        assert_eq!(
            resolver.resolve("paris").await,
            Some(Coordinates::new(48.8566, 2.3522))
        );
    }

    #[tokio::test]
    async fn test_all_results_unset_resolves_to_absence() {
        let provider = Arc::new(StubProvider::with_hits(vec![
            hit(0.0, 12.0, "city", "place", "a", "a"),
            hit(34.0, 0.0, "city", "place", "b", "b"),
        ]));
        let resolver = resolver(provider);

        assert_eq!(resolver.resolve("nowhere").await, None);
    }

    #[test]
    fn test_match_score_components() {
        let query = "springfield";
        let typed = hit(1.0, 1.0, "city", "highway", "x", "y");
        assert_eq!(match_score(&typed, query), 10);

        let classed = hit(1.0, 1.0, "road", "boundary", "x", "y");
        assert_eq!(match_score(&classed, query), 5);

        let contained = hit(1.0, 1.0, "road", "highway", "Springfield, USA", "y");
        assert_eq!(match_score(&contained, query), 15);

        let full = hit(1.0, 1.0, "town", "place", "Springfield, USA", "Springfield");
        assert_eq!(match_score(&full, query), 30);
    }

    #[test]
    fn test_tie_break_keeps_upstream_order() {
        let hits = vec![
            hit(10.0, 10.0, "city", "place", "first springfield", "springfield"),
            hit(20.0, 20.0, "city", "place", "second springfield", "springfield"),
        ];
        let selected = select_candidate("springfield", &hits);
        assert_eq!(selected, Some(Coordinates::new(10.0, 10.0)));
    }

    #[test]
    fn test_higher_score_beats_order() {
        let hits = vec![
            hit(10.0, 10.0, "road", "highway", "unrelated", "road"),
            hit(20.0, 20.0, "city", "place", "springfield proper", "springfield"),
        ];
        let selected = select_candidate("springfield", &hits);
        assert_eq!(selected, Some(Coordinates::new(20.0, 20.0)));
    }
}
