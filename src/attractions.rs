//! Points-of-interest lookup around resolved coordinates
//!
//! Runs a staged widening search against an Overpass-style provider:
//! a combined tourism/historic/leisure query first, then museums and
//! galleries, then a broader named-entity query over a larger radius.
//! Stages share one seen-set, tolerate failure independently, and stop
//! as soon as the requested number of names has been collected.

use crate::Result;
use crate::config::PoiConfig;
use crate::error::TripScoutError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "TripScout/0.1.0";

/// Names too generic to present as an attraction
const GENERIC_NAMES: &[&str] = &["park", "museum", "gallery", "monument", "attraction", "place"];

/// Name tag preference order; the first non-empty value wins
const NAME_KEYS: &[&str] = &[
    "name:en",
    "name:en-GB",
    "name:en-US",
    "name",
    "official_name",
    "alt_name",
    "short_name",
];

/// One raw map element; only its tags matter here
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiElement {
    pub tags: HashMap<String, String>,
}

impl PoiElement {
    #[must_use]
    pub fn with_name(key: &str, value: &str) -> Self {
        Self {
            tags: HashMap::from([(key.to_string(), value.to_string())]),
        }
    }
}

/// POI service seam. The filter is a `;`-separated list of tag
/// selectors (e.g. `["tourism"];["historic"]`); how it is rendered into
/// the provider's query language is the implementation's concern.
#[async_trait]
pub trait PoiProvider: Send + Sync {
    async fn query(
        &self,
        filter: &str,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
        max_results: u32,
    ) -> Result<Vec<PoiElement>>;
}

struct SearchStage {
    filter: &'static str,
    radius_m: u32,
}

/// Combined query over the most common attraction tags
const COMBINED_STAGE: SearchStage = SearchStage {
    filter: r#"["tourism"];["historic"];["leisure"]"#,
    radius_m: 15_000,
};

/// Museums and galleries specifically
const MUSEUM_STAGE: SearchStage = SearchStage {
    filter: r#"["tourism"="museum"];["tourism"="gallery"]"#,
    radius_m: 15_000,
};

/// Broadened search for anything named with an attraction tag
const NAMED_STAGE: SearchStage = SearchStage {
    filter: r#"["name"]["tourism"];["name"]["historic"];["name"]["leisure"]"#,
    radius_m: 20_000,
};

/// Accumulates accepted names up to the limit, deduplicating across
/// stages through one shared seen-set
struct NameCollector {
    names: Vec<String>,
    seen: HashSet<String>,
    limit: usize,
}

impl NameCollector {
    fn new(limit: usize) -> Self {
        Self {
            names: Vec::new(),
            seen: HashSet::new(),
            limit,
        }
    }

    fn absorb(&mut self, elements: &[PoiElement]) {
        for element in elements {
            if self.names.len() >= self.limit {
                break;
            }

            let Some(name) = pick_name(element) else {
                continue;
            };
            let name = name.trim();
            if name.len() <= 2 {
                continue;
            }
            if GENERIC_NAMES.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            if self.seen.insert(name.to_string()) {
                self.names.push(name.to_string());
            }
        }
    }

    fn is_short(&self) -> bool {
        self.names.len() < self.limit
    }

    fn remaining(&self) -> u32 {
        (self.limit - self.names.len()) as u32
    }

    fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// Collects deduplicated attraction names through the widening stages
pub struct AttractionService {
    provider: Arc<dyn PoiProvider>,
}

impl AttractionService {
    pub fn new(provider: Arc<dyn PoiProvider>) -> Self {
        Self { provider }
    }

    /// Find up to `limit` attraction names near the coordinates, in
    /// discovery order. Returns what it has on partial failure; an
    /// empty result means no stage produced a usable name.
    pub async fn find(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<String> {
        let mut collector = NameCollector::new(limit);

        // The combined stage requests extra raw results so that dense
        // areas are served by a single upstream round trip
        let oversampled = (limit * 3) as u32;
        self.run_stage(&COMBINED_STAGE, latitude, longitude, oversampled, &mut collector)
            .await;

        if collector.is_short() {
            let remaining = collector.remaining();
            self.run_stage(&MUSEUM_STAGE, latitude, longitude, remaining, &mut collector)
                .await;
        }

        if collector.is_short() {
            let remaining = collector.remaining();
            self.run_stage(&NAMED_STAGE, latitude, longitude, remaining, &mut collector)
                .await;
        }

        collector.into_names()
    }

    async fn run_stage(
        &self,
        stage: &SearchStage,
        latitude: f64,
        longitude: f64,
        max_results: u32,
        collector: &mut NameCollector,
    ) {
        match self
            .provider
            .query(stage.filter, latitude, longitude, stage.radius_m, max_results)
            .await
        {
            Ok(elements) => {
                debug!("Attraction stage returned {} elements", elements.len());
                collector.absorb(&elements);
            }
            Err(e) => warn!("Attraction search stage failed: {}", e),
        }
    }
}

fn pick_name(element: &PoiElement) -> Option<&str> {
    NAME_KEYS.iter().find_map(|key| {
        element
            .tags
            .get(*key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    })
}

/// Format attraction names into the user-facing list response
#[must_use]
pub fn format_places_response(place_name: &str, names: &[String]) -> String {
    if names.is_empty() {
        return format!("Sorry, I couldn't find tourist attractions for {place_name}.");
    }

    let mut response = format!("In {place_name} these are the places you can go,\n\n");
    for name in names {
        response.push_str(name);
        response.push('\n');
    }

    response.trim().to_string()
}

/// Overpass API client
pub struct OverpassClient {
    client: Client,
    base_url: String,
    upstream_timeout: u32,
}

impl OverpassClient {
    /// Create a new client
    pub fn new(config: &PoiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TripScoutError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            upstream_timeout: config.timeout_seconds,
        })
    }

    fn build_query(
        &self,
        filter: &str,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
        max_results: u32,
    ) -> String {
        let mut clauses = String::new();
        for selector in filter.split(';').filter(|s| !s.is_empty()) {
            clauses.push_str(&format!(
                "node{selector}(around:{radius_m},{latitude},{longitude});way{selector}(around:{radius_m},{latitude},{longitude});"
            ));
        }

        format!(
            "[out:json][timeout:{}];({});out center {};",
            self.upstream_timeout, clauses, max_results
        )
    }
}

#[async_trait]
impl PoiProvider for OverpassClient {
    async fn query(
        &self,
        filter: &str,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
        max_results: u32,
    ) -> Result<Vec<PoiElement>> {
        let query = self.build_query(filter, latitude, longitude, radius_m, max_results);
        debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| TripScoutError::api(format!("Overpass request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TripScoutError::api(format!(
                "Overpass service returned status {}",
                response.status()
            )));
        }

        let payload: overpass::QueryResponse = response
            .json()
            .await
            .map_err(|e| TripScoutError::api(format!("Failed to parse Overpass response: {e}")))?;

        Ok(payload
            .elements
            .into_iter()
            .map(|element| PoiElement {
                tags: element.tags,
            })
            .collect())
    }
}

/// Overpass API response structures
mod overpass {
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize)]
    pub struct QueryResponse {
        #[serde(default)]
        pub elements: Vec<Element>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Element {
        #[serde(default)]
        pub tags: HashMap<String, String>,
    }
}
