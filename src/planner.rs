//! Request orchestration: extract → resolve → fan out → aggregate
//!
//! The planner owns one request end to end. Expected failures at every
//! stage map to fixed user-facing sentences; only programming errors
//! propagate to the caller.

use crate::attractions::{AttractionService, OverpassClient, format_places_response};
use crate::config::{PlannerConfig, TripScoutConfig};
use crate::geocode::{CoordinateCache, CoordinateResolver, NominatimClient};
use crate::query::{classify_intent, extract_place};
use crate::weather::{OpenMeteoClient, WeatherService, format_weather_response};
use crate::{Result, models::WeatherReading};
use futures::future::OptionFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const NO_PLACE_RESPONSE: &str =
    "I couldn't identify the place you want to visit. Please specify a place name.";

const UNKNOWN_PLACE_RESPONSE: &str = "I don't know this place exists. Could you please check the spelling or provide more details about the location?";

/// Orchestrates one travel query across the resolver and the two
/// upstream lookups
pub struct TripPlanner {
    resolver: CoordinateResolver,
    weather: WeatherService,
    attractions: AttractionService,
    attraction_limit: usize,
    branch_timeout: Duration,
}

impl TripPlanner {
    /// Assemble the planner with injected services
    pub fn new(
        resolver: CoordinateResolver,
        weather: WeatherService,
        attractions: AttractionService,
        config: &PlannerConfig,
    ) -> Self {
        Self {
            resolver,
            weather,
            attractions,
            attraction_limit: config.attraction_limit as usize,
            branch_timeout: Duration::from_secs(config.branch_timeout_seconds.into()),
        }
    }

    /// Assemble the planner with the real upstream clients
    pub fn from_config(config: &TripScoutConfig) -> Result<Self> {
        let resolver = CoordinateResolver::new(
            Arc::new(NominatimClient::new(&config.geocoding)?),
            CoordinateCache::new(),
            &config.geocoding,
        );
        let weather = WeatherService::new(Arc::new(OpenMeteoClient::new(&config.weather)?));
        let attractions = AttractionService::new(Arc::new(OverpassClient::new(&config.poi)?));

        Ok(Self::new(resolver, weather, attractions, &config.planner))
    }

    /// Process one raw user query into a single response string.
    ///
    /// Never errs for expected failure modes; place-not-found and
    /// upstream outages come back as fixed sentences.
    pub async fn process_request(&self, user_input: &str) -> String {
        let Some(place_name) = extract_place(user_input) else {
            info!("No place name found in query");
            return NO_PLACE_RESPONSE.to_string();
        };

        info!("Processing request for '{}'", place_name);

        let Some(coordinates) = self.resolver.resolve(&place_name).await else {
            info!("'{}' did not resolve to coordinates", place_name);
            return UNKNOWN_PLACE_RESPONSE.to_string();
        };

        let intent = classify_intent(user_input);
        debug!(
            "Intent: weather={}, places={}, coordinates={}",
            intent.wants_weather,
            intent.wants_places,
            coordinates.format_coordinates()
        );

        // Fan out only the requested branches; each gets its own result
        // timeout and neither can fail or cancel the other
        let weather_branch: OptionFuture<_> = intent
            .wants_weather
            .then(|| {
                timeout(
                    self.branch_timeout,
                    self.weather
                        .current_weather(coordinates.latitude, coordinates.longitude),
                )
            })
            .into();
        let places_branch: OptionFuture<_> = intent
            .wants_places
            .then(|| {
                timeout(
                    self.branch_timeout,
                    self.attractions.find(
                        coordinates.latitude,
                        coordinates.longitude,
                        self.attraction_limit,
                    ),
                )
            })
            .into();

        let (weather_outcome, places_outcome) = tokio::join!(weather_branch, places_branch);

        let weather: Option<WeatherReading> = weather_outcome.and_then(|outcome| match outcome {
            Ok(reading) => reading,
            Err(_) => {
                warn!("Weather branch timed out");
                None
            }
        });

        let places: Vec<String> = places_outcome
            .and_then(|outcome| match outcome {
                Ok(names) => Some(names),
                Err(_) => {
                    warn!("Attraction branch timed out");
                    None
                }
            })
            .unwrap_or_default();

        self.aggregate(&place_name, weather, &places)
    }

    fn aggregate(
        &self,
        place_name: &str,
        weather: Option<WeatherReading>,
        places: &[String],
    ) -> String {
        match (weather, places.is_empty()) {
            (Some(reading), false) => {
                format!(
                    "{}. And these are the places you can go:\n\n{}",
                    format_weather_response(place_name, &reading),
                    places.join("\n")
                )
            }
            (Some(reading), true) => format_weather_response(place_name, &reading),
            (None, false) => format_places_response(place_name, places),
            (None, true) => {
                format!("I couldn't fetch information for {place_name}. Please try again.")
            }
        }
    }
}
