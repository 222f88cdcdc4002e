//! Place extraction and intent classification for raw user queries
//!
//! Extraction is a best-effort heuristic pattern matcher, not a parser:
//! an ordered list of patterns is tried first, then a stop-word fallback
//! over the remaining significant words. Pattern order is part of the
//! observable behavior and must not be reordered.

use regex::Regex;
use std::sync::LazyLock;

/// What the user asked for. At least one flag is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    pub wants_weather: bool,
    pub wants_places: bool,
}

/// Ordered capture patterns; the first match wins.
static PLACE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)going to go to ([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
        r"(?i)going to (?:go to |visit )?([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
        r"(?i)visit (?:to )?([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
        r"(?i)trip to ([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
        r"(?i)in ([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
        r"(?i)to ([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
        r"(?i)plan.*?([a-zA-Z\s\-']+?)(?:,|\.|$|\?|let|what|and)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid place pattern"))
    .collect()
});

/// Filler words stripped from a captured span, whole-word
static FILLER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the|a|an|my|our|trip|visit|going|go)\b").expect("invalid filler pattern")
});

static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\\.!?]+$").expect("invalid punctuation pattern"));

/// Words carrying no place information in the fallback path
const STOP_WORDS: &[&str] = &[
    "i", "im", "going", "go", "to", "the", "a", "an", "my", "our", "trip", "visit", "plan",
    "lets", "let", "what", "is", "are", "there", "and", "can", "places", "temperature",
];

const WEATHER_KEYWORDS: &[&str] = &["temperature", "temp", "weather", "rain", "forecast", "climate"];

const PLACES_KEYWORDS: &[&str] = &[
    "places",
    "attractions",
    "visit",
    "see",
    "tourist",
    "sightseeing",
    "go to",
];

/// Extract a place name from free text.
///
/// Tries the capture patterns in order; a match whose cleaned span is
/// still longer than two characters is title-cased and returned. When no
/// pattern produces a usable span, falls back to joining the first three
/// significant words of the input. Returns `None` when nothing survives.
pub fn extract_place(text: &str) -> Option<String> {
    for pattern in PLACE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let span = captures.get(1).map_or("", |m| m.as_str());
            let cleaned = FILLER_WORDS.replace_all(span, "");
            let cleaned = TRAILING_PUNCT.replace(cleaned.trim(), "");
            let cleaned = cleaned.trim();
            if cleaned.len() > 2 {
                return Some(title_case(cleaned));
            }
        }
    }

    // Fallback: first significant words of the raw input
    let mut significant: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        let stripped = word.trim_matches(|c| matches!(c, '.' | ',' | '!' | '?'));
        let lowered = stripped.to_lowercase();
        if !STOP_WORDS.contains(&lowered.as_str()) && lowered.len() > 2 {
            significant.push(stripped);
        }
    }

    if significant.is_empty() {
        return None;
    }

    let count = significant.len().min(3);
    Some(title_case(&significant[..count].join(" ")))
}

/// Classify what the user wants from the query text.
///
/// Keyword containment on the lower-cased text; a query implying neither
/// category asks for everything.
pub fn classify_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();

    let mut wants_weather = WEATHER_KEYWORDS.iter().any(|kw| lowered.contains(kw));
    let mut wants_places = PLACES_KEYWORDS.iter().any(|kw| lowered.contains(kw));

    if !wants_weather && !wants_places {
        wants_weather = true;
        wants_places = true;
    }

    Intent {
        wants_weather,
        wants_places,
    }
}

/// Capitalize the first letter of every whitespace-separated word
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("I'm going to go to Paris, what is the temperature there?", "Paris")]
    #[case("I'm going to go to bangalore, let's plan my trip.", "Bangalore")]
    #[case("We booked a trip to New York.", "New York")]
    #[case("I will visit Rome and see the sights", "Rome")]
    #[case("what's the weather in Berlin?", "Berlin")]
    #[case("GOING TO GO TO LONDON", "London")]
    fn test_extract_place_patterns(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_place(input).as_deref(), Some(expected));
    }

    #[test]
    fn test_extract_place_strips_fillers() {
        // The captured span keeps filler words until the cleanup pass
        assert_eq!(
            extract_place("a trip to the Grand Canyon.").as_deref(),
            Some("Grand Canyon")
        );
    }

    #[test]
    fn test_extract_place_capture_stops_at_terminator() {
        // "and" terminates the capture even mid-phrase
        assert_eq!(
            extract_place("trip to Vienna and Salzburg").as_deref(),
            Some("Vienna")
        );
    }

    #[test]
    fn test_extract_place_fallback_significant_words() {
        // No pattern matches; the fallback keeps non-stop-words
        assert_eq!(
            extract_place("tell me about Atlantis").as_deref(),
            Some("Tell About Atlantis")
        );
    }

    #[test]
    fn test_extract_place_rejects_short_capture() {
        // Captured span collapses below three characters, fallback kicks in
        assert_eq!(extract_place("going to go").as_deref(), None);
    }

    #[rstest]
    #[case("")]
    #[case("go to it")]
    #[case("i am")]
    fn test_extract_place_absence(#[case] input: &str) {
        assert_eq!(extract_place(input), None);
    }

    #[test]
    fn test_title_case_lowercases_tail() {
        assert_eq!(title_case("NEW   YORK"), "New York");
        assert_eq!(title_case("aix-en-provence"), "Aix-en-provence");
    }

    #[rstest]
    #[case("what is the temperature there?", true, false)]
    #[case("will it rain tomorrow", true, false)]
    #[case("what are the attractions", false, true)]
    #[case("places I can see", false, true)]
    #[case("weather and sightseeing please", true, true)]
    #[case("I'm going to go to Paris", false, true)] // "go to" implies places
    fn test_classify_intent_keywords(
        #[case] input: &str,
        #[case] weather: bool,
        #[case] places: bool,
    ) {
        let intent = classify_intent(input);
        assert_eq!(intent.wants_weather, weather);
        assert_eq!(intent.wants_places, places);
    }

    #[rstest]
    #[case("")]
    #[case("Bangalore")]
    #[case("plan everything for me")]
    fn test_classify_intent_defaults_to_both(#[case] input: &str) {
        let intent = classify_intent(input);
        assert!(intent.wants_weather);
        assert!(intent.wants_places);
    }

    #[test]
    fn test_classify_intent_always_has_one_flag() {
        for input in ["", "xyz", "what is the temperature", "places to see", "?!"] {
            let intent = classify_intent(input);
            assert!(intent.wants_weather || intent.wants_places);
        }
    }
}
