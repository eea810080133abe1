use serde::Deserialize;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::OverpassConfig;

const USER_AGENT: &str = "chapelmap/0.1.0";

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
}

/// A single element from Overpass (node, way, or relation)
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// Computed centroid for ways and relations, present when the query
/// ends with `out center`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("all {attempted} Overpass mirrors failed, last error: {last}")]
    Exhausted { attempted: usize, last: String },
    #[error("no Overpass mirrors configured")]
    NoMirrors,
    #[error("failed to create HTTP client")]
    Client(#[source] reqwest::Error),
}

/// Outcome of one query attempt against a single mirror
enum Attempt {
    Success(Vec<Element>),
    RateLimited(String),
    Failed(String),
}

/// Build the Overpass QL query for LDS buildings around a center point.
///
/// Matches the denomination tag variants used in OSM for LDS buildings
/// plus the temple building type. `out center` gives ways and relations
/// a representative coordinate.
pub fn build_query(center: (f64, f64), radius_m: u32) -> String {
    let (lat, lon) = center;
    format!(
        r#"[out:json][timeout:60];
(
  node["amenity"="place_of_worship"]["denomination"="mormon"](around:{radius},{lat},{lon});
  way["amenity"="place_of_worship"]["denomination"="mormon"](around:{radius},{lat},{lon});
  relation["amenity"="place_of_worship"]["denomination"="mormon"](around:{radius},{lat},{lon});

  node["amenity"="place_of_worship"]["denomination"="latter_day_saints"](around:{radius},{lat},{lon});
  way["amenity"="place_of_worship"]["denomination"="latter_day_saints"](around:{radius},{lat},{lon});
  relation["amenity"="place_of_worship"]["denomination"="latter_day_saints"](around:{radius},{lat},{lon});

  node["amenity"="place_of_worship"]["religion"="christian"]["denomination"="mormon"](around:{radius},{lat},{lon});
  way["amenity"="place_of_worship"]["religion"="christian"]["denomination"="mormon"](around:{radius},{lat},{lon});

  node["building"="temple"]["denomination"="mormon"](around:{radius},{lat},{lon});
  way["building"="temple"]["denomination"="mormon"](around:{radius},{lat},{lon});
);
out center;"#,
        radius = radius_m,
        lat = lat,
        lon = lon
    )
}

/// Fetch LDS building elements from the Overpass API.
///
/// Tries each configured mirror in order. A 429 backs off briefly and
/// moves on to the next mirror; any other failure moves on immediately.
/// The first successful response wins.
///
/// # Arguments
/// * `center` - (lat, lon) center point
/// * `radius_m` - Search radius in meters
/// * `config` - Mirror list and timing knobs
pub fn fetch_buildings(
    center: (f64, f64),
    radius_m: u32,
    config: &OverpassConfig,
) -> Result<Vec<Element>, FetchError> {
    let query = build_query(center, radius_m);

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        // Client timeout above the query's server-side 60s timeout
        .timeout(Duration::from_secs(config.timeout_secs + 15))
        .build()
        .map_err(FetchError::Client)?;

    try_mirrors(config, |url| {
        // Overpass expects form-encoded POST data: data=<query>
        let response = match client.post(url).form(&[("data", query.as_str())]).send() {
            Ok(r) => r,
            Err(e) => return Attempt::Failed(format!("{url}: {e}")),
        };

        let status = response.status();
        if status.as_u16() == 429 {
            return Attempt::RateLimited(format!("{url}: rate limited (429)"));
        }
        if !status.is_success() {
            return Attempt::Failed(format!("{url}: HTTP {status}"));
        }

        match response.json::<OverpassResponse>() {
            Ok(body) => Attempt::Success(body.elements),
            Err(e) => Attempt::Failed(format!("{url}: invalid response: {e}")),
        }
    })
}

/// Run the mirror fallback loop, recording the last error as an explicit
/// accumulator. Rate limiting sleeps a jittered backoff before moving to
/// the NEXT mirror; the limited mirror is never re-queried.
fn try_mirrors<F>(config: &OverpassConfig, mut attempt: F) -> Result<Vec<Element>, FetchError>
where
    F: FnMut(&str) -> Attempt,
{
    let mut last_error: Option<String> = None;

    for url in &config.urls {
        match attempt(url) {
            Attempt::Success(elements) => return Ok(elements),
            Attempt::RateLimited(err) => {
                last_error = Some(err);
                let jitter = fastrand::u64(0..=config.backoff_jitter_ms);
                thread::sleep(Duration::from_millis(config.backoff_ms + jitter));
            }
            Attempt::Failed(err) => {
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(last) => Err(FetchError::Exhausted {
            attempted: config.urls.len(),
            last,
        }),
        None => Err(FetchError::NoMirrors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(urls: Vec<String>) -> OverpassConfig {
        OverpassConfig {
            urls,
            timeout_secs: 60,
            backoff_ms: 0,
            backoff_jitter_ms: 0,
        }
    }

    #[test]
    fn test_build_query_tag_groups() {
        let query = build_query((39.0997, -94.5786), 100000);

        assert!(query.contains(r#"node["amenity"="place_of_worship"]["denomination"="mormon"]"#));
        assert!(
            query.contains(
                r#"relation["amenity"="place_of_worship"]["denomination"="latter_day_saints"]"#
            )
        );
        assert!(query.contains(r#"way["building"="temple"]["denomination"="mormon"]"#));
        assert!(query.contains("around:100000,39.0997,-94.5786"));
        assert!(query.ends_with("out center;"));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "elements": [
                {"type": "node", "id": 1, "lat": 39.10, "lon": -94.58,
                 "tags": {"name": "Kansas City Temple"}},
                {"type": "way", "id": 2, "center": {"lat": 39.2, "lon": -94.6}}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert_eq!(response.elements[0].type_, "node");
        assert_eq!(response.elements[0].lat, Some(39.10));
        let center = response.elements[1].center.unwrap();
        assert_eq!(center.lat, 39.2);
        assert_eq!(center.lon, -94.6);
    }

    #[test]
    fn test_fallback_stops_at_first_success() {
        let config = test_config(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ]);

        let mut attempted = Vec::new();
        let elements = try_mirrors(&config, |url| {
            attempted.push(url.to_string());
            match url {
                "a" => Attempt::RateLimited("a: rate limited (429)".to_string()),
                "b" => Attempt::Failed("b: HTTP 504".to_string()),
                _ => Attempt::Success(Vec::new()),
            }
        })
        .unwrap();

        assert!(elements.is_empty());
        // Mirrors beyond the first success are never queried
        assert_eq!(attempted, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_exhaustion_carries_last_error() {
        let config = test_config(vec!["a".to_string(), "b".to_string()]);

        let err = try_mirrors(&config, |url| Attempt::Failed(format!("{url}: HTTP 502")))
            .unwrap_err();

        match err {
            FetchError::Exhausted { attempted, last } => {
                assert_eq!(attempted, 2);
                assert_eq!(last, "b: HTTP 502");
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_mirror_list() {
        let config = test_config(Vec::new());

        let err = try_mirrors(&config, |_| Attempt::Success(Vec::new())).unwrap_err();
        assert!(matches!(err, FetchError::NoMirrors));
    }
}
