use std::collections::HashMap;

/// Sentinel used when no address tags are present; the presenter
/// suppresses the popup address row when it sees this value
pub const ADDRESS_UNAVAILABLE: &str = "Address not available";

/// Display name fallback when an element carries no name tag
pub const FALLBACK_NAME: &str = "LDS Building";

pub const DEFAULT_DENOMINATION: &str = "mormon";
pub const DEFAULT_RELIGION: &str = "christian";

/// Building subtype classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingKind {
    Temple,
    Meetinghouse,
}

impl BuildingKind {
    /// Classify a building from its OSM tags.
    ///
    /// This is a textual heuristic over free-form tags: a temple whose
    /// name and tags never mention "temple" will classify as a
    /// meetinghouse.
    pub fn from_tags(tags: &HashMap<String, String>) -> BuildingKind {
        let name = lowercased(tags, "name");
        let denomination = lowercased(tags, "denomination");
        let building = lowercased(tags, "building");

        if name.contains("temple")
            || denomination.contains("temple")
            || building == "temple"
            || (tags.get("amenity").map(String::as_str) == Some("place_of_worship")
                && name.contains("temple"))
        {
            BuildingKind::Temple
        } else {
            BuildingKind::Meetinghouse
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildingKind::Temple => "Temple",
            BuildingKind::Meetinghouse => "Meetinghouse",
        }
    }
}

fn lowercased(tags: &HashMap<String, String>, key: &str) -> String {
    tags.get(key).map(|v| v.to_lowercase()).unwrap_or_default()
}

/// A canonical LDS building, normalized from one Overpass element
#[derive(Debug, Clone)]
pub struct Building {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub kind: BuildingKind,
    pub address: String,
    pub denomination: String,
    pub religion: String,
    /// Original tags, retained for popup content
    pub tags: HashMap<String, String>,
}

/// Pick a display name: explicit name tag, English name tag, or the
/// generic fallback label
pub fn display_name(tags: &HashMap<String, String>) -> String {
    tags.get("name")
        .or_else(|| tags.get("name:en"))
        .cloned()
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Format a display address from OSM addr:* tags, comma-joining only
/// the parts present
pub fn format_address(tags: &HashMap<String, String>) -> String {
    let mut parts = Vec::new();

    match (tags.get("addr:housenumber"), tags.get("addr:street")) {
        (Some(number), Some(street)) => parts.push(format!("{} {}", number, street)),
        (None, Some(street)) => parts.push(street.clone()),
        _ => {}
    }

    if let Some(city) = tags.get("addr:city") {
        parts.push(city.clone());
    }
    if let Some(state) = tags.get("addr:state") {
        parts.push(state.clone());
    }
    if let Some(postcode) = tags.get("addr:postcode") {
        parts.push(postcode.clone());
    }

    if parts.is_empty() {
        ADDRESS_UNAVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classify_by_name() {
        let t = tags(&[("name", "Kansas City Temple")]);
        assert_eq!(BuildingKind::from_tags(&t), BuildingKind::Temple);

        let t = tags(&[("name", "Liberty Ward Meetinghouse")]);
        assert_eq!(BuildingKind::from_tags(&t), BuildingKind::Meetinghouse);
    }

    #[test]
    fn test_classify_case_insensitive() {
        let t = tags(&[("name", "SALT LAKE TEMPLE")]);
        assert_eq!(BuildingKind::from_tags(&t), BuildingKind::Temple);
    }

    #[test]
    fn test_classify_by_building_tag() {
        let t = tags(&[("building", "temple")]);
        assert_eq!(BuildingKind::from_tags(&t), BuildingKind::Temple);

        // "temple" must be the whole building tag value
        let t = tags(&[("building", "temple_annex")]);
        assert_eq!(BuildingKind::from_tags(&t), BuildingKind::Meetinghouse);
    }

    #[test]
    fn test_classify_by_denomination() {
        let t = tags(&[("denomination", "mormon_temple")]);
        assert_eq!(BuildingKind::from_tags(&t), BuildingKind::Temple);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let t = tags(&[("name", "Provo City Center Temple"), ("building", "church")]);
        let first = BuildingKind::from_tags(&t);
        for _ in 0..10 {
            assert_eq!(BuildingKind::from_tags(&t), first);
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(display_name(&tags(&[("name", "Kansas City Temple")])), "Kansas City Temple");
        assert_eq!(display_name(&tags(&[("name:en", "Tokyo Temple")])), "Tokyo Temple");
        assert_eq!(display_name(&tags(&[])), FALLBACK_NAME);
    }

    #[test]
    fn test_format_address_full() {
        let t = tags(&[
            ("addr:housenumber", "7001"),
            ("addr:street", "Searcy Creek Pkwy"),
            ("addr:city", "Kansas City"),
            ("addr:state", "MO"),
            ("addr:postcode", "64119"),
        ]);
        assert_eq!(
            format_address(&t),
            "7001 Searcy Creek Pkwy, Kansas City, MO, 64119"
        );
    }

    #[test]
    fn test_format_address_street_only() {
        let t = tags(&[("addr:street", "Main St"), ("addr:city", "Provo")]);
        assert_eq!(format_address(&t), "Main St, Provo");
    }

    #[test]
    fn test_format_address_missing() {
        // A house number with no street is not usable on its own
        let t = tags(&[("addr:housenumber", "7001")]);
        assert_eq!(format_address(&t), ADDRESS_UNAVAILABLE);
        assert_eq!(format_address(&tags(&[])), ADDRESS_UNAVAILABLE);
    }
}
