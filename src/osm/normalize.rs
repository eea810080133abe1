use std::collections::HashSet;

use crate::api::Element;
use crate::domain::{
    Building, BuildingKind, DEFAULT_DENOMINATION, DEFAULT_RELIGION, display_name, format_address,
};

/// Normalize raw Overpass elements into canonical buildings.
///
/// Never fails; malformed elements are silently skipped.
///
/// # Algorithm
/// 1. Pick a representative coordinate (node position, or the computed
///    center of a way/relation); skip elements with neither
/// 2. Skip elements whose coordinate rounds onto one already seen
///    (first occurrence wins)
/// 3. Classify the subtype and format name/address from the tags
pub fn normalize_buildings(elements: &[Element]) -> Vec<Building> {
    let mut seen = HashSet::new();
    let mut buildings = Vec::new();

    for element in elements {
        let (lat, lon) = match representative_coordinate(element) {
            Some(coord) => coord,
            None => continue,
        };

        if !seen.insert(dedup_key(lat, lon)) {
            continue;
        }

        let tags = element.tags.clone().unwrap_or_default();

        buildings.push(Building {
            id: element.id,
            lat,
            lon,
            name: display_name(&tags),
            kind: BuildingKind::from_tags(&tags),
            address: format_address(&tags),
            denomination: tags
                .get("denomination")
                .cloned()
                .unwrap_or_else(|| DEFAULT_DENOMINATION.to_string()),
            religion: tags
                .get("religion")
                .cloned()
                .unwrap_or_else(|| DEFAULT_RELIGION.to_string()),
            tags,
        });
    }

    buildings
}

fn representative_coordinate(element: &Element) -> Option<(f64, f64)> {
    if element.type_ == "node" {
        Some((element.lat?, element.lon?))
    } else {
        element.center.map(|c| (c.lat, c.lon))
    }
}

/// Rounded-coordinate key; 5 decimal places is ~1.1m, enough to collapse
/// a node and the center of the way that outlines the same building
fn dedup_key(lat: f64, lon: f64) -> String {
    format!("{lat:.5},{lon:.5}")
}
