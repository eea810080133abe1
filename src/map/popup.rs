use crate::domain::{ADDRESS_UNAVAILABLE, Building};

/// Build the popup HTML shown when a building marker is clicked.
///
/// The address row is omitted when normalization found no address tags.
pub fn popup_content(building: &Building) -> String {
    let mut rows = String::new();

    rows.push_str(&row("Type", building.kind.label()));

    if building.address != ADDRESS_UNAVAILABLE {
        rows.push_str(&row("Address", &building.address));
    }

    if !building.denomination.is_empty() {
        rows.push_str(&row("Denomination", &building.denomination));
    }

    rows.push_str(&row(
        "Coordinates",
        &format!("{:.4}, {:.4}", building.lat, building.lon),
    ));

    format!(r#"<div class="popup-content">{rows}</div>"#)
}

fn row(label: &str, value: &str) -> String {
    format!(
        r#"<div class="popup-row"><span class="popup-label">{label}:</span> <span class="popup-value">{value}</span></div>"#,
        label = label,
        value = escape_html(value)
    )
}

/// Tag values are free-form text from OSM; escape them before embedding
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
