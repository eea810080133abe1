use serde_json::json;
use std::fs;
use std::path::Path;

use super::backend::{MapBackend, MapError, Marker};

const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";
const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";

/// Backend that renders the map as a self-contained Leaflet page.
///
/// View state and markers accumulate through the `MapBackend` calls;
/// `write` emits the artifact.
#[derive(Debug)]
pub struct HtmlBackend {
    center: (f64, f64),
    zoom: u8,
    markers: Vec<Marker>,
    caption: Option<String>,
}

impl HtmlBackend {
    pub fn new() -> Self {
        Self {
            center: (0.0, 0.0),
            zoom: 2,
            markers: Vec::new(),
            caption: None,
        }
    }

    /// Summary line shown in the page's banner
    pub fn set_caption(&mut self, caption: String) {
        self.caption = Some(caption);
    }

    pub fn write(&self, path: &Path) -> Result<(), MapError> {
        fs::write(path, self.render_page())?;
        Ok(())
    }

    fn render_page(&self) -> String {
        let markers: Vec<serde_json::Value> = self
            .markers
            .iter()
            .map(|m| {
                json!({
                    "lat": m.lat,
                    "lon": m.lon,
                    "style": m.symbol.style.as_str(),
                    "color": m.symbol.color,
                    "size": m.symbol.size,
                    "outlineColor": m.symbol.outline_color,
                    "outlineWidth": m.symbol.outline_width,
                    "title": m.title,
                    "popup": m.popup_html,
                })
            })
            .collect();

        // A literal "</" inside the embedded JSON would end the script tag early
        let markers_json = serde_json::to_string(&markers)
            .unwrap_or_else(|_| "[]".to_string())
            .replace("</", "<\\/");

        let banner = match &self.caption {
            Some(caption) => format!(r#"<div id="stats-bar">{caption}</div>"#),
            None => String::new(),
        };

        let (lat, lon) = self.center;

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>LDS Church Buildings</title>
  <link rel="stylesheet" href="{LEAFLET_CSS}" />
  <script src="{LEAFLET_JS}"></script>
  <style>
    html, body {{ height: 100%; margin: 0; }}
    #map {{ height: 100%; }}
    #stats-bar {{
      position: absolute;
      top: 10px;
      left: 50%;
      transform: translateX(-50%);
      z-index: 1000;
      background: rgba(255, 255, 255, 0.92);
      border-radius: 6px;
      padding: 6px 14px;
      font-family: sans-serif;
      font-size: 14px;
      box-shadow: 0 1px 4px rgba(0, 0, 0, 0.3);
    }}
    .popup-row {{ margin: 2px 0; }}
    .popup-label {{ font-weight: bold; }}
  </style>
</head>
<body>
  {banner}
  <div id="map"></div>
  <script>
    var map = L.map("map").setView([{lat}, {lon}], {zoom});

    L.tileLayer("https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
      maxZoom: 19,
      attribution: "&copy; OpenStreetMap contributors"
    }}).addTo(map);

    var markers = {markers_json};

    markers.forEach(function (m) {{
      var shape = m.style === "diamond"
        ? "transform: rotate(45deg); border-radius: 2px;"
        : "border-radius: 50%;";
      var icon = L.divIcon({{
        className: "",
        html: "<div style='width:" + m.size + "px; height:" + m.size + "px; background:" + m.color +
          "; border:" + m.outlineWidth + "px solid " + m.outlineColor + "; " + shape + "'></div>",
        iconSize: [m.size, m.size],
        iconAnchor: [m.size / 2, m.size / 2]
      }});
      L.marker([m.lat, m.lon], {{ icon: icon, title: m.title }})
        .addTo(map)
        .bindPopup("<b>" + m.title + "</b>" + m.popup);
    }});
  </script>
</body>
</html>
"#,
            zoom = self.zoom,
        )
    }
}

impl Default for HtmlBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBackend for HtmlBackend {
    fn initialize(&mut self, center: (f64, f64), zoom: u8) -> Result<(), MapError> {
        self.center = center;
        self.zoom = zoom;
        Ok(())
    }

    fn set_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.to_vec();
    }

    fn fly_to(&mut self, center: (f64, f64), zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildingKind;
    use crate::map::backend::MarkerSymbol;
    use tempfile::tempdir;

    fn marker(title: &str, kind: BuildingKind) -> Marker {
        Marker {
            lat: 39.0997,
            lon: -94.5786,
            symbol: MarkerSymbol::for_kind(kind),
            title: title.to_string(),
            popup_html: "<div class=\"popup-content\">details</div>".to_string(),
        }
    }

    #[test]
    fn test_page_contains_view_and_markers() {
        let mut backend = HtmlBackend::new();
        backend.initialize((39.0997, -94.5786), 8).unwrap();
        backend.set_markers(&[
            marker("Kansas City Temple", BuildingKind::Temple),
            marker("Liberty Ward", BuildingKind::Meetinghouse),
        ]);
        backend.fly_to((39.5, -94.6), 7);

        let page = backend.render_page();
        assert!(page.contains(LEAFLET_JS));
        assert!(page.contains("setView([39.5, -94.6], 7)"));
        assert!(page.contains("Kansas City Temple"));
        assert!(page.contains("Liberty Ward"));
        assert!(page.contains("diamond"));
    }

    #[test]
    fn test_page_embeds_caption() {
        let mut backend = HtmlBackend::new();
        backend.initialize((39.0997, -94.5786), 8).unwrap();
        backend.set_caption("Showing 2 of 2 buildings (1 temples, 1 meetinghouses)".to_string());

        let page = backend.render_page();
        assert!(page.contains("stats-bar"));
        assert!(page.contains("Showing 2 of 2 buildings"));
    }

    #[test]
    fn test_embedded_json_cannot_close_script_tag() {
        let mut backend = HtmlBackend::new();
        backend.initialize((39.0997, -94.5786), 8).unwrap();
        let mut m = marker("Sneaky", BuildingKind::Temple);
        m.popup_html = "</script><script>alert(1)</script>".to_string();
        backend.set_markers(&[m]);

        let page = backend.render_page();
        let script_start = page.find("var markers").unwrap();
        assert!(!page[script_start..].contains("</script><script>"));
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.html");

        let mut backend = HtmlBackend::new();
        backend.initialize((39.0997, -94.5786), 8).unwrap();
        backend.set_markers(&[marker("Kansas City Temple", BuildingKind::Temple)]);
        backend.write(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("<!DOCTYPE html>"));
        assert!(contents.contains("Kansas City Temple"));
    }
}
