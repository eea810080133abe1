use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::backend::{MapBackend, MapError, Marker, MarkerSymbol};
use super::popup::popup_content;
use crate::domain::{Building, BuildingKind};
use crate::geometry::Bounds;

/// Initial zoom before any buildings are rendered
pub const DEFAULT_ZOOM: u8 = 8;

/// Building subtype filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    All,
    Temple,
    Meetinghouse,
}

impl Filter {
    fn matches(&self, kind: BuildingKind) -> bool {
        match self {
            Filter::All => true,
            Filter::Temple => kind == BuildingKind::Temple,
            Filter::Meetinghouse => kind == BuildingKind::Meetinghouse,
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "temple" => Ok(Filter::Temple),
            "meetinghouse" => Ok(Filter::Meetinghouse),
            other => Err(format!(
                "unknown filter '{other}' (expected all, temple, or meetinghouse)"
            )),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Filter::All => "all",
            Filter::Temple => "temple",
            Filter::Meetinghouse => "meetinghouse",
        };
        write!(f, "{s}")
    }
}

/// Building counts for the current render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub visible: usize,
    pub temples: usize,
    pub meetinghouses: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} of {} buildings ({} temples, {} meetinghouses)",
            self.visible, self.total, self.temples, self.meetinghouses
        )
    }
}

/// Owns the building list, the active filter, and the rendering backend.
///
/// One instance per map view; all mutation goes through `render` and
/// `filter`.
pub struct Presenter<B: MapBackend> {
    backend: B,
    buildings: Vec<Building>,
    filter: Filter,
}

impl<B: MapBackend> Presenter<B> {
    /// Acquire the rendering backend and position the initial view.
    /// Propagates backend initialization failure.
    pub fn new(mut backend: B, center: (f64, f64)) -> Result<Self, MapError> {
        backend.initialize(center, DEFAULT_ZOOM)?;
        Ok(Self {
            backend,
            buildings: Vec::new(),
            filter: Filter::All,
        })
    }

    /// Replace the displayed building set, then zoom to fit it.
    ///
    /// The previous list is discarded wholesale and the filter resets
    /// to `All`.
    pub fn render(&mut self, buildings: Vec<Building>) {
        self.buildings = buildings;
        self.filter = Filter::All;
        self.sync_markers();
        if !self.buildings.is_empty() {
            self.zoom_to_fit();
        }
    }

    /// Restrict the markers to one subtype (or all) and report counts
    pub fn filter(&mut self, filter: Filter) -> Summary {
        self.filter = filter;
        self.sync_markers();
        self.summary()
    }

    /// Center the view on the bounding box of all buildings, picking a
    /// coarser zoom for wider spans. No-op when nothing is rendered.
    pub fn zoom_to_fit(&mut self) {
        let points: Vec<(f64, f64)> = self.buildings.iter().map(|b| (b.lat, b.lon)).collect();
        let Some(bounds) = Bounds::from_points(&points) else {
            return;
        };
        self.backend
            .fly_to(bounds.center(), zoom_for_span(bounds.max_span()));
    }

    pub fn summary(&self) -> Summary {
        let temples = self
            .buildings
            .iter()
            .filter(|b| b.kind == BuildingKind::Temple)
            .count();
        let visible = self
            .buildings
            .iter()
            .filter(|b| self.filter.matches(b.kind))
            .count();

        Summary {
            total: self.buildings.len(),
            visible,
            temples,
            meetinghouses: self.buildings.len() - temples,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn sync_markers(&mut self) {
        let markers: Vec<Marker> = self
            .buildings
            .iter()
            .filter(|b| self.filter.matches(b.kind))
            .map(marker_for)
            .collect();
        self.backend.set_markers(&markers);
    }
}

/// Zoom step table: wider bounding boxes get coarser zoom levels
fn zoom_for_span(max_span_deg: f64) -> u8 {
    if max_span_deg > 10.0 {
        4
    } else if max_span_deg > 5.0 {
        5
    } else if max_span_deg > 2.0 {
        6
    } else if max_span_deg > 1.0 {
        7
    } else if max_span_deg > 0.5 {
        8
    } else {
        10
    }
}

fn marker_for(building: &Building) -> Marker {
    Marker {
        lat: building.lat,
        lon: building.lon,
        symbol: MarkerSymbol::for_kind(building.kind),
        title: building.name.clone(),
        popup_html: popup_content(building),
    }
}
