use thiserror::Error;

use crate::domain::BuildingKind;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map backend failed to initialize: {0}")]
    Init(String),
    #[error("failed to write map output")]
    Write(#[from] std::io::Error),
}

/// Marker shape, drawn by whichever backend renders it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Diamond,
    Circle,
}

impl MarkerStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerStyle::Diamond => "diamond",
            MarkerStyle::Circle => "circle",
        }
    }
}

/// Visual encoding for a building marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSymbol {
    pub style: MarkerStyle,
    /// CSS fill color
    pub color: &'static str,
    /// Diameter in pixels
    pub size: u32,
    pub outline_color: &'static str,
    pub outline_width: u32,
}

impl MarkerSymbol {
    /// Gold diamonds for temples, royal blue circles for meetinghouses
    pub fn for_kind(kind: BuildingKind) -> Self {
        match kind {
            BuildingKind::Temple => Self {
                style: MarkerStyle::Diamond,
                color: "#ffd700",
                size: 16,
                outline_color: "#ffffff",
                outline_width: 2,
            },
            BuildingKind::Meetinghouse => Self {
                style: MarkerStyle::Circle,
                color: "#4169e1",
                size: 12,
                outline_color: "#ffffff",
                outline_width: 2,
            },
        }
    }
}

/// One rendered point marker with its attached info panel
#[derive(Debug, Clone)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub symbol: MarkerSymbol,
    pub title: String,
    pub popup_html: String,
}

/// Map-rendering capability consumed by the presenter.
///
/// A backend draws point markers with symbols and popups and
/// repositions the view; the presenter owns the building list and
/// filter state.
pub trait MapBackend {
    /// Bind the view to a center and zoom. Called exactly once, before
    /// any other operation.
    fn initialize(&mut self, center: (f64, f64), zoom: u8) -> Result<(), MapError>;

    /// Replace every marker currently on the map
    fn set_markers(&mut self, markers: &[Marker]);

    /// Animate to a new center and zoom
    fn fly_to(&mut self, center: (f64, f64), zoom: u8);
}

/// In-memory backend; the test double for the rendering capability
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub center: Option<(f64, f64)>,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    fail_init: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose initialize always fails
    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }
}

impl MapBackend for HeadlessBackend {
    fn initialize(&mut self, center: (f64, f64), zoom: u8) -> Result<(), MapError> {
        if self.fail_init {
            return Err(MapError::Init("headless backend set to fail".to_string()));
        }
        self.center = Some(center);
        self.zoom = zoom;
        Ok(())
    }

    fn set_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.to_vec();
    }

    fn fly_to(&mut self, center: (f64, f64), zoom: u8) {
        self.center = Some(center);
        self.zoom = zoom;
    }
}
