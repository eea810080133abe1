pub mod backend;
pub mod html;
pub mod popup;
pub mod presenter;

pub use backend::{HeadlessBackend, MapBackend, MapError, Marker, MarkerStyle, MarkerSymbol};
pub use html::HtmlBackend;
pub use presenter::{DEFAULT_ZOOM, Filter, Presenter, Summary};
