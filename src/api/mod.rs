pub mod overpass;

pub use overpass::{Center, Element, FetchError, OverpassResponse, build_query, fetch_buildings};
