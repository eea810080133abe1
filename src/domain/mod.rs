pub mod building;

pub use building::{
    ADDRESS_UNAVAILABLE, Building, BuildingKind, DEFAULT_DENOMINATION, DEFAULT_RELIGION,
    FALLBACK_NAME, display_name, format_address,
};
