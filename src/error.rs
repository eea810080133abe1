use thiserror::Error;

use crate::api::FetchError;
use crate::map::MapError;

/// Top-level failures; all bubble to the CLI entry point, which clears
/// the progress indicator and reports the chain on stderr
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetch succeeded but normalization produced zero buildings.
    /// An empty map is an application-level failure, not a silent
    /// empty state.
    #[error("no LDS buildings found within {radius_m}m of the search center")]
    NoBuildings { radius_m: u32 },

    #[error(transparent)]
    Map(#[from] MapError),
}
