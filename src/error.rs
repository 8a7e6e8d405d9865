//! Error taxonomy for render calls.
//!
//! None of these is fatal: a plotter logs the error, skips the operation and keeps the
//! previously displayed state until the next valid call supersedes it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    /// A required payload field is absent or empty.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Coordinates are present but unusable (wrong type, length mismatch, ragged grid).
    #[error("malformed series `{name}`: {reason}")]
    MalformedSeries { name: String, reason: String },

    /// The target surface could not be found when the plotter was constructed.
    #[error("surface `{0}` not found")]
    Initialization(String),

    /// The rendering sink failed to draw the frame.
    #[error("surface error: {0}")]
    Surface(#[from] anyhow::Error),
}

impl PlotError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        PlotError::MalformedSeries {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = PlotError> = std::result::Result<T, E>;
