//! Error type shared by the pipeline components.

use thiserror::Error;

/// Everything that can go wrong between accepting a request and producing
/// a report. Each upstream keeps its own connection-failure variant so the
/// API boundary can name the API that fell over.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to connect to the ULDK API: {0}")]
    UldkUnavailable(String),

    #[error("Failed to connect to the Overpass API: {0}")]
    OverpassUnavailable(String),

    /// Upstream answered but the response does not have the documented shape.
    #[error("Malformed response from the {api} API: {detail}")]
    MalformedResponse { api: &'static str, detail: String },

    /// ULDK answered with a non-zero status or an empty payload.
    #[error("No parcel found")]
    ParcelNotFound,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Projection failed: {0}")]
    Projection(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<proj4rs::errors::Error> for Error {
    fn from(err: proj4rs::errors::Error) -> Self {
        Error::Projection(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
