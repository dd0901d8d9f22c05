//! Pasieka - apiary siting pre-check.
//!
//! Resolves a cadastral parcel through the ULDK API, fetches and reprojects
//! its boundary, queries Overpass for the surroundings and evaluates a fixed
//! table of proximity rules. Shared by the `server` and `check` binaries.

pub mod error;
pub mod geodesy;
pub mod models;
pub mod overpass;
pub mod rules;
pub mod uldk;

pub use error::{Error, Result};
pub use models::Parcel;
pub use rules::Violation;
