//! Client for the ULDK cadastral parcel API.
//!
//! ULDK (uldk.gugik.gov.pl) answers plain text: a status line followed by
//! the payload. Coordinates go in as PL-1992, geometry comes back as WKT
//! with an optional SRID prefix.

pub mod client;
pub mod geometry;

pub use client::UldkClient;
