//! Client for the OpenStreetMap Overpass API.
//!
//! One POST per analysis: fetch every road, building, public facility and
//! landfill/industrial area around the parcel, then hand the parsed
//! features to the rule evaluator.

pub mod client;
pub mod element;

pub use client::OverpassClient;
pub use element::{FeatureGeometry, MapFeature, OverpassElement};
