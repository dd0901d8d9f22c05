//! Core data models shared by the pipeline and both binaries.

pub mod parcel;

pub use parcel::Parcel;
