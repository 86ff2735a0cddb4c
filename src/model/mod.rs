//! Data models for Placemark.

mod location;
mod marker;

pub use location::{Coordinates, LocationDraft, LocationType, LogoPayload, UnknownLocationType};
pub use marker::{MarkerId, MarkerRecord};
