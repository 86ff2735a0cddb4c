//! Marker identity and registry records.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Coordinates, LocationDraft};
use crate::map::OverlayHandle;

/// Unique identifier for one marker instance.
///
/// Ids are never reused within a registry, so a stale id can only miss,
/// never hit a different marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(u64);

impl MarkerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// A marker that is live on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub id: MarkerId,
    pub coordinates: Coordinates,
    pub draft: LocationDraft,
    /// Back-reference into the map overlay, only used to request removal.
    pub overlay: OverlayHandle,
}

impl MarkerRecord {
    pub fn new(id: MarkerId, draft: LocationDraft, overlay: OverlayHandle) -> Self {
        Self {
            id,
            coordinates: draft.coordinates,
            draft,
            overlay,
        }
    }
}
