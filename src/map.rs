//! Map surface contract.
//!
//! The map engine (tiles, projection, pan/zoom) lives outside this crate. The
//! annotation controller only needs to receive lifecycle events and to add or
//! remove overlay markers.

use crate::model::{Coordinates, MarkerId};
use crate::popup::{MarkerGlyph, PopupContent};

/// Reference to an overlay element owned by the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

/// Everything the map needs to show one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMarker {
    pub marker: MarkerId,
    pub coordinates: Coordinates,
    pub glyph: MarkerGlyph,
    pub popup: PopupContent,
    pub tooltip: String,
    pub title: String,
}

/// Operations the controller calls on the map.
pub trait MapSurface {
    /// Put a marker on the overlay layer.
    fn add_overlay(&mut self, marker: OverlayMarker) -> OverlayHandle;

    /// Take a marker off the overlay layer. Returns whether it was present.
    fn remove_overlay(&mut self, handle: OverlayHandle) -> bool;

    fn disable_double_click_zoom(&mut self);

    fn current_zoom(&self) -> f64;

    /// Drop event listeners and free map resources.
    fn release(&mut self) {}
}

/// Lifecycle events emitted by the map.
#[derive(Debug)]
pub enum MapEvent<M> {
    /// The map finished initialising; carries the map handle.
    Ready(M),
    /// A zoom animation ended at the given level.
    ZoomEnd(f64),
    /// The user asked to add a location here (double-click).
    AnnotateTrigger(Coordinates),
}
