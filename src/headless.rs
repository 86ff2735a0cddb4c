//! In-process collaborators.
//!
//! A map, a dialog presenter and an alert sink that keep everything in memory.
//! The demo binary runs on them and the tests inspect them.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::config::MapConfig;
use crate::dialog::{self, DialogCloser, DialogConfig, DialogHandle, DialogKind, DialogPresenter};
use crate::form::AlertSink;
use crate::map::{MapSurface, OverlayHandle, OverlayMarker};
use crate::model::MarkerId;

/// A map that stores overlays in a table.
#[derive(Debug)]
pub struct HeadlessMap {
    zoom: f64,
    double_click_zoom: bool,
    overlays: BTreeMap<OverlayHandle, OverlayMarker>,
    next_handle: u64,
    released: bool,
}

impl HeadlessMap {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            double_click_zoom: true,
            overlays: BTreeMap::new(),
            next_handle: 0,
            released: false,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.zoom)
    }

    pub fn double_click_zoom_enabled(&self) -> bool {
        self.double_click_zoom
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlayMarker> {
        self.overlays.values()
    }

    pub fn overlay(&self, handle: OverlayHandle) -> Option<&OverlayMarker> {
        self.overlays.get(&handle)
    }

    /// Overlay showing the given marker.
    pub fn overlay_for(&self, marker: MarkerId) -> Option<&OverlayMarker> {
        self.overlays.values().find(|overlay| overlay.marker == marker)
    }
}

impl MapSurface for HeadlessMap {
    fn add_overlay(&mut self, marker: OverlayMarker) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.overlays.insert(handle, marker);
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) -> bool {
        self.overlays.remove(&handle).is_some()
    }

    fn disable_double_click_zoom(&mut self) {
        self.double_click_zoom = false;
    }

    fn current_zoom(&self) -> f64 {
        self.zoom
    }

    fn release(&mut self) {
        self.overlays.clear();
        self.released = true;
    }
}

/// A dialog that has been opened but not yet handled.
#[derive(Debug)]
pub struct OpenedDialog {
    pub kind: DialogKind,
    pub config: DialogConfig,
    pub closer: DialogCloser,
}

/// Queues opened dialogs for whoever plays the user.
///
/// Clones share the same queue, so a test can keep one while the controller
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDialogs {
    opened: Rc<RefCell<VecDeque<OpenedDialog>>>,
}

impl HeadlessDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest dialog that has not been handled yet.
    pub fn take_next(&self) -> Option<OpenedDialog> {
        self.opened.borrow_mut().pop_front()
    }

    pub fn waiting(&self) -> usize {
        self.opened.borrow().len()
    }
}

impl DialogPresenter for HeadlessDialogs {
    fn open(&mut self, kind: DialogKind, config: DialogConfig) -> DialogHandle {
        let (closer, handle) = dialog::channel();
        log::debug!("💬 Opening {:?} dialog ({} wide)", kind, config.width);
        self.opened
            .borrow_mut()
            .push_back(OpenedDialog { kind, config, closer });
        handle
    }
}

/// Keeps every alert and logs it.
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    messages: RefCell<Vec<String>>,
}

impl RecordingAlerts {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, message: &str) {
        log::warn!("⚠️ {}", message);
        self.messages.borrow_mut().push(message.to_string());
    }
}
