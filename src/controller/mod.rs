//! Map annotation controller.
//!
//! Drives the map lifecycle (`Uninitialized` → `Ready` → `TornDown`), opens
//! form dialogs on annotate triggers and turns submitted sessions into markers.
//! Dialog close events are picked up by [`MapAnnotationController::poll_sessions`],
//! which the host calls from its event loop.
//!
//! Every marker goes through one creation path. Its popup actions carry the
//! marker's own [`MarkerId`], and the registry never reuses ids, so a delete
//! can only remove the marker it was built for.

use serde::{Deserialize, Serialize};

use crate::dialog::{DialogHandle, DialogKind, DialogPresenter, DialogSettings};
use crate::form::{FormMode, SessionResult};
use crate::map::{MapEvent, MapSurface, OverlayHandle};
use crate::model::{Coordinates, LocationDraft, MarkerId, MarkerRecord};
use crate::popup::{PopupAction, PopupFactory};
use crate::registry::MarkerRegistry;


/// What a submitted edit session does to its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// Drop the edit; the marker stays as it was
    #[default]
    Discard,
    /// Rebuild the marker's overlay and popup under the same id
    ReplaceInPlace,
    /// Leave the marker and create a new one from the edit
    Duplicate,
}

/// Controller settings, usually taken from the app config.
#[derive(Debug, Clone, Default)]
pub struct ControllerSettings {
    pub dialog: DialogSettings,
    pub edit_policy: EditPolicy,
    /// Plain pin placed here when the map becomes ready
    pub center_marker: Option<Coordinates>,
}

/// Notifications published to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEvent {
    MapReady { zoom: f64 },
    ZoomChanged(f64),
    MarkerCreated(MarkerId),
    MarkerUpdated(MarkerId),
    MarkerRemoved(MarkerId),
    SessionCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    #[error("Map is not ready yet")]
    NotReady,

    #[error("Controller has been torn down")]
    TornDown,

    #[error("Unknown marker: {0}")]
    UnknownMarker(MarkerId),
}

enum Lifecycle<M> {
    Uninitialized,
    Ready { map: M, zoom: f64 },
    TornDown,
}

impl<M> Lifecycle<M> {
    fn map_mut(&mut self) -> Result<&mut M, AnnotationError> {
        match self {
            Lifecycle::Ready { map, .. } => Ok(map),
            Lifecycle::Uninitialized => Err(AnnotationError::NotReady),
            Lifecycle::TornDown => Err(AnnotationError::TornDown),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SessionPurpose {
    Create,
    Edit(MarkerId),
}

struct PendingSession {
    purpose: SessionPurpose,
    handle: DialogHandle,
}

/// Top-level controller for map annotations.
pub struct MapAnnotationController<M: MapSurface, P: DialogPresenter> {
    lifecycle: Lifecycle<M>,
    presenter: P,
    settings: ControllerSettings,
    factory: PopupFactory,
    registry: MarkerRegistry,
    sessions: Vec<PendingSession>,
    events: Vec<AnnotationEvent>,
    center_overlay: Option<OverlayHandle>,
}

impl<M: MapSurface, P: DialogPresenter> MapAnnotationController<M, P> {
    pub fn new(presenter: P, settings: ControllerSettings) -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            presenter,
            settings,
            factory: PopupFactory::new(),
            registry: MarkerRegistry::new(),
            sessions: Vec::new(),
            events: Vec::new(),
            center_overlay: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready { .. })
    }

    pub fn is_torn_down(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::TornDown)
    }

    /// Zoom level seen at the last ready or zoom-end event.
    pub fn zoom(&self) -> Option<f64> {
        match &self.lifecycle {
            Lifecycle::Ready { zoom, .. } => Some(*zoom),
            _ => None,
        }
    }

    pub fn map(&self) -> Option<&M> {
        match &self.lifecycle {
            Lifecycle::Ready { map, .. } => Some(map),
            _ => None,
        }
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerRecord> {
        self.registry.get(id)
    }

    /// Number of dialogs opened and not yet closed.
    pub fn pending_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Overlay of the pin placed at the configured center, if any.
    pub fn center_overlay(&self) -> Option<OverlayHandle> {
        self.center_overlay
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Change what submitted edits do from now on.
    pub fn set_edit_policy(&mut self, policy: EditPolicy) {
        self.settings.edit_policy = policy;
    }

    /// Take all notifications published since the last call.
    pub fn drain_events(&mut self) -> Vec<AnnotationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feed one map lifecycle event.
    pub fn handle_event(&mut self, event: MapEvent<M>) -> Result<(), AnnotationError> {
        if self.is_torn_down() {
            log::warn!("🗺️ Ignoring {} event after teardown", event_name(&event));
            return Err(AnnotationError::TornDown);
        }

        match event {
            MapEvent::Ready(mut map) => {
                if self.is_ready() {
                    log::warn!("🗺️ Map reported ready twice, keeping the first handle");
                    return Ok(());
                }
                map.disable_double_click_zoom();
                if let Some(center) = self.settings.center_marker {
                    let id = self.registry.allocate_id();
                    self.center_overlay = Some(map.add_overlay(self.factory.center_marker(id, center)));
                    log::debug!("📍 Center pin at {}", center);
                }
                let zoom = map.current_zoom();
                self.lifecycle = Lifecycle::Ready { map, zoom };
                self.events.push(AnnotationEvent::MapReady { zoom });
                log::info!("🗺️ Map ready at zoom {}", zoom);
            }
            MapEvent::ZoomEnd(level) => {
                let Lifecycle::Ready { zoom, .. } = &mut self.lifecycle else {
                    return Err(AnnotationError::NotReady);
                };
                *zoom = level;
                self.events.push(AnnotationEvent::ZoomChanged(level));
                log::debug!("🗺️ Zoom changed to {}", level);
            }
            MapEvent::AnnotateTrigger(coordinates) => {
                self.open_create(coordinates)?;
            }
        }
        Ok(())
    }

    fn open_create(&mut self, coordinates: Coordinates) -> Result<(), AnnotationError> {
        self.lifecycle.map_mut()?;
        let config = self.settings.dialog.config_for(FormMode::Create { coordinates });
        let handle = self.presenter.open(DialogKind::LocationForm, config);
        self.sessions.push(PendingSession {
            purpose: SessionPurpose::Create,
            handle,
        });
        log::debug!("💬 Opened create dialog at {}", coordinates);
        Ok(())
    }

    /// Open an edit dialog seeded from the marker's current draft.
    pub fn edit_marker(&mut self, id: MarkerId) -> Result<(), AnnotationError> {
        self.lifecycle.map_mut()?;
        let draft = self
            .registry
            .get(id)
            .map(|record| record.draft.clone())
            .ok_or(AnnotationError::UnknownMarker(id))?;

        let config = self
            .settings
            .dialog
            .config_for(FormMode::Edit { marker: id, draft });
        let handle = self.presenter.open(DialogKind::LocationForm, config);
        self.sessions.push(PendingSession {
            purpose: SessionPurpose::Edit(id),
            handle,
        });
        log::debug!("💬 Opened edit dialog for {}", id);
        Ok(())
    }

    /// Remove a marker from both the map and the registry.
    pub fn delete_marker(&mut self, id: MarkerId) -> Result<MarkerRecord, AnnotationError> {
        let map = self.lifecycle.map_mut()?;
        let record = self
            .registry
            .remove(id)
            .ok_or(AnnotationError::UnknownMarker(id))?;

        if !map.remove_overlay(record.overlay) {
            log::warn!("📍 {} had no overlay on the map", id);
        }
        self.events.push(AnnotationEvent::MarkerRemoved(id));
        log::info!("📍 Deleted {} ({})", id, record.draft.name);
        Ok(record)
    }

    /// Dispatch a popup button press.
    pub fn handle_popup_action(&mut self, action: PopupAction) -> Result<(), AnnotationError> {
        match action {
            PopupAction::Edit(id) => self.edit_marker(id),
            PopupAction::Delete(id) => self.delete_marker(id).map(|_| ()),
        }
    }

    /// Handle every dialog that has closed since the last poll.
    ///
    /// Returns the number of sessions that finished.
    pub fn poll_sessions(&mut self) -> usize {
        let mut finished = Vec::new();
        self.sessions.retain_mut(|session| match session.handle.try_closed() {
            Some(result) => {
                finished.push((session.purpose, result));
                false
            }
            None => true,
        });

        let count = finished.len();
        for (purpose, result) in finished {
            if let Err(e) = self.finish_session(purpose, result) {
                log::warn!("💬 Could not apply {:?} session: {}", purpose, e);
            }
        }
        count
    }

    fn finish_session(&mut self, purpose: SessionPurpose, result: SessionResult) -> Result<(), AnnotationError> {
        let submission = match result {
            SessionResult::Submitted(submission) => submission,
            SessionResult::Cancelled => {
                log::debug!("💬 {:?} session cancelled", purpose);
                self.events.push(AnnotationEvent::SessionCancelled);
                return Ok(());
            }
        };

        match purpose {
            SessionPurpose::Create => self.spawn_marker(submission.draft).map(|_| ()),
            SessionPurpose::Edit(id) => self.apply_edit(id, submission.draft),
        }
    }

    /// Create a marker, attach it to the map and register it.
    fn spawn_marker(&mut self, draft: LocationDraft) -> Result<MarkerId, AnnotationError> {
        let map = self.lifecycle.map_mut()?;
        let id = self.registry.allocate_id();
        let overlay = map.add_overlay(self.factory.overlay(id, &draft));

        log::info!("📍 Created {} ({}) at {}", id, draft.name, draft.coordinates);
        self.registry.insert(MarkerRecord::new(id, draft, overlay));
        self.events.push(AnnotationEvent::MarkerCreated(id));
        Ok(id)
    }

    fn apply_edit(&mut self, id: MarkerId, draft: LocationDraft) -> Result<(), AnnotationError> {
        if !self.registry.contains(id) {
            log::warn!("📍 Dropping edit of {}, it was deleted while the dialog was open", id);
            return Err(AnnotationError::UnknownMarker(id));
        }

        match self.settings.edit_policy {
            EditPolicy::Discard => {
                log::debug!("📍 Edit of {} discarded", id);
                Ok(())
            }
            EditPolicy::Duplicate => self.spawn_marker(draft).map(|_| ()),
            EditPolicy::ReplaceInPlace => {
                let map = self.lifecycle.map_mut()?;
                let old = self
                    .registry
                    .remove(id)
                    .ok_or(AnnotationError::UnknownMarker(id))?;

                map.remove_overlay(old.overlay);
                let overlay = map.add_overlay(self.factory.overlay(id, &draft));
                self.registry.insert(MarkerRecord::new(id, draft, overlay));
                self.events.push(AnnotationEvent::MarkerUpdated(id));
                log::info!("📍 Updated {}", id);
                Ok(())
            }
        }
    }

    /// Release the map and drop pending sessions. Later calls fail with
    /// [`AnnotationError::TornDown`].
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            return;
        }
        self.sessions.clear();

        let lifecycle = std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown);
        if let Lifecycle::Ready { mut map, .. } = lifecycle {
            if let Some(handle) = self.center_overlay.take() {
                map.remove_overlay(handle);
            }
            for record in self.registry.drain() {
                map.remove_overlay(record.overlay);
            }
            map.release();
        }
        log::info!("🗺️ Annotation controller torn down");
    }
}

impl<M: MapSurface, P: DialogPresenter> Drop for MapAnnotationController<M, P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn event_name<M>(event: &MapEvent<M>) -> &'static str {
    match event {
        MapEvent::Ready(_) => "ready",
        MapEvent::ZoomEnd(_) => "zoom-end",
        MapEvent::AnnotateTrigger(_) => "annotate",
    }
}
